//! qcordic core numerics
//!
//! Pure, synchronous building blocks for a fixed-point CORDIC unit:
//!
//! - [`fixed_point`]: signed Qm.n encode/decode with two's-complement packing
//! - [`lut`]: arctangent table and gain generator, LUT embedding words
//! - [`engine`]: the rotation/vectoring golden model
//! - [`logging`]: `tracing` subscriber setup for binaries
//!
//! # Example
//!
//! ```rust
//! use qcordic_core::{CordicEngine, CordicLut, QFormat};
//!
//! let lut = CordicLut::generate(16).unwrap();
//! let words = lut.hex_words(QFormat::new(0, 30).unwrap());
//! assert_eq!(words.len(), 16);
//!
//! let engine = CordicEngine::from_lut(lut);
//! let out = engine.rotate(1.0, 0.0, std::f64::consts::FRAC_PI_4).unwrap();
//! assert!((out.x / engine.gain() - 0.7071).abs() < 1e-3);
//! ```

pub mod engine;
pub mod error;
pub mod fixed_point;
pub mod logging;
pub mod lut;

pub use engine::{CordicEngine, CordicMode, CordicState};
pub use error::{CordicError, CordicResult};
pub use fixed_point::{
    decode_bits, decode_pattern, decode_word, encode, encode_saturating, FixedWord, QFormat,
    CONTAINER_BITS,
};
pub use lut::{quantize, read_gain, CordicLut};
