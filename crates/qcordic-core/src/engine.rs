//! CORDIC (COordinate Rotation DIgital Computer) golden-model engine
//!
//! Iterative shift-and-add engine in both circular modes:
//!
//! - **Rotation**: drive `z` to zero, rotating `(x, y)` by the initial angle.
//! - **Vectoring**: drive `y` to zero, leaving the magnitude in `x` and the
//!   accumulated angle in `z`.
//!
//! Each iteration applies, with `d` chosen by the mode,
//!
//! ```text
//! x' = x - d * y * 2^-i
//! y' = y + d * x * 2^-i
//! z' = z - d * atan(2^-i)
//! ```
//!
//! The loop always runs the full iteration count. Raw outputs carry the
//! gain `K` from [`CordicLut`]; [`CordicEngine::unscale`] divides it out.
//!
//! ## Example
//!
//! ```rust
//! use qcordic_core::engine::{CordicEngine, CordicMode, CordicState};
//!
//! let engine = CordicEngine::new(20).unwrap();
//! let out = engine
//!     .run(CordicState::new(3.0, 4.0, 0.0), CordicMode::Vectoring)
//!     .unwrap();
//! assert!((out.x - engine.gain() * 5.0).abs() < 1e-4);
//! assert!((out.z - (4.0_f64 / 3.0).atan()).abs() < 1e-4);
//! ```

use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{CordicError, CordicResult};
use crate::lut::CordicLut;

/// Operating mode, encoded on the `rot_vec` selector as 0 / 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CordicMode {
    /// Rotate `(x, y)` by `z`
    Rotation,
    /// Resolve magnitude and angle of `(x, y)`
    Vectoring,
}

impl CordicMode {
    /// Value driven on the `rot_vec` selector
    pub fn selector(self) -> u32 {
        match self {
            CordicMode::Rotation => 0,
            CordicMode::Vectoring => 1,
        }
    }

    /// Decode a `rot_vec` selector value
    pub fn from_selector(value: u32) -> Option<Self> {
        match value {
            0 => Some(CordicMode::Rotation),
            1 => Some(CordicMode::Vectoring),
            _ => None,
        }
    }

    /// Direction `d_i` for the current state.
    #[inline]
    pub fn direction(self, y: f64, z: f64) -> f64 {
        match self {
            CordicMode::Rotation => {
                if z >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            CordicMode::Vectoring => {
                if y >= 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
        }
    }
}

impl fmt::Display for CordicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CordicMode::Rotation => write!(f, "rotation"),
            CordicMode::Vectoring => write!(f, "vectoring"),
        }
    }
}

/// Running `(x, y, z)` triple
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CordicState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CordicState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// `(x, y)` as a complex number
    pub fn vector(&self) -> Complex64 {
        Complex64::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for CordicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={:.9}, y={:.9}, z={:.9})", self.x, self.y, self.z)
    }
}

/// CORDIC engine with a cached angle table and gain.
#[derive(Debug, Clone)]
pub struct CordicEngine {
    lut: CordicLut,
}

impl CordicEngine {
    /// Create an engine running `iterations` micro-rotations.
    pub fn new(iterations: usize) -> CordicResult<Self> {
        if iterations == 0 {
            return Err(CordicError::Domain(
                "iteration count must be positive".to_string(),
            ));
        }
        Ok(Self {
            lut: CordicLut::generate(iterations)?,
        })
    }

    /// Create an engine from an existing table.
    pub fn from_lut(lut: CordicLut) -> Self {
        Self { lut }
    }

    pub fn lut(&self) -> &CordicLut {
        &self.lut
    }

    pub fn iterations(&self) -> usize {
        self.lut.iterations()
    }

    /// Gain `K` carried by raw outputs
    pub fn gain(&self) -> f64 {
        self.lut.gain()
    }

    /// Largest rotation magnitude that converges
    pub fn convergence_limit(&self) -> f64 {
        self.lut.convergence_limit()
    }

    /// Check `input` against the convergence domain of `mode`.
    pub fn check_domain(&self, input: CordicState, mode: CordicMode) -> CordicResult<()> {
        if !input.is_finite() {
            return Err(CordicError::Domain(format!("non-finite input {}", input)));
        }
        match mode {
            CordicMode::Rotation => {
                let limit = self.convergence_limit();
                if input.z.abs() > limit {
                    return Err(CordicError::Domain(format!(
                        "rotation angle {} exceeds convergence limit {} for {} iterations",
                        input.z,
                        limit,
                        self.iterations()
                    )));
                }
            }
            CordicMode::Vectoring => {
                if input.x <= 0.0 {
                    return Err(CordicError::Domain(format!(
                        "vectoring requires x > 0, got x = {}",
                        input.x
                    )));
                }
            }
        }
        Ok(())
    }

    /// Run the full iteration count on `input`. Outputs carry the gain `K`.
    pub fn run(&self, input: CordicState, mode: CordicMode) -> CordicResult<CordicState> {
        self.check_domain(input, mode)?;

        let mut state = input;
        for (i, &angle) in self.lut.angles().iter().enumerate() {
            let d = mode.direction(state.y, state.z);
            let shift = 2.0_f64.powi(-(i as i32));
            let x = state.x - d * state.y * shift;
            let y = state.y + d * state.x * shift;
            state = CordicState::new(x, y, state.z - d * angle);
        }

        tracing::trace!(%mode, %input, output = %state, "CORDIC run");
        Ok(state)
    }

    /// Rotation mode shorthand
    pub fn rotate(&self, x: f64, y: f64, z: f64) -> CordicResult<CordicState> {
        self.run(CordicState::new(x, y, z), CordicMode::Rotation)
    }

    /// Vectoring mode shorthand
    pub fn vector(&self, x: f64, y: f64, z: f64) -> CordicResult<CordicState> {
        self.run(CordicState::new(x, y, z), CordicMode::Vectoring)
    }

    /// Divide the gain out of `x` and `y`; `z` is unaffected.
    pub fn unscale(&self, state: CordicState) -> CordicState {
        CordicState::new(state.x / self.gain(), state.y / self.gain(), state.z)
    }

    /// Rotate a complex number by `angle` with unit gain.
    pub fn rotate_vector(&self, v: Complex64, angle: f64) -> CordicResult<Complex64> {
        let out = self.unscale(self.rotate(v.re, v.im, angle)?);
        Ok(out.vector())
    }

    /// Magnitude and angle of `v` (right half-plane only).
    pub fn polar(&self, v: Complex64) -> CordicResult<(f64, f64)> {
        let out = self.unscale(self.vector(v.re, v.im, 0.0)?);
        Ok((out.x, out.z))
    }
}
