//! Signed Qm.n fixed-point codec
//!
//! A Qm.n word has one sign bit, `m` integer bits and `n` fractional bits,
//! `1 + m + n` bits in total, stored as a two's-complement pattern. Register
//! and LUT words carry the pattern left-justified in a 32-bit container
//! with the unused low bits cleared:
//!
//! ```text
//!  31   30 ..        .. 0
//! ┌────┬─────────┬──────────┬───────────┐
//! │sign│ m int   │ n frac   │ zero pad  │
//! └────┴─────────┴──────────┴───────────┘
//! ```
//!
//! Quantization rounds to the nearest grid point `k * 2^-n`, ties away from
//! zero. Strict [`encode`] rejects anything outside the representable range;
//! [`encode_saturating`] is the separate clamping policy used for LUT
//! embedding.
//!
//! ## Example
//!
//! ```rust
//! use qcordic_core::fixed_point::{decode_bits, encode, QFormat};
//!
//! let q = QFormat::new(3, 4).unwrap();
//! let word = encode(3.75, q).unwrap();
//! assert_eq!(word.bit_string(), "0011.1100");
//! assert_eq!(word.word(), 0x3C00_0000);
//! assert_eq!(decode_bits("0011.1100", q).unwrap(), 3.75);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CordicError, CordicResult};

/// Width of the register / LUT container in bits
pub const CONTAINER_BITS: u32 = 32;

/// Signed Qm.n format descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "QFormatFields", into = "QFormatFields")]
pub struct QFormat {
    m: u32,
    n: u32,
}

#[derive(Serialize, Deserialize)]
struct QFormatFields {
    m: u32,
    n: u32,
}

impl TryFrom<QFormatFields> for QFormat {
    type Error = CordicError;

    fn try_from(fields: QFormatFields) -> CordicResult<Self> {
        QFormat::new(fields.m, fields.n)
    }
}

impl From<QFormat> for QFormatFields {
    fn from(q: QFormat) -> Self {
        Self { m: q.m, n: q.n }
    }
}

impl QFormat {
    /// Q3.28, the default register format of the CORDIC unit
    pub const Q3_28: QFormat = QFormat { m: 3, n: 28 };

    /// Create a format with `m` integer bits and `n` fractional bits.
    ///
    /// Fails with [`CordicError::Config`] if `1 + m + n` exceeds the
    /// 32-bit container.
    pub fn new(m: u32, n: u32) -> CordicResult<Self> {
        let total = m
            .checked_add(n)
            .and_then(|bits| bits.checked_add(1))
            .unwrap_or(u32::MAX);
        if total > CONTAINER_BITS {
            return Err(CordicError::Config(format!(
                "Q{}.{} exceeds {}-bit width: 1 (sign) + {} + {} = {}",
                m, n, CONTAINER_BITS, m, n, total
            )));
        }
        Ok(Self { m, n })
    }

    /// Integer bits (excluding sign)
    pub fn m(&self) -> u32 {
        self.m
    }

    /// Fractional bits
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Total pattern width, `1 + m + n`
    pub fn total_bits(&self) -> u32 {
        1 + self.m + self.n
    }

    /// Zero-filled low bits of the 32-bit container
    pub fn padding_bits(&self) -> u32 {
        CONTAINER_BITS - self.total_bits()
    }

    /// Mask covering the pattern bits (LSB-aligned)
    pub fn mask(&self) -> u32 {
        if self.total_bits() == CONTAINER_BITS {
            u32::MAX
        } else {
            (1u32 << self.total_bits()) - 1
        }
    }

    /// Scale factor `2^n`
    pub fn scale(&self) -> f64 {
        (1u64 << self.n) as f64
    }

    /// Grid step `2^-n`
    pub fn step(&self) -> f64 {
        1.0 / self.scale()
    }

    /// Most negative raw value, `-2^(m+n)`
    pub fn min_raw(&self) -> i64 {
        -(1i64 << (self.m + self.n))
    }

    /// Most positive raw value, `2^(m+n) - 1`
    pub fn max_raw(&self) -> i64 {
        (1i64 << (self.m + self.n)) - 1
    }

    /// Most negative representable value
    pub fn min_value(&self) -> f64 {
        self.min_raw() as f64 / self.scale()
    }

    /// Most positive representable value
    pub fn max_value(&self) -> f64 {
        self.max_raw() as f64 / self.scale()
    }

    /// Wrap an arbitrary integer to the format width, two's-complement style.
    pub fn wrap(&self, raw: i64) -> i64 {
        let width = self.total_bits();
        let modulus = 1i64 << width;
        let low = raw.rem_euclid(modulus);
        if low >= modulus >> 1 {
            low - modulus
        } else {
            low
        }
    }

    fn range_error(&self, value: f64) -> CordicError {
        CordicError::Range {
            value,
            m: self.m,
            n: self.n,
            min: self.min_value(),
            max: self.max_value(),
        }
    }
}

impl fmt::Display for QFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}.{}", self.m, self.n)
    }
}

/// A value quantized onto a Qm.n grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedWord {
    raw: i64,
    format: QFormat,
}

impl FixedWord {
    /// Wrap an already-scaled integer, checking it against the format range.
    pub fn from_raw(raw: i64, format: QFormat) -> CordicResult<Self> {
        if raw < format.min_raw() || raw > format.max_raw() {
            return Err(format.range_error(raw as f64 / format.scale()));
        }
        Ok(Self { raw, format })
    }

    /// Interpret an LSB-aligned two's-complement pattern of `1 + m + n` bits.
    pub fn from_pattern(pattern: u32, format: QFormat) -> CordicResult<Self> {
        let width = format.total_bits();
        if pattern & !format.mask() != 0 {
            return Err(CordicError::Format(format!(
                "Pattern 0x{:08X} is wider than {} bits",
                pattern, width
            )));
        }
        let unsigned = pattern as i64;
        let raw = if unsigned & (1i64 << (width - 1)) != 0 {
            unsigned - (1i64 << width)
        } else {
            unsigned
        };
        Ok(Self { raw, format })
    }

    /// Interpret a left-justified 32-bit container word.
    pub fn from_word(word: u32, format: QFormat) -> CordicResult<Self> {
        let padding = format.padding_bits();
        if padding > 0 && word & ((1u32 << padding) - 1) != 0 {
            return Err(CordicError::Format(format!(
                "Word 0x{:08X} has non-zero bits below the {} format ({} padding bits)",
                word, format, padding
            )));
        }
        let pattern = if padding == 0 { word } else { word >> padding };
        Self::from_pattern(pattern, format)
    }

    /// Signed scaled integer, `round(value * 2^n)`
    pub fn raw(&self) -> i64 {
        self.raw
    }

    pub fn format(&self) -> QFormat {
        self.format
    }

    /// Two's-complement pattern, LSB-aligned
    pub fn pattern(&self) -> u32 {
        (self.raw as u32) & self.format.mask()
    }

    /// Pattern left-justified in the 32-bit container
    pub fn word(&self) -> u32 {
        self.pattern() << self.format.padding_bits()
    }

    /// Decoded real value
    pub fn to_f64(&self) -> f64 {
        self.raw as f64 / self.format.scale()
    }

    /// Bit string with a radix marker after the sign and integer bits.
    pub fn bit_string(&self) -> String {
        let width = self.format.total_bits() as usize;
        let digits = format!("{:0width$b}", self.pattern(), width = width);
        let split = 1 + self.format.m() as usize;
        format!("{}.{}", &digits[..split], &digits[split..])
    }

    /// Container word as `0xXXXXXXXX`
    pub fn hex(&self) -> String {
        format!("0x{:08X}", self.word())
    }
}

impl fmt::Display for FixedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bit_string())
    }
}

/// Strictly encode `value` into `format`.
///
/// Fails with [`CordicError::Range`] if `value` is not finite or lies outside
/// `[min_value, max_value]`; never clamps.
pub fn encode(value: f64, format: QFormat) -> CordicResult<FixedWord> {
    if !value.is_finite() || value < format.min_value() || value > format.max_value() {
        return Err(format.range_error(value));
    }
    let scaled = (value * format.scale()).round() as i64;
    FixedWord::from_raw(scaled, format)
}

/// Encode `value`, clamping to the representable range instead of failing.
///
/// NaN maps to zero. Only meant for internally derived constants such as
/// LUT angles, never for user input.
pub fn encode_saturating(value: f64, format: QFormat) -> FixedWord {
    let scaled = if value.is_nan() {
        0
    } else {
        let rounded = (value * format.scale()).round();
        if rounded >= format.max_raw() as f64 {
            format.max_raw()
        } else if rounded <= format.min_raw() as f64 {
            format.min_raw()
        } else {
            rounded as i64
        }
    };
    FixedWord {
        raw: scaled,
        format,
    }
}

/// Decode a bit string, with or without the radix marker.
pub fn decode_bits(bits: &str, format: QFormat) -> CordicResult<f64> {
    let digits: String = bits.chars().filter(|&c| c != '.').collect();
    if let Some(bad) = digits.chars().find(|&c| c != '0' && c != '1') {
        return Err(CordicError::Format(format!(
            "Invalid character '{}' in bit string \"{}\"",
            bad, bits
        )));
    }
    let width = format.total_bits() as usize;
    if digits.len() != width {
        return Err(CordicError::Format(format!(
            "Bit string must be {} bits (excluding dot), got {}",
            width,
            digits.len()
        )));
    }
    let pattern = u32::from_str_radix(&digits, 2)
        .map_err(|e| CordicError::Format(format!("Bad bit string \"{}\": {}", bits, e)))?;
    decode_pattern(pattern, format)
}

/// Decode an LSB-aligned two's-complement pattern.
pub fn decode_pattern(pattern: u32, format: QFormat) -> CordicResult<f64> {
    Ok(FixedWord::from_pattern(pattern, format)?.to_f64())
}

/// Decode a left-justified 32-bit container word.
pub fn decode_word(word: u32, format: QFormat) -> CordicResult<f64> {
    Ok(FixedWord::from_word(word, format)?.to_f64())
}
