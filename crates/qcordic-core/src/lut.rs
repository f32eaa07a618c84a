//! CORDIC arctangent lookup table and gain generator
//!
//! For `n_iter` iterations the table holds `atan(2^-i)` for `i` in
//! `0..n_iter` and the gain
//!
//! ```text
//! K = prod_{i=0}^{n_iter-1} sqrt(1 + 2^(-2i))        (K > 1, ~1.6468)
//! ```
//!
//! Raw CORDIC outputs carry `K`; divide by it to recover a unit-gain
//! rotation. The table can be quantized into left-justified Qm.n words for
//! sequential loading into an external lookup memory.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{CordicError, CordicResult};
use crate::fixed_point::{encode_saturating, QFormat};

/// Placeholder replaced by the HDL parameter block
pub const HDL_PARAMETERS_MARKER: &str = "//// PUT PARAMETERS HERE ////";

/// Placeholder replaced by the LUT initialization lines
pub const HDL_LUT_INIT_MARKER: &str = "//// PUT LUT INIT HERE ////";

/// Arctangent table plus cumulative gain for one iteration count
#[derive(Debug, Clone, PartialEq)]
pub struct CordicLut {
    angles: Vec<f64>,
    gain: f64,
}

impl CordicLut {
    /// Generate the table for `iterations` micro-rotations.
    pub fn generate(iterations: usize) -> CordicResult<Self> {
        if iterations == 0 {
            return Err(CordicError::Config(
                "CORDIC needs at least one iteration".to_string(),
            ));
        }

        let mut angles = Vec::with_capacity(iterations);
        let mut gain = 1.0;
        for i in 0..iterations {
            let shift = 2.0_f64.powi(-(i as i32));
            angles.push(shift.atan());
            gain *= (1.0 + shift * shift).sqrt();
        }

        tracing::debug!(iterations, gain, "Generated CORDIC LUT");
        Ok(Self { angles, gain })
    }

    /// Number of iterations covered by the table
    pub fn iterations(&self) -> usize {
        self.angles.len()
    }

    /// `atan(2^-i)` in radians, index 0 first
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Cumulative gain `K`
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// `1 / K`, the factor that restores unit gain
    pub fn inverse_gain(&self) -> f64 {
        1.0 / self.gain
    }

    /// Sum of all table angles; rotations beyond this do not converge.
    pub fn convergence_limit(&self) -> f64 {
        self.angles.iter().sum()
    }

    /// Quantize the table into left-justified 32-bit words (clamping policy).
    pub fn quantize(&self, format: QFormat) -> Vec<u32> {
        quantize(&self.angles, format)
    }

    /// Quantized table as `0xXXXXXXXX` strings, index 0 first.
    pub fn hex_words(&self, format: QFormat) -> Vec<String> {
        self.quantize(format)
            .into_iter()
            .map(|word| format!("0x{:08X}", word))
            .collect()
    }

    /// Human-readable listing: float angles, or hex words when a format is given.
    pub fn describe(&self, format: Option<QFormat>) -> String {
        let mut out = String::from("# CORDIC Arctan LUT\n");
        match format {
            None => {
                for (i, angle) in self.angles.iter().enumerate() {
                    let _ = writeln!(out, "iter {:2}: atan(2^-{}) = {:.12} rad", i, i, angle);
                }
            }
            Some(fmt) => {
                for (i, word) in self.hex_words(fmt).iter().enumerate() {
                    let _ = writeln!(out, "iter {:2}: {}", i, word);
                }
            }
        }
        let _ = writeln!(out, "\n# CORDIC Gain K = {:.12}", self.gain);
        out
    }

    /// One HDL assignment per table entry, in iteration order.
    pub fn hdl_init_lines(&self, format: QFormat) -> String {
        let mut out = String::new();
        for (i, word) in self.quantize(format).iter().enumerate() {
            let _ = writeln!(out, "\t\t\tlookup_table[{}] <= 32'h{:08X};", i, word);
        }
        out
    }

    /// Substitute the parameter and LUT markers of an HDL template.
    pub fn fill_hdl_template(&self, template: &str, format: QFormat) -> CordicResult<String> {
        for marker in [HDL_PARAMETERS_MARKER, HDL_LUT_INIT_MARKER] {
            if !template.contains(marker) {
                return Err(CordicError::Format(format!(
                    "HDL template is missing marker \"{}\"",
                    marker
                )));
            }
        }

        let parameters = format!(
            "parameter N = {},\nparameter I = {},",
            format.total_bits(),
            self.iterations()
        );
        Ok(template
            .replace(HDL_PARAMETERS_MARKER, &parameters)
            .replace(HDL_LUT_INIT_MARKER, &self.hdl_init_lines(format)))
    }

    /// Persist the gain as a single decimal line.
    pub fn write_gain(&self, path: impl AsRef<Path>) -> CordicResult<()> {
        fs::write(path.as_ref(), format!("{}\n", self.gain))?;
        tracing::info!(path = %path.as_ref().display(), gain = self.gain, "Wrote gain artifact");
        Ok(())
    }
}

/// Quantize `angles` into left-justified Qm.n words, clamping out-of-range
/// values to the representable extremes.
pub fn quantize(angles: &[f64], format: QFormat) -> Vec<u32> {
    angles
        .iter()
        .map(|&angle| encode_saturating(angle, format).word())
        .collect()
}

/// Read a gain written by [`CordicLut::write_gain`].
pub fn read_gain(path: impl AsRef<Path>) -> CordicResult<f64> {
    let text = fs::read_to_string(path.as_ref())?;
    let trimmed = text.trim();
    let gain: f64 = trimmed.parse().map_err(|_| {
        CordicError::Format(format!(
            "Gain artifact {} does not hold a number: \"{}\"",
            path.as_ref().display(),
            trimmed
        ))
    })?;
    if !gain.is_finite() || gain <= 0.0 {
        return Err(CordicError::Format(format!(
            "Gain artifact {} holds an invalid gain {}",
            path.as_ref().display(),
            gain
        )));
    }
    Ok(gain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::decode_word;
    use approx::assert_relative_eq;

    #[test]
    fn test_angles_decrease() {
        let lut = CordicLut::generate(16).unwrap();
        assert_eq!(lut.iterations(), 16);
        assert_relative_eq!(lut.angles()[0], std::f64::consts::FRAC_PI_4);
        assert!(lut.angles().windows(2).all(|w| w[0] > w[1] && w[1] > 0.0));
    }

    #[test]
    fn test_gain_converges() {
        let k16 = CordicLut::generate(16).unwrap().gain();
        let k20 = CordicLut::generate(20).unwrap().gain();
        assert!((k16 - k20).abs() < 1e-6);
        assert!((k20 - 1.646760258).abs() < 1e-6, "K = {}", k20);
        assert!((CordicLut::generate(20).unwrap().inverse_gain() - 0.607252935).abs() < 1e-6);
    }

    #[test]
    fn test_convergence_limit() {
        let limit = CordicLut::generate(16).unwrap().convergence_limit();
        assert!(limit > std::f64::consts::FRAC_PI_2);
        assert!((limit.to_degrees() - 99.88).abs() < 0.01);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(matches!(CordicLut::generate(0), Err(CordicError::Config(_))));
    }

    #[test]
    fn test_quantize_embedding_format() {
        let fmt = QFormat::new(0, 30).unwrap();
        let lut = CordicLut::generate(4).unwrap();
        let words = lut.quantize(fmt);
        assert_eq!(words.len(), 4);
        assert!(words.iter().all(|w| w & 1 == 0));

        let hex = lut.hex_words(fmt);
        assert_eq!(hex.len(), 4);
        assert!(hex.iter().all(|h| h.len() == 10 && h.starts_with("0x")));

        for (word, angle) in words.iter().zip(lut.angles()) {
            assert!((decode_word(*word, fmt).unwrap() - angle).abs() <= fmt.step());
        }
    }

    #[test]
    fn test_quantize_clamps() {
        let fmt = QFormat::new(0, 7).unwrap();
        let words = quantize(&[0.9999, 1.5, -3.0], fmt);
        assert_eq!(words[0], 0x7F00_0000);
        assert_eq!(words[1], 0x7F00_0000);
        assert_eq!(words[2], 0x8000_0000);
    }

    #[test]
    fn test_describe_listing() {
        let lut = CordicLut::generate(2).unwrap();
        let text = lut.describe(None);
        assert!(text.contains("iter  0: atan(2^-0) = 0.785398163397 rad"));
        assert!(text.contains("# CORDIC Gain K = 1.581138830084"));

        let fmt = QFormat::new(2, 29).unwrap();
        assert!(lut.describe(Some(fmt)).contains("iter  0: 0x"));
    }

    #[test]
    fn test_fill_hdl_template() {
        let fmt = QFormat::new(2, 29).unwrap();
        let lut = CordicLut::generate(3).unwrap();
        let template = format!("module cordic #(\n{}\n);\n{}endmodule\n", HDL_PARAMETERS_MARKER, HDL_LUT_INIT_MARKER);
        let filled = lut.fill_hdl_template(&template, fmt).unwrap();
        assert!(filled.contains("parameter N = 32,\nparameter I = 3,"));
        assert_eq!(filled.matches("lookup_table[").count(), 3);
        assert!(filled.contains("lookup_table[0] <= 32'h"));

        assert!(matches!(
            lut.fill_hdl_template("module x; endmodule", fmt),
            Err(CordicError::Format(_))
        ));
    }

    #[test]
    fn test_gain_artifact_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cordic_k");
        let lut = CordicLut::generate(16).unwrap();
        lut.write_gain(&path).unwrap();
        assert_eq!(read_gain(&path).unwrap(), lut.gain());

        std::fs::write(&path, "not a gain\n").unwrap();
        assert!(matches!(read_gain(&path), Err(CordicError::Format(_))));
        assert!(matches!(read_gain(dir.path().join("missing")), Err(CordicError::Io(_))));
    }
}
