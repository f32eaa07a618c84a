//! QCordic unit-under-test layer
//!
//! Register-level contract for a clocked CORDIC unit plus the harness that
//! verifies it against the floating-point golden model:
//!
//! - **[`CordicUnit`]**: reset / write inputs / start / clock / done / read outputs
//! - **Simulation**: bit-accurate integer model, one micro-rotation per edge
//! - **Golden model**: the floating-point engine behind the same handshake
//! - **[`harness`]**: directed, swept and random suites with tolerance checks
//!
//! # Feature Flags
//!
//! - `sim` (default): bit-accurate simulated unit
//!
//! # Example
//!
//! ```rust
//! use qcordic_fpga::harness::{Harness, HarnessConfig, TestPlan};
//!
//! let config = HarnessConfig::default();
//! let harness = Harness::new(config.clone()).unwrap();
//! let mut unit = qcordic_fpga::create_default(&config).unwrap();
//!
//! let report = harness.run_plan(&mut unit, &TestPlan::directed()).unwrap();
//! assert_eq!(report.passed(), 1);
//! ```

pub mod error;
pub mod golden;
pub mod harness;
pub mod registers;
pub mod traits;
pub mod types;

#[cfg(feature = "sim")]
pub mod sim;

// Re-export main types
pub use error::{UnitError, UnitResult};
pub use golden::GoldenModelUnit;
pub use harness::{Harness, HarnessConfig, TestPlan, VerificationReport};
pub use traits::CordicUnit;
pub use types::{InputRegisters, OutputRegisters, TestVector, UnitInfo, UnitKind};

#[cfg(feature = "sim")]
pub use sim::SimulatedCordicUnit;

/// Create the default unit for `config`
///
/// The bit-accurate simulation when the `sim` feature is enabled, otherwise
/// the golden model.
pub fn create_default(config: &HarnessConfig) -> UnitResult<Box<dyn CordicUnit>> {
    #[cfg(feature = "sim")]
    {
        Ok(Box::new(SimulatedCordicUnit::new(
            config.format,
            config.iterations,
        )?))
    }

    #[cfg(not(feature = "sim"))]
    {
        Ok(Box::new(GoldenModelUnit::new(
            config.format,
            config.iterations,
        )?))
    }
}

/// Create `count` independently named units for a parallel run
pub fn create_units(config: &HarnessConfig, count: usize) -> UnitResult<Vec<Box<dyn CordicUnit>>> {
    (0..count)
        .map(|i| -> UnitResult<Box<dyn CordicUnit>> {
            #[cfg(feature = "sim")]
            let unit = SimulatedCordicUnit::new(config.format, config.iterations)?
                .with_name(format!("sim_cordic_{}", i));
            #[cfg(not(feature = "sim"))]
            let unit = GoldenModelUnit::new(config.format, config.iterations)?
                .with_name(format!("golden_cordic_{}", i));
            Ok(Box::new(unit))
        })
        .collect()
}
