//! Per-vector results and run summary

use std::fmt;

use qcordic_core::CordicState;
use serde::{Deserialize, Serialize};

use super::plan::Suite;
use crate::types::{OutputRegisters, TestVector};

/// One output register outside tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Output register name (`Xr`, `Yr` or `Zr`)
    pub register: String,
    pub expected: f64,
    pub actual: f64,
    /// Absolute error `|actual - expected|`
    pub error: f64,
    /// Why the register word could not be decoded, if it could not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(
                f,
                "{} undecodable, expected ~ {} ({})",
                self.register, self.expected, detail
            ),
            None => write!(
                f,
                "{} = {}, expected ~ {} (error {:.3e})",
                self.register, self.actual, self.expected, self.error
            ),
        }
    }
}

/// Outcome of one vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VectorOutcome {
    Passed,
    Failed { mismatches: Vec<Mismatch> },
    /// Not sent to the unit, usually outside the convergence domain
    Skipped { reason: String },
}

/// Result of running one vector through the unit and the golden model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorResult {
    /// Position in the plan
    pub index: usize,
    pub suite: Suite,
    /// Vector as planned
    pub vector: TestVector,
    /// Vector actually driven after quadrant correction
    pub applied: Option<TestVector>,
    /// Golden-model outputs (carrying gain K)
    pub expected: Option<CordicState>,
    /// Raw `Xr`, `Yr`, `Zr` container words as read from the unit
    pub words: Option<OutputRegisters>,
    /// Decoded unit outputs, absent when a word could not be decoded
    pub actual: Option<CordicState>,
    pub outcome: VectorOutcome,
    /// Clock edges from start pulse to `done`
    pub cycles: u64,
}

impl VectorResult {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, VectorOutcome::Passed)
    }

    pub fn failed(&self) -> bool {
        matches!(self.outcome, VectorOutcome::Failed { .. })
    }

    pub fn skipped(&self) -> bool {
        matches!(self.outcome, VectorOutcome::Skipped { .. })
    }
}

impl fmt::Display for VectorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} #{}] {}", self.suite, self.index, self.vector)?;
        match &self.outcome {
            VectorOutcome::Passed => write!(f, ": passed"),
            VectorOutcome::Skipped { reason } => write!(f, ": skipped ({})", reason),
            VectorOutcome::Failed { mismatches } => {
                write!(f, ": FAILED")?;
                if let Some(words) = &self.words {
                    write!(
                        f,
                        " [Xr=0x{:08X} Yr=0x{:08X} Zr=0x{:08X}]",
                        words.xr, words.yr, words.zr
                    )?;
                }
                for m in mismatches {
                    write!(f, "; {}", m)?;
                }
                Ok(())
            }
        }
    }
}

/// Aggregated results of a verification run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Unit name(s) the plan ran against
    pub unit: String,
    pub results: Vec<VectorResult>,
}

impl VerificationReport {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: VectorResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.skipped()).count()
    }

    /// True when no vector failed; skipped vectors do not count against the run
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &VectorResult> {
        self.results.iter().filter(|r| r.failed())
    }

    /// Results belonging to `suite`
    pub fn suite(&self, suite: Suite) -> impl Iterator<Item = &VectorResult> {
        self.results.iter().filter(move |r| r.suite == suite)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} vectors, {} passed, {} failed, {} skipped",
            self.unit,
            self.total(),
            self.passed(),
            self.failed(),
            self.skipped()
        )?;
        for result in self.failures() {
            writeln!(f, "  {}", result)?;
        }
        Ok(())
    }
}
