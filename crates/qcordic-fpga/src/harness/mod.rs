//! Verification harness
//!
//! Drives test vectors through a [`CordicUnit`] and checks every output
//! register against the floating-point [`CordicEngine`] within an absolute
//! tolerance. Per vector the protocol is fixed:
//!
//! 1. reset (assert, hold, deassert, one edge)
//! 2. encode and write `Xi`, `Yi`, `Zi`, `rot_vec`
//! 3. pulse start for one edge
//! 4. poll `done` on every edge, at most `max_cycles` edges
//! 5. read and decode `Xr`, `Yr`, `Zr`, compare against the golden model
//!
//! Tolerance mismatches and undecodable output words are recorded and the
//! run continues. A timeout or protocol error aborts the run.
//!
//! ## Example
//!
//! ```rust
//! use qcordic_fpga::harness::{Harness, HarnessConfig, TestPlan};
//! use qcordic_fpga::SimulatedCordicUnit;
//!
//! let config = HarnessConfig::default();
//! let harness = Harness::new(config.clone()).unwrap();
//! let mut unit = SimulatedCordicUnit::new(config.format, config.iterations).unwrap();
//!
//! let report = harness.run_plan(&mut unit, &TestPlan::standard()).unwrap();
//! assert!(report.is_success(), "{}", report);
//! ```

mod config;
mod plan;
mod report;

pub use config::HarnessConfig;
pub use plan::{
    PlannedVector, Suite, TestPlan, ROTATION_SWEEP_STEP_DEG, VECTORING_EXTENT,
    VECTORING_SWEEP_STEP,
};
pub use report::{Mismatch, VectorOutcome, VectorResult, VerificationReport};

use std::f64::consts::{FRAC_PI_2, PI};

use qcordic_core::{decode_word, CordicEngine, CordicMode, CordicResult, CordicState};
use rayon::prelude::*;

use crate::error::{UnitError, UnitResult};
use crate::traits::CordicUnit;
use crate::types::{InputRegisters, OutputRegisters, TestVector};

/// Golden-model comparison harness
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    engine: CordicEngine,
}

impl Harness {
    /// Create a harness; the golden engine is built from `config.iterations`.
    pub fn new(config: HarnessConfig) -> UnitResult<Self> {
        config.validate()?;
        let engine = CordicEngine::new(config.iterations)?;
        tracing::debug!(
            format = %config.format,
            iterations = config.iterations,
            gain = engine.gain(),
            tolerance = config.tolerance,
            "harness ready"
        );
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Golden-model engine
    pub fn engine(&self) -> &CordicEngine {
        &self.engine
    }

    /// Map `vector` into the convergence domain.
    ///
    /// With quadrant correction enabled, rotation angles beyond the limit are
    /// pre-rotated by ±π/2 and vectoring inputs in the left half-plane by π
    /// (or ±π/2 on the y axis). Whatever remains out of domain is rejected.
    pub fn prepare(&self, vector: &TestVector) -> CordicResult<TestVector> {
        let applied = if self.config.quadrant_correction {
            self.quadrant_correct(*vector)
        } else {
            *vector
        };
        self.engine.check_domain(applied.state(), applied.mode)?;
        Ok(applied)
    }

    fn quadrant_correct(&self, v: TestVector) -> TestVector {
        let TestVector { x, y, z, mode } = v;
        match mode {
            CordicMode::Rotation if z.abs() > self.engine.convergence_limit() => {
                if z > 0.0 {
                    TestVector::new(-y, x, z - FRAC_PI_2, mode)
                } else {
                    TestVector::new(y, -x, z + FRAC_PI_2, mode)
                }
            }
            CordicMode::Vectoring if x < 0.0 => {
                let z = if y >= 0.0 { z + PI } else { z - PI };
                TestVector::new(-x, -y, z, mode)
            }
            CordicMode::Vectoring if x == 0.0 && y > 0.0 => {
                TestVector::new(y, -x, z + FRAC_PI_2, mode)
            }
            CordicMode::Vectoring if x == 0.0 && y < 0.0 => {
                TestVector::new(-y, x, z - FRAC_PI_2, mode)
            }
            _ => v,
        }
    }

    /// Golden outputs for an in-domain vector, carrying gain K
    ///
    /// Vectoring expectations are closed form: magnitude `K * hypot(x, y)`,
    /// residual `y = 0` and angle `z + atan(y / x)`. Rotation expectations
    /// come from the engine.
    pub fn expected(&self, applied: &TestVector) -> CordicResult<CordicState> {
        let TestVector { x, y, z, mode } = *applied;
        match mode {
            CordicMode::Rotation => self.engine.run(applied.state(), mode),
            CordicMode::Vectoring => {
                self.engine.check_domain(applied.state(), mode)?;
                Ok(CordicState::new(
                    self.engine.gain() * x.hypot(y),
                    0.0,
                    z + (y / x).atan(),
                ))
            }
        }
    }

    /// Check that `unit` matches the configured format and iteration count.
    pub fn check_unit<U: CordicUnit + ?Sized>(&self, unit: &U) -> UnitResult<()> {
        let info = unit.info();
        if info.format != self.config.format || info.iterations != self.config.iterations {
            return Err(UnitError::Protocol(format!(
                "unit '{}' is {} with {} iterations, harness expects {} with {}",
                info.name, info.format, info.iterations, self.config.format, self.config.iterations
            )));
        }
        Ok(())
    }

    /// Run one vector through the full protocol.
    ///
    /// Returns `Err` only for failures that invalidate the rest of the run
    /// (timeout, protocol violation). Out-of-domain and unrepresentable
    /// vectors come back as [`VectorOutcome::Skipped`]; output words that do
    /// not decode in the configured format are a [`VectorOutcome::Failed`].
    pub fn run_vector<U: CordicUnit + ?Sized>(
        &self,
        unit: &mut U,
        index: usize,
        planned: &PlannedVector,
    ) -> UnitResult<VectorResult> {
        let mut result = VectorResult {
            index,
            suite: planned.suite,
            vector: planned.vector,
            applied: None,
            expected: None,
            words: None,
            actual: None,
            outcome: VectorOutcome::Passed,
            cycles: 0,
        };

        let (applied, expected, inputs) = match self.stage(&planned.vector) {
            Ok(staged) => staged,
            Err(e) if e.is_input_error() => {
                tracing::debug!(index, vector = %planned.vector, reason = %e, "vector skipped");
                result.outcome = VectorOutcome::Skipped {
                    reason: e.to_string(),
                };
                return Ok(result);
            }
            Err(e) => return Err(e.into()),
        };
        result.applied = Some(applied);
        result.expected = Some(expected);

        unit.reset(self.config.reset_hold_cycles)?;
        unit.write_inputs(&inputs)?;
        unit.pulse_start()?;
        result.cycles = self.wait_for_done(unit)?;

        let words = unit.read_outputs()?;
        result.words = Some(words);

        let mismatches = match words.decode(self.config.format) {
            Ok(actual) => {
                result.actual = Some(actual);
                self.compare(&expected, &actual)
            }
            Err(e) => {
                tracing::debug!(index, reason = %e, "output words do not decode");
                self.compare_words(&expected, &words)
            }
        };
        if mismatches.is_empty() {
            tracing::debug!(index, suite = %planned.suite, cycles = result.cycles, "vector passed");
        } else {
            tracing::warn!(
                index,
                suite = %planned.suite,
                vector = %planned.vector,
                expected = %expected,
                ?words,
                "vector failed"
            );
            result.outcome = VectorOutcome::Failed { mismatches };
        }
        Ok(result)
    }

    /// Domain handling, golden model and input encoding for one vector.
    fn stage(
        &self,
        vector: &TestVector,
    ) -> CordicResult<(TestVector, CordicState, InputRegisters)> {
        let applied = self.prepare(vector)?;
        let expected = self.expected(&applied)?;
        // Golden outputs must fit the register format, or the unit would wrap
        OutputRegisters::encode(expected, self.config.format)?;
        let inputs = InputRegisters::encode(applied.state(), applied.mode, self.config.format)?;
        Ok((applied, expected, inputs))
    }

    /// Poll `done` once per clock edge, at most `max_cycles` edges.
    fn wait_for_done<U: CordicUnit + ?Sized>(&self, unit: &mut U) -> UnitResult<u64> {
        for cycle in 1..=self.config.max_cycles {
            unit.clock_edge()?;
            if unit.poll_done()? {
                return Ok(cycle);
            }
        }
        let unit_name = unit.info().name;
        tracing::error!(unit = %unit_name, cycles = self.config.max_cycles, "timed out waiting for done");
        Err(UnitError::Timeout {
            unit: unit_name,
            cycles: self.config.max_cycles,
        })
    }

    /// Output registers whose error exceeds the tolerance
    pub fn compare(&self, expected: &CordicState, actual: &CordicState) -> Vec<Mismatch> {
        [
            ("Xr", expected.x, actual.x),
            ("Yr", expected.y, actual.y),
            ("Zr", expected.z, actual.z),
        ]
        .into_iter()
        .filter_map(|(register, expected, actual)| self.check(register, expected, actual))
        .collect()
    }

    /// Register-by-register comparison of raw words; a word that does not
    /// decode is a mismatch carrying the decode error.
    pub fn compare_words(&self, expected: &CordicState, words: &OutputRegisters) -> Vec<Mismatch> {
        [
            ("Xr", expected.x, words.xr),
            ("Yr", expected.y, words.yr),
            ("Zr", expected.z, words.zr),
        ]
        .into_iter()
        .filter_map(
            |(register, expected, word)| match decode_word(word, self.config.format) {
                Ok(actual) => self.check(register, expected, actual),
                Err(e) => Some(Mismatch {
                    register: register.to_string(),
                    expected,
                    actual: f64::NAN,
                    error: f64::NAN,
                    detail: Some(e.to_string()),
                }),
            },
        )
        .collect()
    }

    fn check(&self, register: &str, expected: f64, actual: f64) -> Option<Mismatch> {
        let error = (actual - expected).abs();
        (error.is_nan() || error > self.config.tolerance).then(|| Mismatch {
            register: register.to_string(),
            expected,
            actual,
            error,
            detail: None,
        })
    }

    /// Run every vector of `plan` in order against a single unit.
    pub fn run_plan<U: CordicUnit + ?Sized>(
        &self,
        unit: &mut U,
        plan: &TestPlan,
    ) -> UnitResult<VerificationReport> {
        self.check_unit(unit)?;
        let info = unit.info();
        tracing::info!(unit = %info.name, kind = info.kind.name(), vectors = plan.len(), "verification started");

        let mut report = VerificationReport::new(info.name);
        for (index, planned) in plan.iter().enumerate() {
            report.push(self.run_vector(unit, index, planned)?);
        }

        log_summary(&report);
        Ok(report)
    }

    /// Shard `plan` across independent units with rayon.
    ///
    /// Vector `i` runs on unit `i % units.len()`; each unit still sees one
    /// vector at a time. Results come back in plan order.
    pub fn run_parallel<U: CordicUnit>(
        &self,
        units: &mut [U],
        plan: &TestPlan,
    ) -> UnitResult<VerificationReport> {
        if units.is_empty() {
            return Err(UnitError::Protocol(
                "parallel run needs at least one unit".to_string(),
            ));
        }
        for unit in units.iter() {
            self.check_unit(unit)?;
        }

        let shards = units.len();
        let names: Vec<String> = units.iter().map(|u| u.info().name).collect();
        tracing::info!(units = shards, vectors = plan.len(), "parallel verification started");

        let per_unit: Vec<Vec<VectorResult>> = units
            .par_iter_mut()
            .enumerate()
            .map(|(shard, unit)| {
                plan.iter()
                    .enumerate()
                    .skip(shard)
                    .step_by(shards)
                    .map(|(index, planned)| self.run_vector(unit, index, planned))
                    .collect::<UnitResult<Vec<_>>>()
            })
            .collect::<UnitResult<_>>()?;

        let mut results: Vec<VectorResult> = per_unit.into_iter().flatten().collect();
        results.sort_by_key(|r| r.index);

        let report = VerificationReport {
            unit: names.join(","),
            results,
        };
        log_summary(&report);
        Ok(report)
    }
}

fn log_summary(report: &VerificationReport) {
    if report.is_success() {
        tracing::info!(
            unit = %report.unit,
            passed = report.passed(),
            skipped = report.skipped(),
            "verification passed"
        );
    } else {
        tracing::warn!(
            unit = %report.unit,
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "verification failed"
        );
    }
}
