//! Golden-model unit
//!
//! Wraps the floating-point [`CordicEngine`] behind the register handshake.
//! Inputs are latched on the start edge and `done` rises on the following
//! edge. Outputs are strictly encoded on read-back, so a result outside the
//! grid surfaces as a `Range` error.

use qcordic_core::{CordicEngine, CordicState, FixedWord, QFormat};

use crate::error::{UnitError, UnitResult};
use crate::traits::CordicUnit;
use crate::types::{InputRegisters, OutputRegisters, UnitInfo, UnitKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Computing,
    Done,
}

/// Reference unit driven by the floating-point engine
pub struct GoldenModelUnit {
    name: String,
    engine: CordicEngine,
    format: QFormat,
    inputs: Option<InputRegisters>,
    /// Inputs latched by the last start edge
    latched: Option<InputRegisters>,
    phase: Phase,
    reset: bool,
    start: bool,
}

impl GoldenModelUnit {
    pub fn new(format: QFormat, iterations: usize) -> UnitResult<Self> {
        Ok(Self::from_engine(format, CordicEngine::new(iterations)?))
    }

    pub fn from_engine(format: QFormat, engine: CordicEngine) -> Self {
        Self {
            name: "golden_cordic".to_string(),
            engine,
            format,
            inputs: None,
            latched: None,
            phase: Phase::Idle,
            reset: false,
            start: false,
        }
    }

    /// Builder: set the instance name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn engine(&self) -> &CordicEngine {
        &self.engine
    }

    fn compute(&self, inputs: &InputRegisters) -> UnitResult<OutputRegisters> {
        let value = |word| FixedWord::from_word(word, self.format).map(|w| w.to_f64());
        let state = CordicState::new(
            value(inputs.xi)?,
            value(inputs.yi)?,
            value(inputs.zi)?,
        );
        let out = self.engine.run(state, inputs.mode)?;
        Ok(OutputRegisters::encode(out, self.format)?)
    }
}

impl CordicUnit for GoldenModelUnit {
    fn info(&self) -> UnitInfo {
        UnitInfo {
            name: self.name.clone(),
            kind: UnitKind::GoldenModel,
            format: self.format,
            iterations: self.engine.iterations(),
        }
    }

    fn set_reset(&mut self, asserted: bool) -> UnitResult<()> {
        self.reset = asserted;
        Ok(())
    }

    fn write_inputs(&mut self, inputs: &InputRegisters) -> UnitResult<()> {
        self.inputs = Some(*inputs);
        Ok(())
    }

    fn set_start(&mut self, level: bool) -> UnitResult<()> {
        self.start = level;
        Ok(())
    }

    fn clock_edge(&mut self) -> UnitResult<()> {
        if self.reset {
            self.phase = Phase::Idle;
            self.latched = None;
            return Ok(());
        }

        match self.phase {
            Phase::Idle | Phase::Done if self.start => {
                let inputs = self.inputs.ok_or_else(|| {
                    UnitError::Protocol("start raised before inputs were written".to_string())
                })?;
                tracing::trace!(unit = %self.name, ?inputs, "golden model latched inputs");
                self.latched = Some(inputs);
                self.phase = Phase::Computing;
            }
            Phase::Computing => self.phase = Phase::Done,
            _ => {}
        }
        Ok(())
    }

    fn poll_done(&self) -> UnitResult<bool> {
        Ok(self.phase == Phase::Done)
    }

    fn read_outputs(&self) -> UnitResult<OutputRegisters> {
        match (self.phase, &self.latched) {
            (Phase::Done, Some(inputs)) => self.compute(inputs),
            _ => Ok(OutputRegisters::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcordic_core::CordicMode;

    #[test]
    fn test_done_on_edge_after_start() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = GoldenModelUnit::new(fmt, 16).unwrap();
        unit.reset(1).unwrap();
        let state = CordicState::new(1.0, 0.0, 0.5);
        unit.write_inputs(&InputRegisters::encode(state, CordicMode::Rotation, fmt).unwrap())
            .unwrap();
        unit.pulse_start().unwrap();
        assert!(!unit.poll_done().unwrap());
        unit.clock_edge().unwrap();
        assert!(unit.poll_done().unwrap());

        let out = unit.read_outputs().unwrap().decode(fmt).unwrap();
        let unscaled = unit.engine().unscale(out);
        assert!((unscaled.x - 0.5f64.cos()).abs() < 1e-4);
        assert!((unscaled.y - 0.5f64.sin()).abs() < 1e-4);
    }

    #[test]
    fn test_rejected_inputs_surface_on_read() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = GoldenModelUnit::new(fmt, 16).unwrap();
        let state = CordicState::new(-1.0, 0.5, 0.0);
        unit.write_inputs(&InputRegisters::encode(state, CordicMode::Vectoring, fmt).unwrap())
            .unwrap();
        unit.pulse_start().unwrap();
        unit.clock_edge().unwrap();
        assert!(unit.poll_done().unwrap());
        let err = unit.read_outputs().unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_result_outside_grid_is_range_error() {
        // K * 1.9 does not fit Q1.14
        let fmt = QFormat::new(1, 14).unwrap();
        let mut unit = GoldenModelUnit::new(fmt, 16).unwrap();
        let state = CordicState::new(1.9, 0.0, 0.0);
        unit.write_inputs(&InputRegisters::encode(state, CordicMode::Vectoring, fmt).unwrap())
            .unwrap();
        unit.pulse_start().unwrap();
        unit.clock_edge().unwrap();
        let err = unit.read_outputs().unwrap_err();
        assert!(matches!(
            err,
            UnitError::Cordic(qcordic_core::CordicError::Range { .. })
        ));
    }

    #[test]
    fn test_start_without_inputs() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = GoldenModelUnit::new(fmt, 8).unwrap();
        assert!(matches!(unit.pulse_start(), Err(UnitError::Protocol(_))));
    }
}
