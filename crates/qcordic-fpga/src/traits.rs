//! CORDIC unit-under-test contract

use crate::error::UnitResult;
use crate::types::{InputRegisters, OutputRegisters, UnitInfo};

/// Register-level handshake of a CORDIC unit
///
/// The unit exposes a clocked start/done handshake over a fixed register
/// set. Every backend (bit-accurate simulation, golden model, hardware)
/// implements the same primitive signals; the harness owns the ordering.
///
/// `clock_edge` is the only suspension point: the caller yields there until
/// the unit has advanced one rising edge, and resumes deterministically.
///
/// # Example
///
/// ```rust
/// use qcordic_fpga::{CordicUnit, InputRegisters, SimulatedCordicUnit};
/// use qcordic_core::{CordicMode, CordicState, QFormat};
///
/// let fmt = QFormat::new(3, 28).unwrap();
/// let mut unit = SimulatedCordicUnit::new(fmt, 16).unwrap();
/// unit.reset(1).unwrap();
///
/// let state = CordicState::new(1.0, 0.0, 0.785398);
/// unit.write_inputs(&InputRegisters::encode(state, CordicMode::Rotation, fmt).unwrap()).unwrap();
/// unit.pulse_start().unwrap();
/// while !unit.poll_done().unwrap() {
///     unit.clock_edge().unwrap();
/// }
/// let out = unit.read_outputs().unwrap().decode(fmt).unwrap();
/// assert!(out.z.abs() < 1e-3);
/// ```
pub trait CordicUnit: Send {
    /// Static information about the unit
    fn info(&self) -> UnitInfo;

    /// Drive the reset line (`true` = asserted)
    fn set_reset(&mut self, asserted: bool) -> UnitResult<()>;

    /// Drive `Xi`, `Yi`, `Zi` and `rot_vec`
    fn write_inputs(&mut self, inputs: &InputRegisters) -> UnitResult<()>;

    /// Drive the start strobe level
    fn set_start(&mut self, level: bool) -> UnitResult<()>;

    /// Wait for the next rising clock edge
    fn clock_edge(&mut self) -> UnitResult<()>;

    /// Sample the `done` level
    fn poll_done(&self) -> UnitResult<bool>;

    /// Sample `Xr`, `Yr`, `Zr`
    fn read_outputs(&self) -> UnitResult<OutputRegisters>;

    /// Assert reset, hold for `hold_cycles` edges, deassert, wait one edge.
    fn reset(&mut self, hold_cycles: u32) -> UnitResult<()> {
        self.set_reset(true)?;
        for _ in 0..hold_cycles {
            self.clock_edge()?;
        }
        self.set_reset(false)?;
        self.clock_edge()
    }

    /// Raise start for exactly one clock edge.
    fn pulse_start(&mut self) -> UnitResult<()> {
        self.set_start(true)?;
        self.clock_edge()?;
        self.set_start(false)
    }
}

impl<U: CordicUnit + ?Sized> CordicUnit for Box<U> {
    fn info(&self) -> UnitInfo {
        (**self).info()
    }

    fn set_reset(&mut self, asserted: bool) -> UnitResult<()> {
        (**self).set_reset(asserted)
    }

    fn write_inputs(&mut self, inputs: &InputRegisters) -> UnitResult<()> {
        (**self).write_inputs(inputs)
    }

    fn set_start(&mut self, level: bool) -> UnitResult<()> {
        (**self).set_start(level)
    }

    fn clock_edge(&mut self) -> UnitResult<()> {
        (**self).clock_edge()
    }

    fn poll_done(&self) -> UnitResult<bool> {
        (**self).poll_done()
    }

    fn read_outputs(&self) -> UnitResult<OutputRegisters> {
        (**self).read_outputs()
    }

    fn reset(&mut self, hold_cycles: u32) -> UnitResult<()> {
        (**self).reset(hold_cycles)
    }

    fn pulse_start(&mut self) -> UnitResult<()> {
        (**self).pulse_start()
    }
}
