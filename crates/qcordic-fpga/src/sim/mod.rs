//! Bit-accurate simulated CORDIC unit
//!
//! Models the register-transfer behavior of the hardware unit so the harness
//! can be developed and tested without a device:
//!
//! - a register file keyed by the offsets in [`registers::cordic`]
//! - an angle ROM loaded from the LUT embedding words
//! - one micro-rotation per rising edge in two's-complement integer
//!   arithmetic, arithmetic right shifts and wrap-around at the word width
//! - `done` rises after the last micro-rotation and holds until the next start

use std::collections::HashMap;

use qcordic_core::{CordicLut, CordicMode, FixedWord, QFormat};

use crate::error::{UnitError, UnitResult};
use crate::registers::cordic as regs;
use crate::traits::CordicUnit;
use crate::types::{InputRegisters, OutputRegisters, UnitInfo, UnitKind};

/// Datapath registers of an operation in flight
#[derive(Debug, Clone, Copy)]
struct Datapath {
    x: i64,
    y: i64,
    z: i64,
    mode: CordicMode,
    iteration: usize,
}

/// Simulated CORDIC unit for development without hardware
pub struct SimulatedCordicUnit {
    name: String,

    format: QFormat,

    /// Register file, including the angle ROM
    registers: HashMap<usize, u32>,

    /// Decoded angle ROM, one raw word per iteration
    angle_rom: Vec<i64>,

    reset: bool,
    start: bool,
    datapath: Option<Datapath>,

    /// Rising edges seen since construction
    cycles: u64,
}

impl SimulatedCordicUnit {
    /// Create a unit with an angle ROM generated for `iterations`.
    pub fn new(format: QFormat, iterations: usize) -> UnitResult<Self> {
        let lut = CordicLut::generate(iterations)?;
        Self::with_rom(format, &lut.quantize(format))
    }

    /// Create a unit whose angle ROM is loaded from embedding words.
    pub fn with_rom(format: QFormat, words: &[u32]) -> UnitResult<Self> {
        if words.is_empty() {
            return Err(UnitError::NotSupported(
                "angle ROM must hold at least one entry".to_string(),
            ));
        }

        let mut registers = HashMap::new();
        let mut angle_rom = Vec::with_capacity(words.len());
        for (i, &word) in words.iter().enumerate() {
            angle_rom.push(FixedWord::from_word(word, format)?.raw());
            registers.insert(regs::lut_entry(i), word);
        }

        Ok(Self {
            name: "sim_cordic".to_string(),
            format,
            registers,
            angle_rom,
            reset: false,
            start: false,
            datapath: None,
            cycles: 0,
        })
    }

    /// Builder: set the instance name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rising edges seen so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Read a register or ROM word
    pub fn read_register(&self, offset: usize) -> UnitResult<u32> {
        if !regs::is_register(offset) && !self.is_rom_entry(offset) {
            return Err(UnitError::InvalidRegister(offset));
        }
        Ok(*self.registers.get(&offset).unwrap_or(&0))
    }

    /// Write a writable register
    pub fn write_register(&mut self, offset: usize, value: u32) -> UnitResult<()> {
        match offset {
            regs::CTRL | regs::XI | regs::YI | regs::ZI | regs::ROT_VEC => {
                self.registers.insert(offset, value);
                Ok(())
            }
            _ => Err(UnitError::InvalidRegister(offset)),
        }
    }

    fn is_rom_entry(&self, offset: usize) -> bool {
        offset >= regs::LUT_BASE
            && (offset - regs::LUT_BASE) % 4 == 0
            && (offset - regs::LUT_BASE) / 4 < self.angle_rom.len()
    }

    fn reg(&self, offset: usize) -> u32 {
        *self.registers.get(&offset).unwrap_or(&0)
    }

    fn set_ctrl_bit(&mut self, bit: u32, level: bool) {
        let ctrl = self.reg(regs::CTRL);
        let ctrl = if level { ctrl | bit } else { ctrl & !bit };
        self.registers.insert(regs::CTRL, ctrl);
    }

    fn raw(&self, offset: usize) -> UnitResult<i64> {
        Ok(FixedWord::from_word(self.reg(offset), self.format)?.raw())
    }

    fn pack(&self, raw: i64) -> u32 {
        let pattern = (raw as u32) & self.format.mask();
        pattern << self.format.padding_bits()
    }

    fn latch_inputs(&mut self) -> UnitResult<()> {
        let mode = CordicMode::from_selector(self.reg(regs::ROT_VEC)).ok_or_else(|| {
            UnitError::Protocol(format!(
                "rot_vec must be 0 or 1, got {}",
                self.reg(regs::ROT_VEC)
            ))
        })?;
        self.datapath = Some(Datapath {
            x: self.raw(regs::XI)?,
            y: self.raw(regs::YI)?,
            z: self.raw(regs::ZI)?,
            mode,
            iteration: 0,
        });
        self.registers.insert(regs::STATUS, regs::STATUS_BUSY);
        Ok(())
    }

    fn micro_rotation(&self, dp: &mut Datapath) {
        let i = dp.iteration;
        let shift = i.min(63) as u32;
        let positive = match dp.mode {
            CordicMode::Rotation => dp.z >= 0,
            CordicMode::Vectoring => dp.y < 0,
        };
        let (dx, dy) = (dp.y >> shift, dp.x >> shift);
        let (x, y, z) = if positive {
            (dp.x - dx, dp.y + dy, dp.z - self.angle_rom[i])
        } else {
            (dp.x + dx, dp.y - dy, dp.z + self.angle_rom[i])
        };
        dp.x = self.format.wrap(x);
        dp.y = self.format.wrap(y);
        dp.z = self.format.wrap(z);
        dp.iteration += 1;
    }
}

impl CordicUnit for SimulatedCordicUnit {
    fn info(&self) -> UnitInfo {
        UnitInfo {
            name: self.name.clone(),
            kind: UnitKind::Simulated,
            format: self.format,
            iterations: self.angle_rom.len(),
        }
    }

    fn set_reset(&mut self, asserted: bool) -> UnitResult<()> {
        self.reset = asserted;
        self.set_ctrl_bit(regs::CTRL_RESET, asserted);
        Ok(())
    }

    fn write_inputs(&mut self, inputs: &InputRegisters) -> UnitResult<()> {
        self.write_register(regs::XI, inputs.xi)?;
        self.write_register(regs::YI, inputs.yi)?;
        self.write_register(regs::ZI, inputs.zi)?;
        self.write_register(regs::ROT_VEC, inputs.mode.selector())
    }

    fn set_start(&mut self, level: bool) -> UnitResult<()> {
        self.start = level;
        self.set_ctrl_bit(regs::CTRL_START, level);
        Ok(())
    }

    fn clock_edge(&mut self) -> UnitResult<()> {
        self.cycles += 1;

        if self.reset {
            self.datapath = None;
            for offset in [regs::STATUS, regs::XR, regs::YR, regs::ZR] {
                self.registers.insert(offset, 0);
            }
            return Ok(());
        }

        match self.datapath {
            None if self.start => self.latch_inputs()?,
            None => {}
            Some(mut dp) => {
                self.micro_rotation(&mut dp);
                if dp.iteration == self.angle_rom.len() {
                    let (xr, yr, zr) = (self.pack(dp.x), self.pack(dp.y), self.pack(dp.z));
                    self.registers.insert(regs::XR, xr);
                    self.registers.insert(regs::YR, yr);
                    self.registers.insert(regs::ZR, zr);
                    self.registers.insert(regs::STATUS, regs::STATUS_DONE);
                    self.datapath = None;
                } else {
                    self.datapath = Some(dp);
                }
            }
        }
        Ok(())
    }

    fn poll_done(&self) -> UnitResult<bool> {
        Ok(self.reg(regs::STATUS) & regs::STATUS_DONE != 0)
    }

    fn read_outputs(&self) -> UnitResult<OutputRegisters> {
        Ok(OutputRegisters {
            xr: self.reg(regs::XR),
            yr: self.reg(regs::YR),
            zr: self.reg(regs::ZR),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcordic_core::{CordicEngine, CordicState};

    fn run(unit: &mut SimulatedCordicUnit, state: CordicState, mode: CordicMode) -> CordicState {
        let fmt = unit.info().format;
        unit.reset(1).unwrap();
        unit.write_inputs(&InputRegisters::encode(state, mode, fmt).unwrap())
            .unwrap();
        unit.pulse_start().unwrap();
        let mut waited = 0;
        while !unit.poll_done().unwrap() {
            unit.clock_edge().unwrap();
            waited += 1;
            assert!(waited < 100, "unit never finished");
        }
        unit.read_outputs().unwrap().decode(fmt).unwrap()
    }

    #[test]
    fn test_rotation_matches_engine() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = SimulatedCordicUnit::new(fmt, 16).unwrap();
        let engine = CordicEngine::new(16).unwrap();

        let input = CordicState::new(1.0, 0.0, 0.785398);
        let hw = run(&mut unit, input, CordicMode::Rotation);
        let gold = engine.run(input, CordicMode::Rotation).unwrap();
        assert!((hw.x - gold.x).abs() < 1e-5, "{} vs {}", hw, gold);
        assert!((hw.y - gold.y).abs() < 1e-5, "{} vs {}", hw, gold);
        assert!((hw.z - gold.z).abs() < 1e-5, "{} vs {}", hw, gold);
    }

    #[test]
    fn test_vectoring_matches_engine() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = SimulatedCordicUnit::new(fmt, 16).unwrap();
        let engine = CordicEngine::new(16).unwrap();

        let input = CordicState::new(1.5, -1.25, 0.0);
        let hw = run(&mut unit, input, CordicMode::Vectoring);
        let gold = engine.run(input, CordicMode::Vectoring).unwrap();
        assert!((hw.x - gold.x).abs() < 1e-5, "{} vs {}", hw, gold);
        assert!((hw.z - gold.z).abs() < 1e-5, "{} vs {}", hw, gold);
    }

    #[test]
    fn test_latency_is_one_edge_per_iteration() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = SimulatedCordicUnit::new(fmt, 12).unwrap();
        unit.reset(1).unwrap();
        let start = unit.cycles();
        run(&mut unit, CordicState::new(1.0, 0.0, 0.3), CordicMode::Rotation);
        // reset(1) inside run: 2 edges, start pulse: 1 edge, then 12 iterations
        assert_eq!(unit.cycles() - start, 2 + 1 + 12);
    }

    #[test]
    fn test_done_holds_until_next_start() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = SimulatedCordicUnit::new(fmt, 4).unwrap();
        run(&mut unit, CordicState::new(1.0, 0.0, 0.1), CordicMode::Rotation);
        unit.clock_edge().unwrap();
        unit.clock_edge().unwrap();
        assert!(unit.poll_done().unwrap());

        unit.pulse_start().unwrap();
        assert!(!unit.poll_done().unwrap());
    }

    #[test]
    fn test_reset_clears_outputs() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = SimulatedCordicUnit::new(fmt, 4).unwrap();
        run(&mut unit, CordicState::new(1.0, 0.0, 0.1), CordicMode::Rotation);
        unit.reset(1).unwrap();
        assert!(!unit.poll_done().unwrap());
        assert_eq!(unit.read_outputs().unwrap(), OutputRegisters::default());
    }

    #[test]
    fn test_rom_holds_embedding_words() {
        let fmt = QFormat::new(0, 30).unwrap();
        let lut = CordicLut::generate(4).unwrap();
        let unit = SimulatedCordicUnit::with_rom(fmt, &lut.quantize(fmt)).unwrap();
        for (i, word) in lut.quantize(fmt).iter().enumerate() {
            assert_eq!(unit.read_register(regs::lut_entry(i)).unwrap(), *word);
        }
        assert!(matches!(
            unit.read_register(regs::lut_entry(4)),
            Err(UnitError::InvalidRegister(_))
        ));
    }

    #[test]
    fn test_register_access_rules() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = SimulatedCordicUnit::new(fmt, 4).unwrap();
        unit.write_register(regs::XI, 0x1000_0000).unwrap();
        assert_eq!(unit.read_register(regs::XI).unwrap(), 0x1000_0000);
        assert_eq!(unit.read_register(regs::XR).unwrap(), 0);
        assert!(unit.write_register(regs::XR, 1).is_err());
        assert!(unit.write_register(0x3, 1).is_err());
    }

    #[test]
    fn test_bad_mode_selector() {
        let fmt = QFormat::new(3, 28).unwrap();
        let mut unit = SimulatedCordicUnit::new(fmt, 4).unwrap();
        unit.write_register(regs::ROT_VEC, 7).unwrap();
        unit.set_start(true).unwrap();
        assert!(matches!(unit.clock_edge(), Err(UnitError::Protocol(_))));
    }
}
