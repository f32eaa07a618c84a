//! Register payloads and unit descriptions

use std::fmt;

use qcordic_core::{encode, CordicMode, CordicResult, CordicState, FixedWord, QFormat};
use serde::{Deserialize, Serialize};

/// Kind of unit behind the [`CordicUnit`](crate::CordicUnit) contract
#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    /// Bit-accurate software model, one micro-rotation per clock
    Simulated,
    /// Floating-point engine quantized at the register boundary
    GoldenModel,
    /// External device
    Hardware(String),
}

impl UnitKind {
    pub fn name(&self) -> &str {
        match self {
            UnitKind::Simulated => "Simulated",
            UnitKind::GoldenModel => "Golden model",
            UnitKind::Hardware(name) => name,
        }
    }
}

/// Information about a unit under test
#[derive(Debug, Clone)]
pub struct UnitInfo {
    /// Instance name, used in logs and timeout errors
    pub name: String,
    pub kind: UnitKind,
    /// Register word format
    pub format: QFormat,
    /// Micro-rotations per operation
    pub iterations: usize,
}

/// Values driven onto `Xi`, `Yi`, `Zi` and `rot_vec`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRegisters {
    pub xi: u32,
    pub yi: u32,
    pub zi: u32,
    pub mode: CordicMode,
}

impl InputRegisters {
    /// Strictly encode a state into register words.
    pub fn encode(input: CordicState, mode: CordicMode, format: QFormat) -> CordicResult<Self> {
        Ok(Self {
            xi: encode(input.x, format)?.word(),
            yi: encode(input.y, format)?.word(),
            zi: encode(input.z, format)?.word(),
            mode,
        })
    }
}

/// Values sampled from `Xr`, `Yr`, `Zr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputRegisters {
    pub xr: u32,
    pub yr: u32,
    pub zr: u32,
}

impl OutputRegisters {
    /// Strictly encode a state into register words.
    pub fn encode(state: CordicState, format: QFormat) -> CordicResult<Self> {
        Ok(Self {
            xr: encode(state.x, format)?.word(),
            yr: encode(state.y, format)?.word(),
            zr: encode(state.z, format)?.word(),
        })
    }

    /// Decode the register words back into a state.
    pub fn decode(&self, format: QFormat) -> CordicResult<CordicState> {
        let value = |word| FixedWord::from_word(word, format).map(|w| w.to_f64());
        Ok(CordicState::new(
            value(self.xr)?,
            value(self.yr)?,
            value(self.zr)?,
        ))
    }
}

/// One stimulus for the unit and the golden model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub mode: CordicMode,
}

impl TestVector {
    pub fn new(x: f64, y: f64, z: f64, mode: CordicMode) -> Self {
        Self { x, y, z, mode }
    }

    /// Rotate `(x, y)` by `angle`
    pub fn rotation(x: f64, y: f64, angle: f64) -> Self {
        Self::new(x, y, angle, CordicMode::Rotation)
    }

    /// Resolve `(x, y)` with zero initial angle
    pub fn vectoring(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, CordicMode::Vectoring)
    }

    pub fn state(&self) -> CordicState {
        CordicState::new(self.x, self.y, self.z)
    }
}

impl fmt::Display for TestVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (x_in={}, y_in={}, z_in={})",
            self.mode, self.x, self.y, self.z
        )
    }
}
