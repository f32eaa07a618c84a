//! Register map of the CORDIC unit
//!
//! Data registers hold signed Qm.n words left-justified in 32 bits.

/// CORDIC unit registers
pub mod cordic {
    /// Control register
    pub const CTRL: usize = 0x00;
    /// Status register
    pub const STATUS: usize = 0x04;
    /// Input X
    pub const XI: usize = 0x10;
    /// Input Y
    pub const YI: usize = 0x14;
    /// Input Z (angle)
    pub const ZI: usize = 0x18;
    /// Mode selector (0 = rotation, 1 = vectoring)
    pub const ROT_VEC: usize = 0x1C;
    /// Result X
    pub const XR: usize = 0x20;
    /// Result Y
    pub const YR: usize = 0x24;
    /// Result Z
    pub const ZR: usize = 0x28;
    /// Angle ROM base (one word per iteration at 0x100, 0x104, ...)
    pub const LUT_BASE: usize = 0x100;

    // Control bits
    pub const CTRL_START: u32 = 1 << 0;
    pub const CTRL_RESET: u32 = 1 << 31;

    // Status bits
    pub const STATUS_DONE: u32 = 1 << 0;
    pub const STATUS_BUSY: u32 = 1 << 1;

    /// Offset of angle ROM entry `index`
    pub fn lut_entry(index: usize) -> usize {
        LUT_BASE + 4 * index
    }

    /// Whether `offset` names a data or control register
    pub fn is_register(offset: usize) -> bool {
        matches!(offset, CTRL | STATUS | XI | YI | ZI | ROT_VEC | XR | YR | ZR)
    }
}

#[cfg(test)]
mod tests {
    use super::cordic;

    #[test]
    fn test_lut_entries_follow_base() {
        assert_eq!(cordic::lut_entry(0), 0x100);
        assert_eq!(cordic::lut_entry(3), 0x10C);
        assert!(!cordic::is_register(cordic::lut_entry(0)));
        assert!(cordic::is_register(cordic::ZR));
    }
}
