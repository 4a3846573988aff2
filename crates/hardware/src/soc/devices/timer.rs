//! Free-running cycle counter.
//!
//! A read-only 32-bit register that increments once per clock and wraps. The
//! benchmark harness reads it before and after a timed region.

use crate::core::pipeline::signals::MemWidth;
use crate::soc::traits::Device;

/// Cycle counter device.
#[derive(Debug, Default)]
pub struct CycleCounter {
    base_addr: u32,
    count: u32,
}

impl CycleCounter {
    /// Creates a counter at `base_addr`, starting from zero.
    pub const fn new(base_addr: u32) -> Self {
        Self {
            base_addr,
            count: 0,
        }
    }

    /// Current count.
    pub const fn count(&self) -> u32 {
        self.count
    }
}

impl Device for CycleCounter {
    fn name(&self) -> &str {
        "CYCLES"
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base_addr, 4)
    }

    fn read(&mut self, offset: u32, width: MemWidth) -> u32 {
        let shifted = self.count >> (8 * offset);
        match width {
            MemWidth::Byte => shifted & 0xFF,
            MemWidth::Half => shifted & 0xFFFF,
            MemWidth::Word => shifted,
        }
    }

    /// Writes are ignored.
    fn write(&mut self, _offset: u32, _width: MemWidth, _val: u32) {}

    fn tick(&mut self) {
        self.count = self.count.wrapping_add(1);
    }
}
