//! Companion-core control register block.

use mwboot_core::{PhysAddr, mmio::MmioRegion};
use sequencer::{ControlRegisters, RegSlot};

pub struct CompanionRegs {
    regs: MmioRegion,
}

impl CompanionRegs {
    /// # Safety
    ///
    /// `base` must be the companion core's AXI register block.
    #[must_use]
    pub const unsafe fn new(base: PhysAddr) -> Self {
        Self {
            // Safety: propagated to the caller.
            regs: unsafe { MmioRegion::new(base) },
        }
    }
}

impl ControlRegisters for CompanionRegs {
    fn read(&mut self, slot: RegSlot) -> u32 {
        self.regs.read_u32(slot.offset())
    }

    fn write(&mut self, slot: RegSlot, value: u32) {
        self.regs.write_u32(slot.offset(), value);
    }
}
