//! The companion-core control register interface.

/// The four fixed 32-bit control slots, in register-block order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegSlot {
    /// Start/control register; writing [`CTRL_START`] releases the core.
    Control,
    /// Address the companion core boots from.
    LoadAddress,
    Reserved,
    /// Identity of the companion firmware; must match the expected sentinel.
    Version,
}

impl RegSlot {
    /// Byte offset of the slot within the register block.
    #[must_use]
    #[inline]
    pub const fn offset(self) -> usize {
        match self {
            Self::Control => 0x0,
            Self::LoadAddress => 0x4,
            Self::Reserved => 0x8,
            Self::Version => 0xC,
        }
    }
}

/// Start bit written to the control slot to release the companion core.
pub const CTRL_START: u32 = 0x1;

/// Typed access to the companion-core register block.
///
/// Backed by memory-mapped volatile accesses in production and by an
/// in-memory fake in tests; value order (write, then read back) is
/// load-bearing for the configuration handshake.
pub trait ControlRegisters {
    fn read(&mut self, slot: RegSlot) -> u32;
    fn write(&mut self, slot: RegSlot, value: u32);
}

impl<R: ControlRegisters + ?Sized> ControlRegisters for &mut R {
    #[inline]
    fn read(&mut self, slot: RegSlot) -> u32 {
        (**self).read(slot)
    }

    #[inline]
    fn write(&mut self, slot: RegSlot, value: u32) {
        (**self).write(slot, value);
    }
}
