//! Volatile accessors for memory-mapped register blocks.

use crate::addr::PhysAddr;
use core::ptr::{read_volatile, write_volatile};

/// A device register block at a fixed base address.
///
/// Accesses are volatile and uncached; no synchronization is provided, which
/// is fine on the single-threaded PS stage.
///
/// The handle is not `Copy`: each register block has exactly one owner.
#[derive(Debug)]
pub struct MmioRegion {
    base: PhysAddr,
}

impl MmioRegion {
    /// # Safety
    ///
    /// `base` must point at a device register block that stays mapped for the
    /// lifetime of the value, and every offset later passed to the accessors
    /// must fall within that block.
    #[must_use]
    pub const unsafe fn new(base: PhysAddr) -> Self {
        Self { base }
    }

    #[must_use]
    pub fn read_u8(&self, offset: usize) -> u8 {
        // Safety: constructor contract.
        unsafe { read_volatile(self.base.as_ptr::<u8>().byte_add(offset)) }
    }

    pub fn write_u8(&self, offset: usize, value: u8) {
        // Safety: constructor contract.
        unsafe { write_volatile(self.base.as_mut_ptr::<u8>().byte_add(offset), value) }
    }

    #[must_use]
    pub fn read_u16(&self, offset: usize) -> u16 {
        // Safety: constructor contract.
        unsafe { read_volatile(self.base.as_ptr::<u16>().byte_add(offset)) }
    }

    pub fn write_u16(&self, offset: usize, value: u16) {
        // Safety: constructor contract.
        unsafe { write_volatile(self.base.as_mut_ptr::<u16>().byte_add(offset), value) }
    }

    #[must_use]
    pub fn read_u32(&self, offset: usize) -> u32 {
        // Safety: constructor contract.
        unsafe { read_volatile(self.base.as_ptr::<u32>().byte_add(offset)) }
    }

    pub fn write_u32(&self, offset: usize, value: u32) {
        // Safety: constructor contract.
        unsafe { write_volatile(self.base.as_mut_ptr::<u32>().byte_add(offset), value) }
    }
}
