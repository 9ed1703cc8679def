//! Byte-granularity moves into a destination address space.
//!
//! The loader and the boot sequencer write through the [`Memory`] seam so
//! that tests can substitute a bounded in-memory fake for real DRAM.

use crate::addr::PhysAddr;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("destination range out of bounds")]
    OutOfBounds,
}

/// Destination address space for staged and extracted images.
pub trait Memory {
    /// Copy `src` to `dest`, byte for byte. Source and destination must not
    /// overlap.
    ///
    /// # Errors
    ///
    /// Fails if the destination range violates the implementation's bounds.
    fn copy_to(&mut self, dest: PhysAddr, src: &[u8]) -> Result<(), MemoryError>;

    /// Zero-fill `len` bytes starting at `dest`.
    ///
    /// # Errors
    ///
    /// Fails if the destination range violates the implementation's bounds.
    fn zero(&mut self, dest: PhysAddr, len: u64) -> Result<(), MemoryError>;
}

impl<M: Memory + ?Sized> Memory for &mut M {
    #[inline]
    fn copy_to(&mut self, dest: PhysAddr, src: &[u8]) -> Result<(), MemoryError> {
        (**self).copy_to(dest, src)
    }

    #[inline]
    fn zero(&mut self, dest: PhysAddr, len: u64) -> Result<(), MemoryError> {
        (**self).zero(dest, len)
    }
}

/// Raw mover over physical DRAM.
///
/// Performs no bounds checking: the destination ranges implied by the image
/// being loaded are trusted, as the memory layout is fixed at build time.
pub struct PhysMemory {
    _private: (),
}

impl PhysMemory {
    /// # Safety
    ///
    /// Every address subsequently passed to [`Memory::copy_to`] or
    /// [`Memory::zero`] must be real, writable, identity-mapped DRAM that is
    /// not aliased by any live Rust reference.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Memory for PhysMemory {
    fn copy_to(&mut self, dest: PhysAddr, src: &[u8]) -> Result<(), MemoryError> {
        // Safety: contract of `PhysMemory::new`.
        unsafe {
            core::ptr::copy_nonoverlapping(src.as_ptr(), dest.as_mut_ptr::<u8>(), src.len());
        }
        Ok(())
    }

    fn zero(&mut self, dest: PhysAddr, len: u64) -> Result<(), MemoryError> {
        let len = usize::try_from(len).map_err(|_| MemoryError::OutOfBounds)?;
        // Safety: contract of `PhysMemory::new`.
        unsafe {
            core::ptr::write_bytes(dest.as_mut_ptr::<u8>(), 0, len);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Memory, PhysMemory};
    use crate::addr::PhysAddr;

    #[test]
    fn raw_copy_and_zero() {
        let mut buf = vec![0xFFu8; 16];
        let base = PhysAddr::new(buf.as_mut_ptr() as u64);
        // Safety: `base` covers the live `buf` allocation and `buf` is not
        // borrowed while the mover writes through it.
        let mut mem = unsafe { PhysMemory::new() };

        mem.copy_to(base + 2, b"abcd").unwrap();
        mem.zero(base + 6, 4).unwrap();

        assert_eq!(&buf[..12], b"\xFF\xFFabcd\0\0\0\0\xFF\xFF");
    }
}
