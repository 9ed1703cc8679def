//! ELF container parsing and segment extraction.

use crate::{LoadError, Result};
use log::debug;
use mwboot_core::{PhysAddr, mem::Memory};
use xmas_elf::{ElfFile, header, program::Type};

/// Outcome of a successful extraction.
///
/// `entry_point` is the image's entry rebased onto the destination. It is a
/// capability, not an obligation: on this platform the companion core is
/// started through its control registers, so nothing here ever jumps to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedImage {
    pub entry_point: PhysAddr,
    pub loadable_segments: usize,
}

/// Extracts executable containers into a destination address space.
pub struct ImageLoader;

impl ImageLoader {
    /// Extract all loadable segments of `input` into their run-time layout.
    ///
    /// A segment with virtual address `v` lands at `dest_base + v`. Exactly
    /// `filesz` bytes are copied per loadable segment; when the memory
    /// footprint exceeds the file footprint, the trailing `memsz - filesz`
    /// bytes are zero-filled. Segments of any other kind are skipped without
    /// side effects.
    ///
    /// Only the container magic is validated; all other header fields are
    /// trusted.
    ///
    /// # Errors
    ///
    /// - [`LoadError::InvalidFormat`] if the magic bytes do not match. No
    ///   memory is written in this case.
    /// - [`LoadError::Truncated`] if a segment's file range is outside
    ///   `input`.
    /// - [`LoadError::Memory`] if a destination write fails.
    pub fn load<M: Memory>(
        input: &[u8],
        dest_base: PhysAddr,
        mem: &mut M,
    ) -> Result<LoadedImage> {
        let elf = ElfFile::new(input).map_err(|_| LoadError::InvalidFormat)?;
        if elf.header.pt1.magic != header::MAGIC {
            return Err(LoadError::InvalidFormat);
        }

        let mut loadable = 0;
        for ph in elf.program_iter() {
            if ph.get_type() != Ok(Type::Load) {
                continue;
            }

            let file_size = ph.file_size();
            let mem_size = ph.mem_size();
            let dest = dest_base + ph.virtual_addr();

            if file_size > 0 {
                let offset = usize::try_from(ph.offset()).map_err(|_| LoadError::Truncated)?;
                let len = usize::try_from(file_size).map_err(|_| LoadError::Truncated)?;
                let data = offset
                    .checked_add(len)
                    .and_then(|end| input.get(offset..end))
                    .ok_or(LoadError::Truncated)?;
                mem.copy_to(dest, data)?;
            }

            // The uninitialized tail (.bss) must be zero before use.
            if mem_size > file_size {
                mem.zero(dest + file_size, mem_size - file_size)?;
            }

            debug!("segment loaded at {dest:#x} ({file_size} bytes, {mem_size} in memory)");
            loadable += 1;
        }

        Ok(LoadedImage {
            entry_point: dest_base + elf.header.pt2.entry_point(),
            loadable_segments: loadable,
        })
    }
}
