//! The chunked transfer loop.

use crate::{FetchError, Result};
use log::{debug, info};
use mwboot_core::storage::{CardCapacity, SdHost};

/// Fixed SD sector/block size in bytes.
pub const SECTOR_SIZE: u32 = 512;

/// Per-transfer ceiling: the controller's ADMA descriptor table holds 32
/// descriptors of 64 KiB each, so a single transfer moves at most 2 MiB.
pub const MAX_BYTES_PER_TRANSFER: u32 = 32 * 65536;

const MAX_BLOCKS_PER_TRANSFER: u32 = MAX_BYTES_PER_TRANSFER / SECTOR_SIZE;

/// Destination capacity needed to fetch `total_bytes`.
///
/// Transfers advance in whole sectors, so a partial final sector still
/// occupies a full sector's worth of destination memory. Rounding is done in
/// `u64`: near `u32::MAX` the padded length exceeds `u32` range.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn padded_len(total_bytes: u32) -> usize {
    ((total_bytes as u64).div_ceil(SECTOR_SIZE as u64) * SECTOR_SIZE as u64) as usize
}

/// A block-storage reader over an initialized SD host.
///
/// Construction performs the one-time controller and card initialization and
/// latches the addressing mode for the life of the reader; every subsequent
/// [`fetch`](Self::fetch) skips re-initialization.
pub struct SdReader<H: SdHost> {
    host: H,
    capacity: CardCapacity,
}

impl<H: SdHost> core::fmt::Debug for SdReader<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SdReader")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<H: SdHost> SdReader<H> {
    /// Initialize the controller and the media.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Init`] if setup fails. The failure is fatal;
    /// callers never retry.
    pub fn new(mut host: H) -> Result<Self> {
        debug!("initializing SD controller and card");
        let capacity = host.init().map_err(FetchError::Init)?;
        info!("SD storage initialized ({capacity:?} capacity)");
        Ok(Self { host, capacity })
    }

    #[must_use]
    pub const fn capacity(&self) -> CardCapacity {
        self.capacity
    }

    /// Fetch `total_bytes` starting at `start_sector` into `dst`.
    ///
    /// The image is read in chunks of at most [`MAX_BYTES_PER_TRANSFER`]
    /// bytes. The destination cursor advances by whole sectors while the
    /// remaining count decreases by each chunk's requested bytes, so a
    /// non-sector-aligned final chunk writes up to one sector of padding past
    /// `total_bytes`; `dst` must therefore hold [`padded_len`]`(total_bytes)`
    /// bytes.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is shorter than [`padded_len`]`(total_bytes)`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Read`] as soon as a sub-transfer fails; bytes
    /// already transferred are left in place.
    pub fn fetch(&mut self, dst: &mut [u8], total_bytes: u32, start_sector: u64) -> Result<()> {
        assert!(
            dst.len() >= padded_len(total_bytes),
            "destination shorter than the padded transfer length"
        );

        info!("reading {total_bytes} bytes from sector {start_sector}");

        let mut remaining = total_bytes;
        let mut dst_offset = 0usize;
        let mut sector = start_sector;

        while remaining > 0 {
            // Requested bytes and whole sectors actually advanced; the two
            // diverge on a partial final sector, which is still read whole.
            let (chunk_bytes, blocks) = if remaining > MAX_BYTES_PER_TRANSFER {
                (MAX_BYTES_PER_TRANSFER, MAX_BLOCKS_PER_TRANSFER)
            } else {
                (remaining, remaining.div_ceil(SECTOR_SIZE))
            };

            // High-capacity media take a sector index, standard-capacity
            // media a byte address.
            let arg = if self.capacity.is_high() {
                sector
            } else {
                sector * u64::from(SECTOR_SIZE)
            };

            let advance = (blocks * SECTOR_SIZE) as usize;
            let window = &mut dst[dst_offset..dst_offset + advance];
            self.host
                .read_polled(arg, blocks, window)
                .map_err(|source| FetchError::Read { sector, source })?;

            remaining -= chunk_bytes;
            dst_offset += advance;
            sector += u64::from(blocks);
        }

        debug!("image read complete ({dst_offset} bytes written)");
        Ok(())
    }
}
