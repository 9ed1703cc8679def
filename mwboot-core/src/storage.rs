//! Capability interface for the SD host controller.

use thiserror::Error;

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
/// An error reported by the storage controller or the media.
pub enum DeviceError {
    #[error("I/O error")]
    Io,
    #[error("Out of bounds")]
    OutOfBounds,
    #[error("Unsupported operation")]
    Unsupported,
}

/// Addressing convention the media reported during initialization.
///
/// High-capacity cards take sector indices as read arguments; legacy
/// standard-capacity cards take byte addresses. The mode is fixed for the
/// life of the process once discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardCapacity {
    Standard,
    High,
}

impl CardCapacity {
    #[must_use]
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

/// A polled SD host controller.
///
/// Implemented by the real SDHCI driver in the firmware binary and by mock
/// hosts in tests.
pub trait SdHost {
    /// Bring up the controller and the card, discovering the addressing mode.
    ///
    /// # Errors
    ///
    /// Fails if the controller or the media cannot be initialized. The
    /// failure is fatal; callers never retry.
    fn init(&mut self) -> Result<CardCapacity, DeviceError>;

    /// Read `blocks` whole sectors into `dst`, blocking until the controller
    /// completes the transfer.
    ///
    /// `arg` is the raw read argument: a sector index on high-capacity media,
    /// a byte address on standard-capacity media. `dst` must hold exactly
    /// `blocks` sectors.
    ///
    /// # Errors
    ///
    /// Fails if the transfer does not complete; bytes already transferred are
    /// left in place.
    fn read_polled(&mut self, arg: u64, blocks: u32, dst: &mut [u8]) -> Result<(), DeviceError>;
}

impl<H: SdHost + ?Sized> SdHost for &mut H {
    #[inline]
    fn init(&mut self) -> Result<CardCapacity, DeviceError> {
        (**self).init()
    }

    #[inline]
    fn read_polled(&mut self, arg: u64, blocks: u32, dst: &mut [u8]) -> Result<(), DeviceError> {
        (**self).read_polled(arg, blocks, dst)
    }
}
