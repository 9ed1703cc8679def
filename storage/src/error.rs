//! Error types for storage fetches.

use mwboot_core::storage::DeviceError;
use thiserror::Error;

/// Errors that can occur while fetching an image from block storage.
///
/// Both variants are fatal to the boot attempt; nothing is retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// Controller or media setup failed.
    #[error("storage initialization failed: {0}")]
    Init(#[source] DeviceError),
    /// A sub-transfer failed. Bytes already transferred are left in place.
    #[error("storage read failed at sector {sector}: {source}")]
    Read {
        sector: u64,
        #[source]
        source: DeviceError,
    },
}
