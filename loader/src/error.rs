//! Error types for image extraction.

use mwboot_core::mem::MemoryError;
use thiserror::Error;

/// Errors that can occur while extracting an executable image.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// The buffer does not start with the expected container magic.
    #[error("invalid executable image format")]
    InvalidFormat,
    /// A segment's file range reaches past the end of the image buffer.
    #[error("segment data exceeds image bounds")]
    Truncated,
    /// A destination write failed.
    #[error("memory move failed: {0}")]
    Memory(#[from] MemoryError),
}
