//! Chunked image fetch from SD block storage.
//!
//! The controller's descriptor table bounds any single transfer, so images of
//! arbitrary size are moved as a sequence of sub-transfers. [`SdReader`]
//! owns the one-time controller/card initialization and the addressing mode
//! it discovers.

#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]

mod error;
mod reader;

pub use error::FetchError;
pub use reader::{MAX_BYTES_PER_TRANSFER, SECTOR_SIZE, SdReader, padded_len};

/// Result type for storage fetch operations.
pub type Result<T> = core::result::Result<T, FetchError>;
