//! Executable image extraction.
//!
//! Parses an ELF container already resident in memory and copies its loadable
//! segments into their run-time layout through the [`mwboot_core::mem::Memory`]
//! seam. Loading and execution handoff are decoupled: the computed entry point
//! is returned to the caller and never invoked here.

#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]

mod error;
mod image;

pub use error::LoadError;
pub use image::{ImageLoader, LoadedImage};

/// Result type for image extraction.
pub type Result<T> = core::result::Result<T, LoadError>;
