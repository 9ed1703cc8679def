//! Boot control sequencing for the companion core.
//!
//! Ties bootloader staging, image fetch, image extraction, and the
//! register-level handshake into one ordered, fail-fast pipeline. Every
//! failure edge collapses into the terminal [`BootStage::AbortedOnError`];
//! recovery is only possible by power-cycling the board.

#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]

mod boot;
mod error;
mod regs;

pub use boot::{BootConfig, BootSequencer, BootStage};
pub use error::BootError;
pub use regs::{CTRL_START, ControlRegisters, RegSlot};

/// Result type for boot sequencing.
pub type Result<T> = core::result::Result<T, BootError>;
