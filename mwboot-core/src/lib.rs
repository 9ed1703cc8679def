//! Shared leaf types for the mwboot loader stack.
//!
//! Everything in this crate is a boundary the higher layers program against:
//! typed physical addresses, the raw byte mover behind the [`mem::Memory`]
//! seam, the SD host capability behind [`storage::SdHost`], and volatile MMIO
//! accessors for register blocks.
#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]

pub mod addr;
pub mod mem;
pub mod mmio;
pub mod storage;

pub use addr::PhysAddr;
