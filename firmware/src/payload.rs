//! Companion-core first-stage bootloader, embedded at build time.
//!
//! The blob is position-independent POWER code; it is staged verbatim at the
//! base of the companion core's DRAM window and started by the register
//! handshake.

pub static MW_BOOTLOADER: &[u8] = include_bytes!("../payload/mw_welcome.bin");
