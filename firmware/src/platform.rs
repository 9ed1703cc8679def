//! ZynqMP board memory map and boot parameters.

/// Companion-core control register block.
pub const COMPANION_REG_BASE: u64 = 0xA000_0000;
/// Value the companion core exposes in its version register when present.
pub const COMPANION_VERSION: u32 = 0xDEAD_BEEF;

/// Start of the DRAM region visible to the companion core.
pub const DRAM_BASE: u64 = 0x2000_0000;
/// Scratch window the raw OS container is fetched into before extraction.
pub const ELF_IMAGE_BASE: u64 = 0x3000_0000;

/// On-card size of the OS image in bytes.
pub const OS_IMAGE_BYTES: u32 = 0x0070_0000;
/// First card sector holding the OS image.
pub const OS_IMAGE_SECTOR: u64 = 0;

/// PS UART0 register block.
pub const UART_BASE: u64 = 0xFF00_0000;
/// PS SD0 host controller register block.
pub const SDHCI_BASE: u64 = 0xFF16_0000;
