//! PS-side second-stage loader for the Microwatt companion core.
//!
//! Runs bare-metal on the application processor after the first-stage boot
//! firmware: stages the companion bootloader, fetches and extracts the OS
//! image from the SD card, then releases the soft core through its register
//! handshake and parks.

#![no_main]
#![no_std]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]

mod logging;
mod payload;
mod platform;
mod regs;
mod sdhci;
mod uart;

use log::{error, info};
use mwboot_core::{PhysAddr, mem::PhysMemory};
use regs::CompanionRegs;
use sdhci::Sdhci;
use sequencer::{BootConfig, BootSequencer};
use uart::Uart;

/// Entry point, reached from the first-stage boot firmware with the MMU off
/// and this core as the only one running.
#[unsafe(no_mangle)]
extern "C" fn _start() -> ! {
    // Safety: the first-stage firmware hands over UART0 fully configured and
    // nothing else drives it.
    let uart = unsafe { Uart::new(PhysAddr::new(platform::UART_BASE)) };
    logging::init(uart);

    info!("second-stage loader up");

    main();

    park()
}

fn main() {
    let config = BootConfig {
        bootloader: payload::MW_BOOTLOADER,
        bootloader_base: PhysAddr::new(platform::DRAM_BASE),
        image_bytes: platform::OS_IMAGE_BYTES,
        image_start_sector: platform::OS_IMAGE_SECTOR,
        extract_base: PhysAddr::new(platform::DRAM_BASE),
        expected_version: platform::COMPANION_VERSION,
    };

    // Safety: the register blocks below are fixed by the board design and
    // this stage is the only bus master touching them.
    let host = unsafe { Sdhci::new(PhysAddr::new(platform::SDHCI_BASE)) };
    let mut companion = unsafe { CompanionRegs::new(PhysAddr::new(platform::COMPANION_REG_BASE)) };
    // Safety: identity-mapped DRAM, exclusively ours until the companion
    // core is released.
    let mut mem = unsafe { PhysMemory::new() };
    // Safety: the fetch window lies in otherwise unused DRAM above the
    // extraction region, so it aliases nothing the loader writes.
    let image_window = unsafe {
        core::slice::from_raw_parts_mut(
            PhysAddr::new(platform::ELF_IMAGE_BASE).as_mut_ptr::<u8>(),
            storage::padded_len(platform::OS_IMAGE_BYTES),
        )
    };

    let mut sequencer = BootSequencer::new();
    match sequencer.run(&config, host, image_window, &mut mem, &mut companion) {
        Ok(()) => info!("companion core is running, parking"),
        // The sequencer already logged the failure; stay alive so the
        // message can be read on the console.
        Err(_) => error!("boot failed, parking"),
    }
}

fn park() -> ! {
    loop {
        #[cfg(target_arch = "aarch64")]
        // Safety: `wfi` has no side effects beyond pausing the core.
        unsafe {
            core::arch::asm!("wfi", options(nomem, nostack, preserves_flags));
        }
        #[cfg(not(target_arch = "aarch64"))]
        core::hint::spin_loop();
    }
}

#[panic_handler]
fn panic(panic_info: &core::panic::PanicInfo) -> ! {
    error!("[PANIC]: {}", panic_info.message());

    #[cfg(debug_assertions)]
    if let Some(location) = panic_info.location() {
        error!(
            "Panic occured in file '{}' at line {}",
            location.file(),
            location.line()
        );
    }

    park()
}
