//! Cadence UART driver, transmit only.
//!
//! The first-stage boot firmware already set the baud rate; this driver only
//! makes sure the transmitter is enabled and pushes bytes out.

use core::fmt;
use mwboot_core::{PhysAddr, mmio::MmioRegion};

const CR: usize = 0x00;
const SR: usize = 0x2C;
const FIFO: usize = 0x30;

const CR_TX_RESET: u32 = 1 << 1;
const CR_TX_ENABLE: u32 = 1 << 4;
const CR_TX_DISABLE: u32 = 1 << 5;

const SR_TX_FULL: u32 = 1 << 4;

pub struct Uart {
    regs: MmioRegion,
}

impl Uart {
    /// # Safety
    ///
    /// `base` must be the register block of a Cadence UART with a configured
    /// baud generator, and no other code may drive it.
    #[must_use]
    pub const unsafe fn new(base: PhysAddr) -> Self {
        Self {
            // Safety: propagated to the caller.
            regs: unsafe { MmioRegion::new(base) },
        }
    }

    /// Reset the transmit path and enable it.
    pub fn init(&mut self) {
        let cr = self.regs.read_u32(CR);
        self.regs.write_u32(CR, cr | CR_TX_RESET);
        while self.regs.read_u32(CR) & CR_TX_RESET != 0 {
            core::hint::spin_loop();
        }
        let cr = self.regs.read_u32(CR);
        self.regs.write_u32(CR, (cr | CR_TX_ENABLE) & !CR_TX_DISABLE);
    }

    pub fn send(&mut self, byte: u8) {
        while self.regs.read_u32(SR) & SR_TX_FULL != 0 {
            core::hint::spin_loop();
        }
        self.regs.write_u32(FIFO, u32::from(byte));
    }
}

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.send(byte);
        }
        Ok(())
    }
}
