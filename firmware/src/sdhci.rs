//! Polled SDHCI host controller driver for the PS SD0 interface.
//!
//! Single-threaded PIO driver: card identification follows the SD
//! specification's CMD0/CMD8/ACMD41 dance, data moves through the buffer data
//! port one word at a time. No DMA, no interrupts.

use log::debug;
use mwboot_core::{
    PhysAddr,
    mmio::MmioRegion,
    storage::{CardCapacity, DeviceError, SdHost},
};
use storage::SECTOR_SIZE;

const BLOCK_SIZE: usize = 0x04;
const BLOCK_COUNT: usize = 0x06;
const ARGUMENT: usize = 0x08;
const TRANSFER_MODE: usize = 0x0C;
const COMMAND: usize = 0x0E;
const RESPONSE0: usize = 0x10;
const BUFFER_DATA: usize = 0x20;
const PRESENT_STATE: usize = 0x24;
const POWER_CONTROL: usize = 0x29;
const CLOCK_CONTROL: usize = 0x2C;
const TIMEOUT_CONTROL: usize = 0x2E;
const SOFTWARE_RESET: usize = 0x2F;
const INT_STATUS: usize = 0x30;
const ERROR_INT_STATUS: usize = 0x32;
const INT_STATUS_ENABLE: usize = 0x34;
const ERROR_INT_STATUS_ENABLE: usize = 0x36;

const RESET_ALL: u8 = 0x01;

const POWER_ON_3V3: u8 = 0x0F;

const CLOCK_INTERNAL_ENABLE: u16 = 1 << 0;
const CLOCK_INTERNAL_STABLE: u16 = 1 << 1;
const CLOCK_CARD_ENABLE: u16 = 1 << 2;
/// Base clock divided by 256, slow enough for identification.
const CLOCK_DIV_IDENT: u16 = 0x80 << 8;
/// Base clock divided by 4 for data transfers.
const CLOCK_DIV_DATA: u16 = 0x02 << 8;

const INT_COMMAND_COMPLETE: u16 = 1 << 0;
const INT_TRANSFER_COMPLETE: u16 = 1 << 1;
const INT_BUFFER_READ_READY: u16 = 1 << 5;
const INT_ERROR: u16 = 1 << 15;

const PRESENT_CMD_INHIBIT: u32 = 0b11;

const XFER_READ: u16 = 1 << 4;
const XFER_BLOCK_COUNT_ENABLE: u16 = 1 << 1;
const XFER_MULTI_BLOCK: u16 = 1 << 5;
const XFER_AUTO_CMD12: u16 = 1 << 2;

const RESP_NONE: u16 = 0b00;
const RESP_LEN_136: u16 = 0b01;
const RESP_LEN_48: u16 = 0b10;
const RESP_CRC_CHECK: u16 = 1 << 3;
const RESP_INDEX_CHECK: u16 = 1 << 4;
const CMD_DATA_PRESENT: u16 = 1 << 5;

const RESP_R1: u16 = RESP_LEN_48 | RESP_CRC_CHECK | RESP_INDEX_CHECK;
const RESP_R2: u16 = RESP_LEN_136 | RESP_CRC_CHECK;
const RESP_R3: u16 = RESP_LEN_48;
const RESP_R6: u16 = RESP_LEN_48 | RESP_CRC_CHECK | RESP_INDEX_CHECK;
const RESP_R7: u16 = RESP_LEN_48 | RESP_CRC_CHECK | RESP_INDEX_CHECK;

/// CMD8 argument: 2.7-3.6 V range plus the AA check pattern.
const CMD8_VOLTAGE_CHECK: u32 = 0x1AA;
/// ACMD41 argument: host supports high capacity, 3.2-3.4 V window.
const ACMD41_HCS_3V3: u32 = (1 << 30) | (0b11 << 20);
/// OCR busy bit: card finished its internal initialization.
const OCR_READY: u32 = 1 << 31;
/// OCR card capacity status bit.
const OCR_CCS: u32 = 1 << 30;

pub struct Sdhci {
    regs: MmioRegion,
}

impl Sdhci {
    /// # Safety
    ///
    /// `base` must be the register block of an SDHCI-compliant host
    /// controller with a card inserted, and no other code may drive it.
    #[must_use]
    pub const unsafe fn new(base: PhysAddr) -> Self {
        Self {
            // Safety: propagated to the caller.
            regs: unsafe { MmioRegion::new(base) },
        }
    }

    fn set_clock(&mut self, divider: u16) {
        self.regs.write_u16(CLOCK_CONTROL, 0);
        self.regs
            .write_u16(CLOCK_CONTROL, divider | CLOCK_INTERNAL_ENABLE);
        while self.regs.read_u16(CLOCK_CONTROL) & CLOCK_INTERNAL_STABLE == 0 {
            core::hint::spin_loop();
        }
        let clock = self.regs.read_u16(CLOCK_CONTROL);
        self.regs.write_u16(CLOCK_CONTROL, clock | CLOCK_CARD_ENABLE);
    }

    /// Issue a command and wait for its completion, returning `RESPONSE0`.
    fn command(&mut self, index: u8, response: u16, arg: u32) -> Result<u32, DeviceError> {
        while self.regs.read_u32(PRESENT_STATE) & PRESENT_CMD_INHIBIT != 0 {
            core::hint::spin_loop();
        }

        self.regs.write_u32(ARGUMENT, arg);
        self.regs
            .write_u16(COMMAND, (u16::from(index) << 8) | response);

        self.wait_int(INT_COMMAND_COMPLETE)?;
        Ok(self.regs.read_u32(RESPONSE0))
    }

    /// Wait for `flag` in the interrupt status register and acknowledge it.
    fn wait_int(&mut self, flag: u16) -> Result<(), DeviceError> {
        loop {
            let status = self.regs.read_u16(INT_STATUS);
            if status & INT_ERROR != 0 {
                let error = self.regs.read_u16(ERROR_INT_STATUS);
                debug!("sdhci error status {error:#06x}");
                self.regs.write_u16(ERROR_INT_STATUS, error);
                self.regs.write_u16(INT_STATUS, status);
                return Err(DeviceError::Io);
            }
            if status & flag != 0 {
                self.regs.write_u16(INT_STATUS, flag);
                return Ok(());
            }
            core::hint::spin_loop();
        }
    }

    fn app_command(&mut self, rca: u32) -> Result<(), DeviceError> {
        self.command(55, RESP_R1, rca)?;
        Ok(())
    }
}

impl SdHost for Sdhci {
    fn init(&mut self) -> Result<CardCapacity, DeviceError> {
        self.regs.write_u8(SOFTWARE_RESET, RESET_ALL);
        while self.regs.read_u8(SOFTWARE_RESET) & RESET_ALL != 0 {
            core::hint::spin_loop();
        }

        self.regs.write_u8(POWER_CONTROL, POWER_ON_3V3);
        self.regs.write_u8(TIMEOUT_CONTROL, 0x0E);
        self.regs.write_u16(INT_STATUS_ENABLE, 0xFFFF);
        self.regs.write_u16(ERROR_INT_STATUS_ENABLE, 0xFFFF);
        self.set_clock(CLOCK_DIV_IDENT);

        // Identification: reset the card, probe its voltage window, then
        // poll ACMD41 until the card leaves the busy state.
        self.command(0, RESP_NONE, 0)?;
        let echo = self.command(8, RESP_R7, CMD8_VOLTAGE_CHECK)?;
        if echo != CMD8_VOLTAGE_CHECK {
            return Err(DeviceError::Unsupported);
        }

        let ocr = loop {
            self.app_command(0)?;
            let ocr = self.command(41, RESP_R3, ACMD41_HCS_3V3)?;
            if ocr & OCR_READY != 0 {
                break ocr;
            }
            core::hint::spin_loop();
        };
        let capacity = if ocr & OCR_CCS != 0 {
            CardCapacity::High
        } else {
            CardCapacity::Standard
        };

        // CMD2 fetches the CID, CMD3 assigns the relative card address,
        // CMD7 selects the card for transfers.
        self.command(2, RESP_R2, 0)?;
        let rca = self.command(3, RESP_R6, 0)? & 0xFFFF_0000;
        self.command(7, RESP_R1, rca)?;
        self.command(16, RESP_R1, SECTOR_SIZE)?;

        self.set_clock(CLOCK_DIV_DATA);
        debug!("sdhci card ready (rca {:#06x})", rca >> 16);
        Ok(capacity)
    }

    fn read_polled(&mut self, arg: u64, blocks: u32, dst: &mut [u8]) -> Result<(), DeviceError> {
        let Ok(arg) = u32::try_from(arg) else {
            return Err(DeviceError::Unsupported);
        };
        let Ok(block_count) = u16::try_from(blocks) else {
            return Err(DeviceError::Unsupported);
        };
        let len = blocks as usize * SECTOR_SIZE as usize;
        if dst.len() < len {
            return Err(DeviceError::OutOfBounds);
        }

        self.regs.write_u16(BLOCK_SIZE, 512);
        self.regs.write_u16(BLOCK_COUNT, block_count);

        let (index, mode) = if blocks == 1 {
            (17, XFER_READ)
        } else {
            (
                18,
                XFER_READ | XFER_MULTI_BLOCK | XFER_BLOCK_COUNT_ENABLE | XFER_AUTO_CMD12,
            )
        };
        self.regs.write_u16(TRANSFER_MODE, mode);

        while self.regs.read_u32(PRESENT_STATE) & PRESENT_CMD_INHIBIT != 0 {
            core::hint::spin_loop();
        }
        self.regs.write_u32(ARGUMENT, arg);
        self.regs
            .write_u16(COMMAND, (index << 8) | RESP_R1 | CMD_DATA_PRESENT);
        self.wait_int(INT_COMMAND_COMPLETE)?;

        for block in dst[..len].chunks_exact_mut(SECTOR_SIZE as usize) {
            self.wait_int(INT_BUFFER_READ_READY)?;
            for word in block.chunks_exact_mut(4) {
                word.copy_from_slice(&self.regs.read_u32(BUFFER_DATA).to_le_bytes());
            }
        }

        self.wait_int(INT_TRANSFER_COMPLETE)
    }
}
