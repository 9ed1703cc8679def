//! The boot state machine.

use crate::{
    BootError, Result,
    regs::{CTRL_START, ControlRegisters, RegSlot},
};
use loader::ImageLoader;
use log::{debug, error, info};
use mwboot_core::{PhysAddr, mem::Memory, storage::SdHost};
use storage::SdReader;

/// Stages of the boot pipeline.
///
/// Strictly linear; the only other edge is the universal error edge into
/// [`AbortedOnError`](Self::AbortedOnError). Both `Running` and
/// `AbortedOnError` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    Idle,
    StagingBootloader,
    FetchingImage,
    ExtractingImage,
    ConfiguringTarget,
    ReleasingTarget,
    Running,
    AbortedOnError,
}

/// Compile-time boot parameters.
///
/// There is no runtime configuration surface: addresses, sizes, and the
/// version sentinel are fixed by the board's memory map.
#[derive(Debug, Clone, Copy)]
pub struct BootConfig<'a> {
    /// Companion-core first-stage bootloader, staged into DRAM as-is.
    pub bootloader: &'a [u8],
    /// Where the bootloader blob is staged.
    pub bootloader_base: PhysAddr,
    /// On-storage size of the OS image in bytes.
    pub image_bytes: u32,
    /// First storage sector of the OS image.
    pub image_start_sector: u64,
    /// Base the image's segments are laid out against; also the value handed
    /// to the companion core through the load-address register.
    pub extract_base: PhysAddr,
    /// Expected contents of the version register; anything else means an
    /// absent or incompatible companion core.
    pub expected_version: u32,
}

/// Drives the staging → fetch → extract → configure → release pipeline.
pub struct BootSequencer {
    stage: BootStage,
}

impl BootSequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: BootStage::Idle,
        }
    }

    /// The stage the sequencer is currently in (terminal once `Running` or
    /// `AbortedOnError` is reached).
    #[must_use]
    pub const fn stage(&self) -> BootStage {
        self.stage
    }

    /// Run the boot pipeline to completion.
    ///
    /// `image_window` is the DRAM window the raw container is fetched into;
    /// it must hold [`storage::padded_len`]`(config.image_bytes)` bytes and
    /// must not overlap the extraction region.
    ///
    /// On success the sequencer is in [`BootStage::Running`]: the companion
    /// core owns the staged regions and the caller must only park.
    ///
    /// # Errors
    ///
    /// Any failed step aborts the attempt and leaves the sequencer in
    /// [`BootStage::AbortedOnError`]. Whatever bytes were already copied
    /// remain as copied; there is no rollback and no retry.
    ///
    /// Both end stages are terminal: a later call on the same sequencer
    /// returns [`BootError::AlreadyRan`] without touching the hardware.
    pub fn run<H: SdHost, M: Memory, R: ControlRegisters>(
        &mut self,
        config: &BootConfig<'_>,
        host: H,
        image_window: &mut [u8],
        mem: &mut M,
        regs: &mut R,
    ) -> Result<()> {
        if self.stage != BootStage::Idle {
            let stage = self.stage;
            error!("boot sequencer re-entered in stage {stage:?}");
            return Err(BootError::AlreadyRan { stage });
        }

        let res = self.sequence(config, host, image_window, mem, regs);
        if let Err(err) = &res {
            error!("boot aborted: {err}");
            self.stage = BootStage::AbortedOnError;
        }
        res
    }

    fn sequence<H: SdHost, M: Memory, R: ControlRegisters>(
        &mut self,
        config: &BootConfig<'_>,
        host: H,
        image_window: &mut [u8],
        mem: &mut M,
        regs: &mut R,
    ) -> Result<()> {
        self.stage = BootStage::StagingBootloader;
        info!(
            "staging companion bootloader ({} bytes at {:#x})",
            config.bootloader.len(),
            config.bootloader_base
        );
        mem.copy_to(config.bootloader_base, config.bootloader)
            .map_err(BootError::Staging)?;

        self.stage = BootStage::FetchingImage;
        let mut sd = SdReader::new(host)?;
        sd.fetch(image_window, config.image_bytes, config.image_start_sector)?;

        self.stage = BootStage::ExtractingImage;
        info!("extracting OS image to {:#x}", config.extract_base);
        let image = &image_window[..config.image_bytes as usize];
        let loaded = ImageLoader::load(image, config.extract_base, mem)?;
        debug!(
            "{} loadable segments, entry point {:#x} (handoff is register-driven, the entry is not taken)",
            loaded.loadable_segments, loaded.entry_point
        );

        self.stage = BootStage::ConfiguringTarget;
        // The companion register file is 32 bits wide; the extraction base
        // sits below 4 GiB on this platform.
        #[expect(clippy::cast_possible_truncation)]
        let load_address = config.extract_base.as_u64() as u32;
        regs.write(RegSlot::LoadAddress, load_address);
        let readback = regs.read(RegSlot::LoadAddress);
        let version = regs.read(RegSlot::Version);
        if readback != load_address || version != config.expected_version {
            return Err(BootError::Verification { readback, version });
        }
        info!("companion core configured (firmware {version:#010x})");

        self.stage = BootStage::ReleasingTarget;
        regs.write(RegSlot::Control, CTRL_START);
        info!("companion core released from reset");

        self.stage = BootStage::Running;
        Ok(())
    }
}

impl Default for BootSequencer {
    fn default() -> Self {
        Self::new()
    }
}
