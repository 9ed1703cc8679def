//! Error types for the boot pipeline.

use crate::boot::BootStage;
use loader::LoadError;
use mwboot_core::mem::MemoryError;
use storage::FetchError;
use thiserror::Error;

/// Any failure of the boot pipeline. All are fatal: the sequencer transitions
/// to its terminal aborted stage and nothing is retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// `run` was called again on a sequencer already in a terminal stage.
    #[error("boot sequencer already ran (stage {stage:?})")]
    AlreadyRan { stage: BootStage },
    /// Staging the companion bootloader blob violated a copy precondition.
    #[error("bootloader staging failed: {0}")]
    Staging(#[source] MemoryError),
    /// The storage fetch failed (initialization or a sub-transfer).
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The fetched container could not be extracted.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The post-write register readback or the firmware identity check
    /// failed: the companion core is absent, held in reset, or incompatible.
    #[error("companion verification failed (load address readback {readback:#010x}, version {version:#010x})")]
    Verification { readback: u32, version: u32 },
}
