// Sync module - beat scheduling and flash state machine
// The BPM-synchronized core driving the visual metronome

pub mod clock;
pub mod flash;
pub mod scheduler;

pub use clock::{Bpm, DriftLevel};
pub use flash::{FlashController, FlashEvent, FlashFrame, FlashLevel, FlashPattern};
pub use scheduler::BeatScheduler;

use thiserror::Error;

/// Sync-related errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("BPM {0} is out of range (30-300)")]
    BpmOutOfRange(u32),

    #[error("No playback position provider set")]
    NoPositionProvider,

    #[error("Failed to spawn scheduler thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
