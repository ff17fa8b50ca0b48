// BeatSync - Library exports for tests and benchmarks

pub mod audio;
pub mod messaging;
pub mod sync;

// Re-export commonly used types for convenience
pub use audio::playhead::{PlaybackPosition, SharedPlayhead};
pub use messaging::beat::BeatEvent;
pub use messaging::channels::{create_beat_channel, create_notification_channel};
pub use messaging::notification::{Notification, NotificationCategory, NotificationLevel};
pub use sync::{
    BeatScheduler, Bpm, DriftLevel, FlashController, FlashEvent, FlashFrame, FlashLevel,
    FlashPattern, SyncError, SyncResult,
};
