// Playback position provider - read-only oracle over the audio clock
// The audio side writes it, the sync engine only ever reads it

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Read-only view of the audio playback clock
/// Implementations must tolerate concurrent reads from the timer thread
pub trait PlaybackPosition: Send + Sync {
    /// Whether audio is actively playing
    fn is_playing(&self) -> bool;

    /// Current playback position in seconds from the start of the track
    fn position_seconds(&self) -> f64;
}

/// Shared playhead backed by atomics
/// Position is stored in whole microseconds so an audio callback can
/// publish it without floating point atomics
#[derive(Debug)]
pub struct SharedPlayhead {
    playing: AtomicBool,
    position_micros: AtomicU64,
}

impl SharedPlayhead {
    /// Create new shared playhead, stopped at position zero
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Set the play/pause flag
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }

    /// Jump to an absolute position; negative values land on zero
    pub fn seek_seconds(&self, seconds: f64) {
        let micros = if seconds.is_finite() && seconds > 0.0 {
            (seconds * 1_000_000.0) as u64
        } else {
            0
        };
        self.position_micros.store(micros, Ordering::Relaxed);
    }

    /// Advance the position (called from the audio callback)
    pub fn advance_micros(&self, micros: u64) {
        self.position_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Advance the position by a seconds delta
    pub fn advance_seconds(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.advance_micros((seconds * 1_000_000.0) as u64);
        }
    }
}

impl Default for SharedPlayhead {
    fn default() -> Self {
        Self {
            playing: AtomicBool::new(false),
            position_micros: AtomicU64::new(0),
        }
    }
}

impl PlaybackPosition for SharedPlayhead {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    fn position_seconds(&self) -> f64 {
        self.position_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }
}
