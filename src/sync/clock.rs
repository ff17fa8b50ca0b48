// Beat clock - tempo math and drift detection
// Aligns beat timing to the audio's own timeline, not to wall-clock "now"

use crate::sync::{SyncError, SyncResult};
use std::fmt;
use std::time::Duration;

/// Drift up to this is normal timer jitter and ignored
pub const DRIFT_SOFT_THRESHOLD_SECS: f64 = 0.02;

/// Drift above this forces a hard resync of the beat grid
pub const DRIFT_HARD_THRESHOLD_SECS: f64 = 0.05;

/// Floor for the first scheduled fire, so the timer never gets a
/// zero or near-zero delay
pub const MIN_FIRST_BEAT_DELAY: Duration = Duration::from_millis(10);

/// Tempo in whole beats per minute
/// Valid range is [30, 300]; out-of-range values are rejected, never clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bpm(u32);

impl Bpm {
    pub const MIN: u32 = 30;
    pub const MAX: u32 = 300;

    /// Creates a tempo, rejecting values outside [30, 300]
    pub fn new(bpm: u32) -> SyncResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&bpm) {
            return Err(SyncError::BpmOutOfRange(bpm));
        }
        Ok(Self(bpm))
    }

    /// Get BPM value
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Duration of one beat in seconds
    pub fn interval_seconds(&self) -> f64 {
        60.0 / self.0 as f64
    }

    /// Duration of one beat, rounded to whole milliseconds
    pub fn interval_millis(&self) -> u64 {
        (self.interval_seconds() * 1000.0).round() as u64
    }

    /// Duration of one beat
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_seconds())
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self(120)
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}

/// Delay until the first fire, aligned to the beat grid implied by the
/// audio's current playback position
///
/// `offset = start mod interval` is how far past the previous grid line
/// the audio already is; the first flash lands on the next grid line.
pub fn first_beat_delay(start_time_secs: f64, interval_secs: f64) -> Duration {
    let start = if start_time_secs.is_finite() && start_time_secs > 0.0 {
        start_time_secs
    } else {
        0.0
    };

    let offset = start % interval_secs;
    let mut delay = interval_secs - offset;
    if delay <= 0.0 {
        delay += interval_secs;
    }

    Duration::from_secs_f64(delay).max(MIN_FIRST_BEAT_DELAY)
}

/// Absolute difference between the elapsed time expected after
/// `beat_count` beats and the actually observed elapsed time
pub fn drift_seconds(beat_count: u64, interval_secs: f64, elapsed_secs: f64) -> f64 {
    let expected = beat_count as f64 * interval_secs;
    (elapsed_secs - expected).abs()
}

/// Drift classification against the resync thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftLevel {
    /// Within normal jitter, no action
    InSync,
    /// Worth reporting, not worth touching the timer
    Slight,
    /// Grid has wandered too far, hard resync required
    Excessive,
}

impl DriftLevel {
    /// Classify a measured drift
    /// The asymmetric thresholds keep ordinary audio buffering jitter from
    /// causing resync oscillation while still bounding absolute drift
    pub fn classify(drift_secs: f64) -> Self {
        if drift_secs > DRIFT_HARD_THRESHOLD_SECS {
            DriftLevel::Excessive
        } else if drift_secs > DRIFT_SOFT_THRESHOLD_SECS {
            DriftLevel::Slight
        } else {
            DriftLevel::InSync
        }
    }
}
