// Beat events published by the scheduler

/// One scheduler tick, as seen by downstream consumers
///
/// `count` is monotonic within a session so consumers can assert ordering;
/// the measure-relative beat index lives in the flash layer, which keeps
/// its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatEvent {
    /// 1-based tick number within the running session
    pub count: u64,
    /// True for a firing beat, false for the reset published on stop
    pub is_active: bool,
}

impl BeatEvent {
    /// A firing beat
    pub fn beat(count: u64) -> Self {
        Self {
            count,
            is_active: true,
        }
    }

    /// The final reset event a session publishes when it stops
    pub fn reset(count: u64) -> Self {
        Self {
            count,
            is_active: false,
        }
    }
}
