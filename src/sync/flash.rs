// Flash pattern state machine - maps beat events to render-ready visual state
// Decides which elements light up; colors and radii belong to the renderer

use std::fmt;

pub const MIN_BEATS_PER_MEASURE: u8 = 2;
pub const MAX_BEATS_PER_MEASURE: u8 = 8;
pub const DEFAULT_BEATS_PER_MEASURE: u8 = 4;

/// Width of the four-circle pattern
pub const FOUR_CIRCLE_COUNT: usize = 4;

/// Visual flash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FlashPattern {
    /// One full-area indicator, brightest on the strong beat
    SingleArea,
    /// Four circles, one lit per beat
    FourCircles,
    /// Bar filling one segment per beat across the measure
    ProgressiveBar,
}

impl FlashPattern {
    pub const ALL: [FlashPattern; 3] = [
        FlashPattern::SingleArea,
        FlashPattern::FourCircles,
        FlashPattern::ProgressiveBar,
    ];

    /// Display name and description for pattern pickers
    pub fn info(&self) -> FlashPatternInfo {
        match self {
            FlashPattern::SingleArea => FlashPatternInfo {
                name: "Single area",
                description: "One large flash area covering the whole view",
            },
            FlashPattern::FourCircles => FlashPatternInfo {
                name: "Four circles",
                description: "Four indicators lighting up one beat at a time",
            },
            FlashPattern::ProgressiveBar => FlashPatternInfo {
                name: "Progressive bar",
                description: "Bar segments filling up across the measure",
            },
        }
    }
}

impl Default for FlashPattern {
    fn default() -> Self {
        FlashPattern::SingleArea
    }
}

impl fmt::Display for FlashPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info().name)
    }
}

/// Pattern metadata for UI pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashPatternInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// Brightness class of the single-area indicator
/// Idle is its own state so a renderer can never mistake a reset for a
/// weak beat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Idle,
    Weak,
    Strong,
}

/// One circle of the four-circle pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CircleState {
    pub lit: bool,
    /// Lit with the larger strong-beat glow
    pub strong: bool,
}

/// One segment of the progressive bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentState {
    pub filled: bool,
    /// Filled with strong-beat styling
    pub strong: bool,
}

/// Render instruction for one flash event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashFrame {
    SingleArea { level: FlashLevel },
    FourCircles { circles: [CircleState; FOUR_CIRCLE_COUNT] },
    ProgressiveBar { segments: Vec<SegmentState> },
}

/// One beat as seen by the renderer
/// Carries `beats_per_measure` so frames can be computed without a
/// back-reference to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashEvent {
    pub pattern: FlashPattern,
    /// 1-based beat within the measure
    pub beat: u8,
    pub beats_per_measure: u8,
    /// True on the first beat of the measure
    pub is_strong: bool,
    /// False on the reset event published by stop
    pub is_active: bool,
}

impl FlashEvent {
    /// Computes the render instruction for this event
    pub fn frame(&self) -> FlashFrame {
        match self.pattern {
            FlashPattern::SingleArea => {
                let level = if !self.is_active {
                    FlashLevel::Idle
                } else if self.is_strong {
                    FlashLevel::Strong
                } else {
                    FlashLevel::Weak
                };
                FlashFrame::SingleArea { level }
            }
            FlashPattern::FourCircles => {
                let mut circles = [CircleState::default(); FOUR_CIRCLE_COUNT];
                if self.is_active {
                    // This pattern is four wide by definition; wider
                    // measures wrap around the circle row
                    let lit = (self.beat.max(1) as usize - 1) % FOUR_CIRCLE_COUNT;
                    circles[lit] = CircleState {
                        lit: true,
                        strong: self.is_strong,
                    };
                }
                FlashFrame::FourCircles { circles }
            }
            FlashPattern::ProgressiveBar => {
                let count = self.beats_per_measure as usize;
                let mut segments = vec![SegmentState::default(); count];
                if self.is_active {
                    // Cumulative fill: everything up to the current beat
                    for (i, segment) in segments.iter_mut().take(self.beat as usize).enumerate() {
                        segment.filled = true;
                        segment.strong = i == 0 && self.is_strong;
                    }
                }
                FlashFrame::ProgressiveBar { segments }
            }
        }
    }
}

/// Flash pattern state machine
/// Consumes beat triggers, advances the beat-in-measure counter and emits
/// the visual state for the selected pattern
#[derive(Debug, Clone)]
pub struct FlashController {
    current_beat: u8,
    beats_per_measure: u8,
    selected_pattern: FlashPattern,
    running: bool,
    /// Set by start so the first trigger fires beat 1 instead of
    /// advancing past it
    first_beat_pending: bool,
}

impl FlashController {
    pub fn new() -> Self {
        Self {
            current_beat: 1,
            beats_per_measure: DEFAULT_BEATS_PER_MEASURE,
            selected_pattern: FlashPattern::default(),
            running: false,
            first_beat_pending: false,
        }
    }

    /// 1-based beat within the measure
    pub fn current_beat(&self) -> u8 {
        self.current_beat
    }

    pub fn beats_per_measure(&self) -> u8 {
        self.beats_per_measure
    }

    /// Out-of-range values are clamped into [2, 8], unlike BPM which
    /// rejects them outright
    pub fn set_beats_per_measure(&mut self, beats: u8) {
        self.beats_per_measure = beats.clamp(MIN_BEATS_PER_MEASURE, MAX_BEATS_PER_MEASURE);
        if self.current_beat > self.beats_per_measure {
            self.current_beat = 1;
        }
    }

    pub fn selected_pattern(&self) -> FlashPattern {
        self.selected_pattern
    }

    /// Pattern changes take effect on the next beat, running or not
    pub fn set_pattern(&mut self, pattern: FlashPattern) {
        self.selected_pattern = pattern;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Display text like "3/4" for the beat counter
    pub fn beat_counter_text(&self) -> String {
        format!("{}/{}", self.current_beat, self.beats_per_measure)
    }

    /// Arms the state machine at beat 1
    /// Emits nothing; the first visual update comes with the first trigger
    pub fn start(&mut self) {
        self.running = true;
        self.current_beat = 1;
        self.first_beat_pending = true;
    }

    /// Stops and returns the reset event so the view drops to idle
    /// immediately instead of holding a stale beat
    pub fn stop(&mut self) -> FlashEvent {
        self.running = false;
        self.current_beat = 1;
        self.first_beat_pending = false;
        FlashEvent {
            pattern: self.selected_pattern,
            beat: self.current_beat,
            beats_per_measure: self.beats_per_measure,
            is_strong: false,
            is_active: false,
        }
    }

    /// Advances one beat and returns the event to render
    /// Ignored (None) while stopped; that is not an error
    pub fn on_beat_trigger(&mut self) -> Option<FlashEvent> {
        if !self.running {
            return None;
        }

        if self.first_beat_pending {
            self.first_beat_pending = false;
        } else if self.current_beat >= self.beats_per_measure {
            self.current_beat = 1;
        } else {
            self.current_beat += 1;
        }

        let is_strong = self.current_beat == 1;
        Some(FlashEvent {
            pattern: self.selected_pattern,
            beat: self.current_beat,
            beats_per_measure: self.beats_per_measure,
            is_strong,
            is_active: true,
        })
    }
}

impl Default for FlashController {
    fn default() -> Self {
        Self::new()
    }
}
