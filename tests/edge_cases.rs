//! Edge case tests and robustness validation
//!
//! Extreme inputs and state-machine corners: the engine must stay in its
//! last well-defined state instead of crashing or wedging.

use beatsync::sync::clock::{self, MIN_FIRST_BEAT_DELAY};
use beatsync::{
    BeatScheduler, Bpm, FlashController, FlashFrame, FlashPattern, SharedPlayhead, SyncError,
    create_beat_channel, create_notification_channel,
};
use ringbuf::traits::Consumer;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Test BPM boundaries and rejection on both sides
#[test]
fn test_bpm_boundaries() {
    assert!(Bpm::new(30).is_ok());
    assert!(Bpm::new(300).is_ok());

    for bpm in [0, 1, 29, 301, 1000, u32::MAX] {
        assert!(matches!(Bpm::new(bpm), Err(SyncError::BpmOutOfRange(_))));
    }
}

/// Test first-beat delay with hostile start positions
#[test]
fn test_first_beat_delay_hostile_inputs() {
    // Defensive UI inputs land on position zero
    for start in [-1.0, f64::NEG_INFINITY, f64::NAN] {
        let delay = clock::first_beat_delay(start, 0.5);
        assert_eq!(delay, Duration::from_secs_f64(0.5));
    }

    // Huge positions still produce a sane delay within one interval
    let delay = clock::first_beat_delay(86_400.0 * 365.0, 0.2);
    assert!(delay >= MIN_FIRST_BEAT_DELAY);
    assert!(delay <= Duration::from_secs_f64(0.2) + Duration::from_millis(1));

    // Fastest and slowest supported grids
    let fast = clock::first_beat_delay(0.1, 60.0 / 300.0);
    assert!(fast >= MIN_FIRST_BEAT_DELAY && fast < Duration::from_secs_f64(0.2));
    let slow = clock::first_beat_delay(0.1, 60.0 / 30.0);
    assert!(slow < Duration::from_secs(2));
}

/// Test beats-per-measure clamping extremes
#[test]
fn test_beats_per_measure_extremes() {
    let mut flash = FlashController::new();

    flash.set_beats_per_measure(0);
    assert_eq!(flash.beats_per_measure(), 2);

    flash.set_beats_per_measure(u8::MAX);
    assert_eq!(flash.beats_per_measure(), 8);

    // Wrapping still holds at the clamped widths
    flash.start();
    for _ in 0..20 {
        let event = flash.on_beat_trigger().unwrap();
        assert!(event.beat >= 1 && event.beat <= 8);
    }
}

/// Test progressive bar frames at every measure width
#[test]
fn test_progressive_bar_all_measure_widths() {
    for width in 2..=8u8 {
        let mut flash = FlashController::new();
        flash.set_pattern(FlashPattern::ProgressiveBar);
        flash.set_beats_per_measure(width);
        flash.start();

        for beat in 1..=width {
            let event = flash.on_beat_trigger().unwrap();
            let FlashFrame::ProgressiveBar { segments } = event.frame() else {
                panic!("wrong frame variant");
            };
            assert_eq!(segments.len(), width as usize);
            let filled = segments.iter().filter(|s| s.filled).count();
            assert_eq!(filled, beat as usize);
        }
    }
}

/// Test start/stop hammering leaves the scheduler consistent
#[test]
fn test_rapid_start_stop_cycles() {
    let (beat_tx, mut beat_rx) = create_beat_channel(256);
    let (notification_tx, _notification_rx) = create_notification_channel(64);
    let mut scheduler = BeatScheduler::new(beat_tx, Arc::new(Mutex::new(notification_tx)));

    let playhead = SharedPlayhead::new();
    playhead.set_playing(true);
    scheduler.set_position_provider(playhead.clone());
    scheduler.set_bpm(300).unwrap();

    for _ in 0..10 {
        scheduler.start(0.0).unwrap();
        assert!(scheduler.is_running());
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.beat_count(), 0);
        // Provider is unwired by stop; rewire for the next round
        scheduler.set_position_provider(playhead.clone());
    }

    // Each stopped-immediately session emitted at most one beat before
    // its reset
    while let Some(event) = beat_rx.try_pop() {
        if event.is_active {
            assert!(event.count <= 1);
        }
    }
}

/// Test start after stop fails until the provider is rewired
#[test]
fn test_stop_unwires_provider() {
    let (beat_tx, _beat_rx) = create_beat_channel(64);
    let (notification_tx, _notification_rx) = create_notification_channel(64);
    let mut scheduler = BeatScheduler::new(beat_tx, Arc::new(Mutex::new(notification_tx)));

    let playhead = SharedPlayhead::new();
    scheduler.set_position_provider(playhead.clone());
    scheduler.start(0.0).unwrap();
    scheduler.stop();

    assert!(matches!(
        scheduler.start(0.0),
        Err(SyncError::NoPositionProvider)
    ));

    scheduler.set_position_provider(playhead);
    assert!(scheduler.start(0.0).is_ok());
    scheduler.stop();
}

/// Test flash controller survives triggers in every state
#[test]
fn test_flash_triggers_in_all_states() {
    let mut flash = FlashController::new();

    // Stopped: ignored, state untouched
    for _ in 0..5 {
        assert!(flash.on_beat_trigger().is_none());
    }
    assert_eq!(flash.current_beat(), 1);

    // Start, run, stop, trigger again: still ignored
    flash.start();
    for _ in 0..3 {
        flash.on_beat_trigger();
    }
    flash.stop();
    assert!(flash.on_beat_trigger().is_none());

    // Restart resets the measure position
    flash.start();
    assert_eq!(flash.on_beat_trigger().unwrap().beat, 1);
}
