use beatsync::{
    BeatScheduler, FlashController, FlashFrame, FlashLevel, FlashPattern, PlaybackPosition,
    SharedPlayhead, create_beat_channel, create_notification_channel,
};
use ringbuf::traits::Consumer;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// Ringbuffer capacity constants
// Sized for the fastest supported tempo:
// - 300 BPM produces 5 beat events per second
// - 64 capacity buffers >10 seconds against a stalled consumer
// - Notifications are rarer (drift warnings, resyncs), 256 is generous
const BEAT_RINGBUFFER_CAPACITY: usize = 64;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 256;

const DEMO_BPM: u32 = 120;

/// How long the simulated audio thread sleeps between position updates
const PLAYBACK_TICK: Duration = Duration::from_millis(10);

fn main() {
    println!("=== BeatSync ===");
    println!("Version 0.1.0 - visual metronome engine\n");

    // Create the communication channels
    let (beat_tx, mut beat_rx) = create_beat_channel(BEAT_RINGBUFFER_CAPACITY);
    let (notification_tx, mut notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    // Simulated playback clock standing in for the audio engine.
    // Starts mid-beat so the first fire shows the grid alignment.
    let playhead = SharedPlayhead::new();
    playhead.seek_seconds(0.3);
    playhead.set_playing(true);

    {
        let playhead = playhead.clone();
        thread::spawn(move || {
            loop {
                thread::sleep(PLAYBACK_TICK);
                playhead.advance_seconds(PLAYBACK_TICK.as_secs_f64());
            }
        });
    }
    println!("Playback simulation started at {:.1}s", playhead.position_seconds());

    let mut scheduler = BeatScheduler::new(beat_tx, notification_tx);
    scheduler.set_position_provider(playhead.clone());
    if let Err(e) = scheduler.set_bpm(DEMO_BPM) {
        eprintln!("ERROR: {}", e);
        return;
    }

    let mut flash = FlashController::new();

    println!("Starting sync at {}\n", scheduler.bpm());
    if let Err(e) = scheduler.start(playhead.position_seconds()) {
        eprintln!("ERROR: {}", e);
        return;
    }
    flash.start();

    // Two measures per pattern, faster tempo for the last one
    for (i, pattern) in FlashPattern::ALL.into_iter().enumerate() {
        flash.set_pattern(pattern);
        println!("--- {} ---", pattern.info().name);

        if i == FlashPattern::ALL.len() - 1 {
            if scheduler.set_bpm(240).is_ok() {
                println!("(tempo change: {})", scheduler.bpm());
            }
        }

        let mut beats = 0;
        let deadline = Instant::now() + Duration::from_secs(10);
        while beats < 2 * flash.beats_per_measure() as usize && Instant::now() < deadline {
            while let Some(event) = beat_rx.try_pop() {
                if !event.is_active {
                    continue;
                }
                if let Some(flash_event) = flash.on_beat_trigger() {
                    println!(
                        "{}  beat {}",
                        render(&flash_event.frame()),
                        flash.beat_counter_text()
                    );
                    beats += 1;
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    // Diagnostics before stop clears the session
    println!(
        "\nSession: {} beats in {:.1}s, drift {:.1}ms, {} resync(s)",
        scheduler.beat_count(),
        scheduler.elapsed().as_secs_f64(),
        scheduler.current_drift_seconds() * 1000.0,
        scheduler.resync_count()
    );

    scheduler.stop();
    let reset = flash.stop();
    println!("{}  stopped", render(&reset.frame()));

    while let Some(notification) = notification_rx.try_pop() {
        println!("[{:?}/{:?}] {}", notification.level, notification.category, notification.message);
    }

    println!("\n=== BeatSync finished ===");
}

/// Text rendering of a flash frame, one row per beat
fn render(frame: &FlashFrame) -> String {
    match frame {
        FlashFrame::SingleArea { level } => match level {
            FlashLevel::Strong => "[XXXX]".to_string(),
            FlashLevel::Weak => "[ xx ]".to_string(),
            FlashLevel::Idle => "[    ]".to_string(),
        },
        FlashFrame::FourCircles { circles } => circles
            .iter()
            .map(|circle| {
                if circle.strong {
                    "(@)"
                } else if circle.lit {
                    "(o)"
                } else {
                    "( )"
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
        FlashFrame::ProgressiveBar { segments } => {
            let bar: String = segments
                .iter()
                .map(|segment| {
                    if segment.strong {
                        '#'
                    } else if segment.filled {
                        '='
                    } else {
                        '.'
                    }
                })
                .collect();
            format!("[{}]", bar)
        }
    }
}
