// Beat scheduler - owns the periodic firing mechanism and session lifecycle
// One worker thread per running session; every session field lives behind
// a single lock shared by start, stop, the worker and the BPM setter

use crate::audio::playhead::PlaybackPosition;
use crate::messaging::beat::BeatEvent;
use crate::messaging::channels::{BeatProducer, NotificationProducer};
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::sync::clock::{self, Bpm, DriftLevel};
use crate::sync::{SyncError, SyncResult};
use ringbuf::traits::Producer;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Everything a running session mutates, guarded by one mutex
#[derive(Debug)]
struct SessionState {
    running: bool,
    stop_requested: bool,
    bpm: Bpm,
    /// Ticks fired this session, monotonic across resyncs
    beat_count: u64,
    /// When the session started, for the elapsed diagnostic
    started_at: Option<Instant>,
    /// Grid origin: the first fire lands exactly one interval after this.
    /// A hard resync moves it; `beats_since_anchor` restarts with it.
    anchor: Option<Instant>,
    beats_since_anchor: u64,
    next_deadline: Option<Instant>,
    last_drift_secs: f64,
    resync_count: u64,
}

impl SessionState {
    fn stopped(bpm: Bpm) -> Self {
        Self {
            running: false,
            stop_requested: false,
            bpm,
            beat_count: 0,
            started_at: None,
            anchor: None,
            beats_since_anchor: 0,
            next_deadline: None,
            last_drift_secs: 0.0,
            resync_count: 0,
        }
    }
}

/// What the worker should report after a tick
#[derive(Debug, Clone, Copy, PartialEq)]
enum DriftAction {
    None,
    /// Drift worth a warning, not worth touching the timer
    Report(f64),
    /// Drift forced a hard resync of the beat grid
    Resync(f64),
}

/// Advances the session by one tick and applies the resync policy.
/// Caller holds the session lock.
fn advance_tick(session: &mut SessionState, now: Instant, playing: bool) -> (u64, DriftAction) {
    session.beat_count += 1;
    session.beats_since_anchor += 1;

    let interval_secs = session.bpm.interval_seconds();
    let interval = session.bpm.interval();

    let action = if playing {
        let elapsed = session
            .anchor
            .map(|anchor| now.saturating_duration_since(anchor).as_secs_f64())
            .unwrap_or(0.0);
        let drift = clock::drift_seconds(session.beats_since_anchor, interval_secs, elapsed);
        session.last_drift_secs = drift;

        match DriftLevel::classify(drift) {
            DriftLevel::InSync => DriftAction::None,
            DriftLevel::Slight => DriftAction::Report(drift),
            DriftLevel::Excessive => {
                // Re-anchor to now and fire again after one clean interval.
                // This is a pragmatic re-anchor, not a second alignment to
                // the audio position.
                session.anchor = Some(now);
                session.beats_since_anchor = 0;
                session.next_deadline = Some(now + interval);
                session.resync_count += 1;
                DriftAction::Resync(drift)
            }
        }
    } else {
        // Paused audio makes wall-clock drift meaningless
        session.last_drift_secs = 0.0;
        DriftAction::None
    };

    if !matches!(action, DriftAction::Resync(_)) {
        // Absolute deadlines: per-tick wakeup jitter does not accumulate
        session.next_deadline = session.next_deadline.map(|deadline| deadline + interval);
    }

    (session.beat_count, action)
}

struct SharedState {
    session: Mutex<SessionState>,
    wakeup: Condvar,
}

fn notify(tx: &Arc<Mutex<NotificationProducer>>, notification: Notification) {
    // try_lock: observers must never stall the timing path
    if let Ok(mut tx) = tx.try_lock() {
        let _ = tx.try_push(notification);
    }
}

fn worker_loop(
    shared: Arc<SharedState>,
    provider: Arc<dyn PlaybackPosition>,
    beat_tx: Arc<Mutex<BeatProducer>>,
    notification_tx: Arc<Mutex<NotificationProducer>>,
) {
    loop {
        let (count, action) = {
            let mut session = shared.session.lock().unwrap();
            loop {
                if session.stop_requested {
                    return;
                }
                let Some(deadline) = session.next_deadline else {
                    return;
                };
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let (guard, _timeout) = shared
                    .wakeup
                    .wait_timeout(session, deadline - now)
                    .unwrap();
                session = guard;
            }

            advance_tick(&mut session, Instant::now(), provider.is_playing())
        };

        match action {
            DriftAction::None => {}
            DriftAction::Report(drift) => {
                notify(
                    &notification_tx,
                    Notification::warning(
                        NotificationCategory::Sync,
                        format!("Beat drift {:.0}ms, within tolerance", drift * 1000.0),
                    ),
                );
            }
            DriftAction::Resync(drift) => {
                eprintln!(
                    "Warning: beat drift {:.0}ms, resynchronizing beat grid",
                    drift * 1000.0
                );
                notify(
                    &notification_tx,
                    Notification::warning(
                        NotificationCategory::Sync,
                        format!("Beat drift {:.0}ms, beat grid resynchronized", drift * 1000.0),
                    ),
                );
            }
        }

        // Published outside the session lock. stop() joins this thread
        // before it returns, so no event can land after stop()
        let mut tx = beat_tx.lock().unwrap();
        if tx.try_push(BeatEvent::beat(count)).is_err() {
            eprintln!("Warning: beat buffer full, beat {} dropped", count);
            notify(
                &notification_tx,
                Notification::warning(
                    NotificationCategory::Sync,
                    format!("Beat buffer full, beat {} dropped", count),
                ),
            );
        }
    }
}

/// Periodic beat scheduler
///
/// Drives the visual metronome: started against the audio's playback
/// position, it fires one `BeatEvent` per beat interval on a dedicated
/// worker thread and resynchronizes when wall-clock drift exceeds the
/// hard threshold.
pub struct BeatScheduler {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
    provider: Option<Arc<dyn PlaybackPosition>>,
    beat_tx: Arc<Mutex<BeatProducer>>,
    notification_tx: Arc<Mutex<NotificationProducer>>,
}

impl BeatScheduler {
    pub fn new(beat_tx: BeatProducer, notification_tx: Arc<Mutex<NotificationProducer>>) -> Self {
        Self {
            shared: Arc::new(SharedState {
                session: Mutex::new(SessionState::stopped(Bpm::default())),
                wakeup: Condvar::new(),
            }),
            worker: None,
            provider: None,
            beat_tx: Arc::new(Mutex::new(beat_tx)),
            notification_tx,
        }
    }

    /// Wires the audio collaborator the drift check reads
    pub fn set_position_provider(&mut self, provider: Arc<dyn PlaybackPosition>) {
        self.provider = Some(provider);
    }

    /// Sets the tempo, rejecting values outside the valid range.
    /// While running, takes effect on the next scheduling decision; the
    /// already-computed next fire keeps its deadline.
    pub fn set_bpm(&mut self, bpm: u32) -> SyncResult<()> {
        let bpm = Bpm::new(bpm)?;
        self.shared.session.lock().unwrap().bpm = bpm;
        Ok(())
    }

    pub fn bpm(&self) -> Bpm {
        self.shared.session.lock().unwrap().bpm
    }

    /// Starts a session aligned to the beat grid implied by
    /// `start_time_seconds`, the audio's current playback position.
    /// Restarting while running replaces the session; the provider stays
    /// wired. Fails when no position provider is set, and rolls back to
    /// stopped when the worker cannot be spawned.
    pub fn start(&mut self, start_time_seconds: f64) -> SyncResult<()> {
        let provider = self
            .provider
            .clone()
            .ok_or(SyncError::NoPositionProvider)?;

        self.halt_session();

        {
            let mut session = self.shared.session.lock().unwrap();
            let interval = session.bpm.interval();
            let delay = clock::first_beat_delay(start_time_seconds, session.bpm.interval_seconds());
            let now = Instant::now();

            session.running = true;
            session.stop_requested = false;
            session.beat_count = 0;
            session.beats_since_anchor = 0;
            session.started_at = Some(now);
            // Anchor on the previous grid line so the first fire sits
            // exactly one interval of elapsed time after it
            session.anchor = Some((now + delay).checked_sub(interval).unwrap_or(now));
            session.next_deadline = Some(now + delay);
            session.last_drift_secs = 0.0;
            session.resync_count = 0;
        }

        let shared = Arc::clone(&self.shared);
        let beat_tx = Arc::clone(&self.beat_tx);
        let notification_tx = Arc::clone(&self.notification_tx);
        let spawn = std::thread::Builder::new()
            .name("beat-scheduler".to_string())
            .spawn(move || worker_loop(shared, provider, beat_tx, notification_tx));

        match spawn {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                let mut session = self.shared.session.lock().unwrap();
                *session = SessionState::stopped(session.bpm);
                Err(SyncError::WorkerSpawn(e))
            }
        }
    }

    /// Stops the running session and unwires the position provider.
    /// Guarantees no beat fires after this returns; the last event a
    /// consumer sees is the reset. No-op when already stopped.
    pub fn stop(&mut self) {
        self.halt_session();
        self.provider = None;
    }

    /// Joins the worker and publishes the final reset event.
    /// Keeps the provider wired, for restart-while-running.
    fn halt_session(&mut self) {
        let was_running = {
            let mut session = self.shared.session.lock().unwrap();
            let was_running = session.running;
            session.stop_requested = true;
            was_running
        };
        self.shared.wakeup.notify_all();

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        if !was_running {
            return;
        }

        let final_count = {
            let mut session = self.shared.session.lock().unwrap();
            let count = session.beat_count;
            *session = SessionState::stopped(session.bpm);
            count
        };

        let mut tx = self.beat_tx.lock().unwrap();
        if tx.try_push(BeatEvent::reset(final_count)).is_err() {
            eprintln!("Warning: beat buffer full, reset event dropped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.session.lock().unwrap().running
    }

    /// Ticks fired this session, 0 when stopped
    pub fn beat_count(&self) -> u64 {
        self.shared.session.lock().unwrap().beat_count
    }

    /// Drift measured at the last tick, 0.0 when stopped or paused
    pub fn current_drift_seconds(&self) -> f64 {
        self.shared.session.lock().unwrap().last_drift_secs
    }

    /// Wall-clock time since the session started, zero when stopped
    pub fn elapsed(&self) -> Duration {
        self.shared
            .session
            .lock()
            .unwrap()
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Hard resyncs performed this session
    pub fn resync_count(&self) -> u64 {
        self.shared.session.lock().unwrap().resync_count
    }
}

impl Drop for BeatScheduler {
    fn drop(&mut self) {
        self.halt_session();
    }
}
