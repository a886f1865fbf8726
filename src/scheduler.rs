//! Timed per-key color transitions
//!
//! [`LightingScheduler`] keeps the last committed color of every key and a
//! queue of [`DelayedAction`]s. A tick thread applies actions once their start
//! time has passed. Inserting an action drops every pending action for the
//! same key whose `[start, start + fade)` interval overlaps it, so the last
//! request for a time window wins.
//!
//! The color map and the queue share one lock. Every public operation takes
//! it once, so a flash (cancel plus two inserts) is atomic with respect to
//! the tick thread.

use std::sync::Arc;
use std::time::Duration;

use keyglow_device::{KeyMap, LightingSink, LogicalKey};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::color::Color;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::grid::ColorGrid;
use crate::worker::TickWorker;

/// Duration of the symmetric effect used for instant color changes
pub const IMMEDIATE_HOLD_MS: u32 = 10_000;

/// Default tick interval for all timer threads
pub const DEFAULT_INTERVAL_MS: u64 = 25;

/// "At `start_ms`, begin fading `key` toward `color` over `fade_ms`"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayedAction {
    pub start_ms: i64,
    pub key: LogicalKey,
    pub color: Color,
    pub fade_ms: i32,
}

impl DelayedAction {
    pub fn end_ms(&self) -> i64 {
        self.start_ms + i64::from(self.fade_ms.max(0))
    }

    /// Half-open interval overlap
    pub fn overlaps(&self, other: &DelayedAction) -> bool {
        !(self.end_ms() <= other.start_ms || other.end_ms() <= self.start_ms)
    }

    /// Whether inserting `other` supersedes `self`
    fn conflicts_with(&self, other: &DelayedAction) -> bool {
        self.key == other.key && (self == other || self.overlaps(other))
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub background: Color,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            background: Color::GRAY,
        }
    }
}

struct SchedulerState {
    colors: KeyMap<Color>,
    pending: Vec<DelayedAction>,
}

impl SchedulerState {
    fn insert(&mut self, action: DelayedAction) {
        let before = self.pending.len();
        self.pending.retain(|p| !p.conflicts_with(&action));
        let superseded = before - self.pending.len();
        if superseded > 0 {
            trace!(key = %action.key, superseded, "dropped overlapping actions");
        }
        self.pending.push(action);
    }

    fn cancel(&mut self, key: LogicalKey) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.key != key);
        before - self.pending.len()
    }

    /// Remove and return every action due at `now`, oldest first.
    ///
    /// Among actions starting on the same millisecond, instant ones run
    /// before fades so a fade scheduled for that moment is not overwritten.
    fn take_due(&mut self, now: i64) -> Vec<DelayedAction> {
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|a| a.start_ms <= now);
        self.pending = rest;
        due.sort_by_key(|a| (a.start_ms, a.fade_ms));
        due
    }
}

struct Shared {
    sink: Arc<dyn LightingSink>,
    clock: Arc<dyn Clock>,
    background: Color,
    state: Mutex<SchedulerState>,
}

impl Shared {
    fn write_effect(&self, key: LogicalKey, from: Color, to: Color, duration_ms: u32, repeat: bool) {
        debug!(%key, %from, %to, duration_ms, repeat, "key effect");
        if let Err(e) = self
            .sink
            .set_key_effect(key, from.to_pct(), to.to_pct(), duration_ms, repeat)
        {
            warn!(%key, error = %e, "failed to write key effect");
        }
    }

    fn transition(&self, state: &mut SchedulerState, now: i64, key: LogicalKey, color: Color, fade_ms: i32) {
        if fade_ms <= 0 {
            self.write_effect(key, color, color, IMMEDIATE_HOLD_MS, true);
        } else {
            let from = state.colors[key];
            if from != color {
                self.write_effect(key, from, color, fade_ms as u32, false);
                state.insert(DelayedAction {
                    start_ms: now + i64::from(fade_ms),
                    key,
                    color,
                    fade_ms: 0,
                });
            }
        }
        state.colors[key] = color;
    }

    fn schedule(&self, state: &mut SchedulerState, now: i64, key: LogicalKey, color: Color, delay_ms: i32, fade_ms: i32) {
        let action = DelayedAction {
            start_ms: (now + i64::from(delay_ms)).max(now),
            key,
            color,
            fade_ms: fade_ms.max(0),
        };
        debug!(%key, %color, start_ms = action.start_ms, fade_ms = action.fade_ms, "scheduled");
        state.insert(action);
    }

    fn tick(&self) {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        for action in state.take_due(now) {
            trace!(key = %action.key, start_ms = action.start_ms, now, "running action");
            self.transition(&mut state, now, action.key, action.color, action.fade_ms);
        }
    }
}

/// Per-key color state plus a queue of delayed transitions, applied by a
/// background tick thread.
pub struct LightingScheduler {
    shared: Arc<Shared>,
    worker: TickWorker,
}

impl LightingScheduler {
    /// Create a scheduler and paint every key with the background color.
    pub fn new(config: SchedulerConfig, sink: Arc<dyn LightingSink>, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(Shared {
            sink,
            clock,
            background: config.background,
            state: Mutex::new(SchedulerState {
                colors: KeyMap::filled(config.background),
                pending: Vec::new(),
            }),
        });
        {
            let now = shared.clock.now_ms();
            let mut state = shared.state.lock();
            for &key in LogicalKey::ALL {
                shared.transition(&mut state, now, key, config.background, 0);
            }
        }
        Self {
            shared,
            worker: TickWorker::new("keyglow-scheduler", config.interval),
        }
    }

    /// Scheduler on a [`MonotonicClock`]
    pub fn with_monotonic_clock(config: SchedulerConfig, sink: Arc<dyn LightingSink>) -> Self {
        Self::new(config, sink, Arc::new(MonotonicClock::new()))
    }

    pub fn background(&self) -> Color {
        self.shared.background
    }

    pub fn interval(&self) -> Duration {
        self.worker.interval()
    }

    /// Current time on the scheduler's clock
    pub fn now_ms(&self) -> i64 {
        self.shared.clock.now_ms()
    }

    /// Move `key` to `color`, instantly when `fade_ms <= 0` or as a hardware
    /// fade from the recorded color otherwise. The recorded color becomes
    /// `color` right away.
    pub fn transition(&self, key: LogicalKey, color: Color, fade_ms: i32) {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        self.shared.transition(&mut state, now, key, color, fade_ms);
    }

    /// Queue a transition starting `delay_ms` from now. Overlapping pending
    /// actions for the same key are dropped.
    pub fn schedule(&self, key: LogicalKey, color: Color, delay_ms: i32, fade_ms: i32) {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        self.shared.schedule(&mut state, now, key, color, delay_ms, fade_ms);
    }

    /// Replace everything pending for `key` with an `on`/`off` pulse shaped
    /// by `envelope`.
    pub fn flash(&self, key: LogicalKey, on: Color, off: Color, envelope: Envelope) {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        state.cancel(key);
        self.shared
            .schedule(&mut state, now, key, on, envelope.delay_ms, envelope.fade_in_ms);
        self.shared
            .schedule(&mut state, now, key, off, envelope.off_offset_ms(), envelope.fade_out_ms);
    }

    pub fn flash_to_background(&self, key: LogicalKey, on: Color, envelope: Envelope) {
        self.flash(key, on, self.shared.background, envelope);
    }

    /// Drop pending actions for `key`. The recorded color and any fade
    /// already running on the device are left alone.
    pub fn cancel_pending(&self, key: LogicalKey) {
        let removed = self.shared.state.lock().cancel(key);
        if removed > 0 {
            debug!(%key, removed, "cancelled pending actions");
        }
    }

    /// Start a two-color effect directly on the sink and record `to`.
    pub fn pulse(&self, key: LogicalKey, from: Color, to: Color, duration_ms: u32, repeat_forever: bool) {
        let mut state = self.shared.state.lock();
        self.shared.write_effect(key, from, to, duration_ms, repeat_forever);
        state.colors[key] = to;
    }

    /// Push a full bitmap to the sink. Recorded colors are not touched.
    pub fn set_full_frame(&self, grid: &ColorGrid) {
        if let Err(e) = self.shared.sink.set_frame(&grid.to_frame()) {
            warn!(error = %e, "failed to write frame");
        }
    }

    /// Clear hardware-resident effects so bitmap frames show through
    pub fn stop_persistent_effects(&self) {
        debug!("stopping persistent effects");
        if let Err(e) = self.shared.sink.stop_all_effects() {
            warn!(error = %e, "failed to stop effects");
        }
    }

    pub fn recorded_color(&self, key: LogicalKey) -> Color {
        self.shared.state.lock().colors[key]
    }

    /// Snapshot of every recorded color
    pub fn recorded_colors(&self) -> KeyMap<Color> {
        self.shared.state.lock().colors.clone()
    }

    /// Pending actions for `key`, in insertion order
    pub fn pending_for(&self, key: LogicalKey) -> Vec<DelayedAction> {
        self.shared
            .state
            .lock()
            .pending
            .iter()
            .filter(|a| a.key == key)
            .copied()
            .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Run one tick on the calling thread
    pub fn tick(&self) {
        self.shared.tick();
    }

    /// Start the tick thread
    pub fn start(&self) -> Result<()> {
        let shared = Arc::clone(&self.shared);
        if self.worker.start(move || shared.tick())? {
            info!(interval_ms = self.interval().as_millis() as u64, "scheduler started");
        }
        Ok(())
    }

    /// Ask the tick thread to exit. Returns without waiting.
    pub fn stop(&self) {
        if self.worker.is_running() {
            info!("scheduler stopping");
        }
        self.worker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }
}
