//! Effect driver: runs one lighting strategy
//!
//! The driver owns a [`LightingScheduler`], an optional [`KeyStateDetector`]
//! and one [`Effect`]. Its own tick thread drains key events from the
//! detector and calls the effect's hooks, so effects never see concurrent
//! calls.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use keyglow_device::LogicalKey;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::Result;
use crate::input::{KeyEvent, KeyStateDetector, KeyStateSource, TriggerTable};
use crate::scheduler::{LightingScheduler, DEFAULT_INTERVAL_MS};
use crate::worker::TickWorker;

/// A lighting strategy.
///
/// All hooks run on the driver thread. Time arguments are milliseconds;
/// `total_ms` counts from the driver's start and the first tick has
/// `delta_ms == 0`.
pub trait Effect: Send {
    /// Short identifier, as used in config files
    fn name(&self) -> &'static str;

    /// Whether the driver should run a key detector for this effect
    fn wants_key_events(&self) -> bool {
        false
    }

    /// Called on the starting thread before the first tick
    fn on_start(&mut self, _scheduler: &LightingScheduler) {}

    fn on_tick(&mut self, _scheduler: &LightingScheduler, _total_ms: i64, _delta_ms: i64) {}

    fn on_key_down(&mut self, _scheduler: &LightingScheduler, _key: LogicalKey) {}

    fn on_key_up(&mut self, _scheduler: &LightingScheduler, _key: LogicalKey) {}
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Driver tick interval
    pub interval: Duration,
    /// Key detector poll interval
    pub detector_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            detector_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
        }
    }
}

struct DriverCore {
    effect: Box<dyn Effect>,
    scheduler: Arc<LightingScheduler>,
    events: Option<Receiver<KeyEvent>>,
    started_at: Option<i64>,
    last_tick: Option<i64>,
}

impl DriverCore {
    fn tick(&mut self) {
        let now = self.scheduler.now_ms();
        let started_at = *self.started_at.get_or_insert(now);
        let delta = self.last_tick.map_or(0, |last| now - last);
        self.last_tick = Some(now);

        if let Some(events) = &self.events {
            for event in events.try_iter() {
                match event {
                    KeyEvent::Down(key) => self.effect.on_key_down(&self.scheduler, key),
                    KeyEvent::Up(key) => self.effect.on_key_up(&self.scheduler, key),
                }
            }
        }
        self.effect.on_tick(&self.scheduler, now - started_at, delta);
    }
}

/// Runs an [`Effect`] against a scheduler on a fixed-interval thread
pub struct EffectDriver {
    config: DriverConfig,
    scheduler: Arc<LightingScheduler>,
    detector: Option<KeyStateDetector>,
    core: Arc<Mutex<DriverCore>>,
    worker: TickWorker,
}

impl EffectDriver {
    pub fn new(effect: Box<dyn Effect>, scheduler: LightingScheduler, config: DriverConfig) -> Self {
        let scheduler = Arc::new(scheduler);
        let worker = TickWorker::new("keyglow-driver", config.interval);
        Self {
            config,
            scheduler: Arc::clone(&scheduler),
            detector: None,
            core: Arc::new(Mutex::new(DriverCore {
                effect,
                scheduler,
                events: None,
                started_at: None,
                last_tick: None,
            })),
            worker,
        }
    }

    /// Attach a key-state source. Ignored for effects that take no key input.
    pub fn with_key_source(mut self, table: Arc<TriggerTable>, source: Box<dyn KeyStateSource>) -> Self {
        let mut core = self.core.lock();
        if !core.effect.wants_key_events() {
            debug!(effect = core.effect.name(), "effect takes no key input, source dropped");
            drop(core);
            return self;
        }
        let (tx, rx) = mpsc::channel();
        core.events = Some(rx);
        drop(core);
        self.detector = Some(KeyStateDetector::new(table, source, tx, self.config.detector_interval));
        self
    }

    pub fn scheduler(&self) -> &Arc<LightingScheduler> {
        &self.scheduler
    }

    pub fn detector(&self) -> Option<&KeyStateDetector> {
        self.detector.as_ref()
    }

    pub fn effect_name(&self) -> &'static str {
        self.core.lock().effect.name()
    }

    /// Run one driver tick on the calling thread
    pub fn tick(&self) {
        self.core.lock().tick();
    }

    /// Start the scheduler, the detector and the driver thread
    ///
    /// No-op while running. After [`stop`](Self::stop) it restarts every
    /// thread, waiting for the old ones to exit.
    pub fn start(&self) -> Result<()> {
        if self.worker.is_running() && !self.worker.is_stopping() {
            return Ok(());
        }
        self.scheduler.start()?;
        if let Some(detector) = &self.detector {
            detector.start()?;
        }
        {
            let mut core = self.core.lock();
            core.started_at = None;
            core.last_tick = None;
            let DriverCore { effect, scheduler, .. } = &mut *core;
            effect.on_start(scheduler);
        }
        let core = Arc::clone(&self.core);
        if self.worker.start(move || core.lock().tick())? {
            info!(effect = self.effect_name(), "effect driver started");
        }
        Ok(())
    }

    /// Ask every thread to exit. Returns without waiting.
    pub fn stop(&self) {
        if self.worker.is_running() {
            info!(effect = self.effect_name(), "effect driver stopping");
        }
        self.worker.stop();
        self.scheduler.stop();
        if let Some(detector) = &self.detector {
            detector.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }
}

impl Drop for EffectDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::color::Color;
    use crate::input::StaticKeyState;
    use crate::scheduler::SchedulerConfig;
    use keyglow_device::RecordingSink;

    #[derive(Default, Clone)]
    struct Log(Arc<Mutex<Vec<String>>>);

    struct Probe {
        log: Log,
        keys: bool,
    }

    impl Effect for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn wants_key_events(&self) -> bool {
            self.keys
        }

        fn on_start(&mut self, _: &LightingScheduler) {
            self.log.0.lock().push("start".into());
        }

        fn on_tick(&mut self, _: &LightingScheduler, total_ms: i64, delta_ms: i64) {
            self.log.0.lock().push(format!("tick {total_ms} {delta_ms}"));
        }

        fn on_key_down(&mut self, sched: &LightingScheduler, key: LogicalKey) {
            sched.transition(key, Color::WHITE, 0);
            self.log.0.lock().push(format!("down {key}"));
        }

        fn on_key_up(&mut self, _: &LightingScheduler, key: LogicalKey) {
            self.log.0.lock().push(format!("up {key}"));
        }
    }

    fn make_driver(keys: bool) -> (EffectDriver, Log, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(10_000));
        let sched = LightingScheduler::new(SchedulerConfig::default(), Arc::new(RecordingSink::new()), clock.clone());
        let log = Log::default();
        let effect = Box::new(Probe { log: log.clone(), keys });
        (EffectDriver::new(effect, sched, DriverConfig::default()), log, clock)
    }

    #[test]
    fn test_tick_timing_from_start() {
        let (driver, log, clock) = make_driver(false);
        driver.tick();
        clock.advance(25);
        driver.tick();
        clock.advance(30);
        driver.tick();
        assert_eq!(*log.0.lock(), vec!["tick 0 0", "tick 25 25", "tick 55 30"]);
    }

    #[test]
    fn test_detector_only_for_key_effects() {
        let (driver, _, _) = make_driver(false);
        let driver = driver.with_key_source(TriggerTable::reference(), Box::new(StaticKeyState::new()));
        assert!(driver.detector().is_none());

        let (driver, _, _) = make_driver(true);
        let driver = driver.with_key_source(TriggerTable::reference(), Box::new(StaticKeyState::new()));
        assert!(driver.detector().is_some());
    }

    #[test]
    fn test_key_events_forwarded_on_tick() {
        let (driver, log, _) = make_driver(true);
        let keys = StaticKeyState::new();
        let driver = driver.with_key_source(TriggerTable::reference(), Box::new(keys.clone()));
        let detector = driver.detector().unwrap();

        keys.press(&[27]);
        detector.poll();
        keys.release_all();
        detector.poll();
        driver.tick();

        assert_eq!(*log.0.lock(), vec!["down Esc", "up Esc", "tick 0 0"]);
        assert_eq!(driver.scheduler().recorded_color(LogicalKey::Esc), Color::WHITE);
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let (driver, log, _) = make_driver(false);
        driver.start().unwrap();
        assert!(driver.is_running());
        assert!(driver.scheduler().is_running());
        std::thread::sleep(Duration::from_millis(60));
        driver.stop();
        driver.stop();
        std::thread::sleep(Duration::from_millis(100));
        assert!(!driver.is_running());
        assert!(!driver.scheduler().is_running());
        let log = log.0.lock();
        assert_eq!(log[0], "start");
        assert!(log.len() > 1);
    }

    #[test]
    fn test_restart_right_after_stop() {
        let (driver, log, _) = make_driver(true);
        let driver = driver.with_key_source(TriggerTable::reference(), Box::new(StaticKeyState::new()));
        driver.start().unwrap();
        driver.stop();
        driver.start().unwrap();
        std::thread::sleep(Duration::from_millis(200));

        assert!(driver.is_running());
        assert!(driver.scheduler().is_running());
        assert!(driver.detector().unwrap().is_running());
        let starts = log.0.lock().iter().filter(|l| *l == "start").count();
        assert_eq!(starts, 2);

        driver.stop();
    }
}
