//! End-to-end tests: key source -> detector -> effect -> scheduler -> sink

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use keyglow::effects::{Reactive, ReactiveConfig};
use keyglow::input::StaticKeyState;
use keyglow::{
    Color, DriverConfig, EffectDriver, Envelope, KeyEvent, KeyStateDetector, LightingScheduler, LogicalKey,
    ManualClock, SchedulerConfig, TriggerTable,
};
use keyglow_device::{EmulatedKeyboard, PctRgb, RecordingSink, SinkCall};

const GRAY: PctRgb = PctRgb { r: 50, g: 50, b: 50 };
const RED: PctRgb = PctRgb { r: 100, g: 0, b: 0 };

fn effect(key: LogicalKey, from: PctRgb, to: PctRgb, duration_ms: u32, repeat_forever: bool) -> SinkCall {
    SinkCall::KeyEffect {
        key,
        from,
        to,
        duration_ms,
        repeat_forever,
    }
}

fn manual_scheduler(start_ms: i64) -> (LightingScheduler, Arc<RecordingSink>, Arc<ManualClock>) {
    let sink = Arc::new(RecordingSink::new());
    let clock = Arc::new(ManualClock::new(start_ms));
    let sched = LightingScheduler::new(SchedulerConfig::default(), sink.clone(), clock.clone());
    (sched, sink, clock)
}

#[test]
fn test_flash_runs_through_to_background() {
    let (sched, sink, clock) = manual_scheduler(1_000);
    assert_eq!(sink.len(), LogicalKey::COUNT);
    sink.clear();

    sched.flash_to_background(LogicalKey::A, Color::RED, Envelope::new(0, 100, 100, 3800));
    for t in [1_000, 1_100, 1_200, 5_000] {
        clock.set(t);
        sched.tick();
    }

    assert_eq!(
        sink.calls_for(LogicalKey::A),
        vec![
            effect(LogicalKey::A, GRAY, RED, 100, false),
            effect(LogicalKey::A, RED, RED, 10_000, true),
            effect(LogicalKey::A, RED, GRAY, 3800, false),
            effect(LogicalKey::A, GRAY, GRAY, 10_000, true),
        ]
    );
    assert_eq!(sched.pending_len(), 0);
    assert_eq!(sched.recorded_color(LogicalKey::A), Color::GRAY);
}

#[test]
fn test_retrigger_replaces_pending_pulse() {
    let (sched, _, clock) = manual_scheduler(0);
    let env = Envelope::new(0, 100, 100, 3800);

    sched.flash_to_background(LogicalKey::S, Color::RED, env);
    clock.set(150);
    sched.flash_to_background(LogicalKey::S, Color::BLUE, env);

    let starts: Vec<i64> = sched.pending_for(LogicalKey::S).iter().map(|a| a.start_ms).collect();
    assert_eq!(starts, vec![150, 350]);
}

#[test]
fn test_detector_reports_edges_once() {
    let keys = StaticKeyState::new();
    let (tx, rx) = mpsc::channel();
    let detector = KeyStateDetector::new(
        TriggerTable::reference(),
        Box::new(keys.clone()),
        tx,
        Duration::from_millis(5),
    );

    // Right Alt reports Ctrl as well, which must not surface as LeftCtrl
    keys.press(&[17, 18, 162, 165]);
    detector.poll();
    detector.poll();
    keys.release_all();
    detector.poll();

    let events: Vec<KeyEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![KeyEvent::Down(LogicalKey::RightAlt), KeyEvent::Up(LogicalKey::RightAlt)]
    );
}

#[test]
fn test_reactive_key_press_lights_emulator() {
    let keyboard = Arc::new(EmulatedKeyboard::with_startup_color((128, 128, 128)));
    let clock = Arc::new(ManualClock::new(0));
    let sched = LightingScheduler::new(SchedulerConfig::default(), keyboard.clone(), clock.clone());
    let keys = StaticKeyState::new();
    let driver = EffectDriver::new(
        Box::new(Reactive::seeded(ReactiveConfig::default(), 7)),
        sched,
        DriverConfig::default(),
    )
    .with_key_source(TriggerTable::reference(), Box::new(keys.clone()));

    let detector = driver.detector().expect("reactive wants key events");
    keys.press(&[81]);
    detector.poll();
    driver.tick();
    driver.scheduler().tick();

    assert_ne!(driver.scheduler().recorded_color(LogicalKey::A), Color::GRAY);
    assert!(keyboard.has_live_effect(LogicalKey::A, Instant::now()));
    assert!(driver.scheduler().pending_for(LogicalKey::A).iter().any(|a| a.color == Color::GRAY));
}

#[test]
fn test_driver_stop_halts_threads() {
    let sink = Arc::new(RecordingSink::new());
    let sched = LightingScheduler::with_monotonic_clock(SchedulerConfig::default(), sink);
    let driver = EffectDriver::new(
        Box::new(Reactive::seeded(ReactiveConfig::default(), 1)),
        sched,
        DriverConfig::default(),
    )
    .with_key_source(TriggerTable::reference(), Box::new(StaticKeyState::new()));

    driver.start().unwrap();
    assert!(driver.is_running());
    assert!(driver.scheduler().is_running());

    driver.stop();
    driver.stop();
    thread::sleep(Duration::from_millis(200));
    assert!(!driver.is_running());
    assert!(!driver.scheduler().is_running());
    assert!(!driver.detector().unwrap().is_running());
}

#[test]
fn test_driver_restarts_after_stop() {
    let sink = Arc::new(RecordingSink::new());
    let sched = LightingScheduler::with_monotonic_clock(SchedulerConfig::default(), sink);
    let driver = EffectDriver::new(
        Box::new(Reactive::seeded(ReactiveConfig::default(), 2)),
        sched,
        DriverConfig::default(),
    )
    .with_key_source(TriggerTable::reference(), Box::new(StaticKeyState::new()));

    driver.start().unwrap();
    driver.stop();
    driver.start().unwrap();
    thread::sleep(Duration::from_millis(200));

    assert!(driver.is_running());
    assert!(driver.scheduler().is_running());
    assert!(driver.detector().unwrap().is_running());
    driver.stop();
}
