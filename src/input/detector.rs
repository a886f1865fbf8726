//! Edge-triggered key detection

use std::collections::BTreeSet;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use keyglow_device::LogicalKey;
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use super::triggers::TriggerTable;
use super::{KeyEvent, KeyStateSource};
use crate::error::Result;
use crate::worker::TickWorker;

/// Pressed-set bookkeeping. Feed it the down codes of each poll and it
/// returns what changed.
#[derive(Debug)]
pub struct KeyTracker {
    table: Arc<TriggerTable>,
    pressed: BTreeSet<LogicalKey>,
}

impl KeyTracker {
    pub fn new(table: Arc<TriggerTable>) -> Self {
        Self {
            table,
            pressed: BTreeSet::new(),
        }
    }

    pub fn table(&self) -> &TriggerTable {
        &self.table
    }

    pub fn pressed(&self) -> &BTreeSet<LogicalKey> {
        &self.pressed
    }

    /// Returns the edges since the previous update: every `Up` first, then
    /// every `Down`, each group in key order. A chord that changes which key
    /// it resolves to (Ctrl growing into Right Alt) thus reads as a release
    /// followed by a press.
    pub fn update(&mut self, down: &BTreeSet<u8>) -> Vec<KeyEvent> {
        let now = self.table.resolve(down);
        let mut events: Vec<KeyEvent> = self.pressed.difference(&now).map(|&k| KeyEvent::Up(k)).collect();
        events.extend(now.difference(&self.pressed).map(|&k| KeyEvent::Down(k)));
        self.pressed = now;
        events
    }
}

struct DetectorState {
    source: Box<dyn KeyStateSource>,
    tracker: KeyTracker,
    events: Sender<KeyEvent>,
}

impl DetectorState {
    fn poll(&mut self) {
        self.source.begin_poll();
        let down: BTreeSet<u8> = (0..=u8::MAX).filter(|&c| self.source.is_down(c)).collect();
        for event in self.tracker.update(&down) {
            trace!(?event, "key edge");
            if self.events.send(event).is_err() {
                debug!("key event receiver gone");
                break;
            }
        }
    }
}

/// Polls a [`KeyStateSource`] on its own thread and sends [`KeyEvent`]s
/// down a channel.
pub struct KeyStateDetector {
    state: Arc<Mutex<DetectorState>>,
    worker: TickWorker,
}

impl KeyStateDetector {
    pub fn new(
        table: Arc<TriggerTable>,
        source: Box<dyn KeyStateSource>,
        events: Sender<KeyEvent>,
        interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(DetectorState {
                source,
                tracker: KeyTracker::new(table),
                events,
            })),
            worker: TickWorker::new("keyglow-detector", interval),
        }
    }

    /// Run one poll sweep on the calling thread
    pub fn poll(&self) {
        self.state.lock().poll();
    }

    /// Keys currently held, as of the last poll
    pub fn pressed(&self) -> Vec<LogicalKey> {
        self.state.lock().tracker.pressed().iter().copied().collect()
    }

    pub fn start(&self) -> Result<()> {
        let state = Arc::clone(&self.state);
        if self.worker.start(move || state.lock().poll())? {
            info!(interval_ms = self.worker.interval().as_millis() as u64, "key detector started");
        }
        Ok(())
    }

    pub fn stop(&self) {
        if self.worker.is_running() {
            info!("key detector stopping");
        }
        self.worker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StaticKeyState;
    use std::sync::mpsc;

    fn codes(c: &[u8]) -> BTreeSet<u8> {
        c.iter().copied().collect()
    }

    #[test]
    fn test_tracker_edges() {
        let mut tracker = KeyTracker::new(TriggerTable::reference());
        assert_eq!(tracker.update(&codes(&[27])), vec![KeyEvent::Down(LogicalKey::Esc)]);
        // held: no repeat
        assert!(tracker.update(&codes(&[27])).is_empty());
        assert_eq!(
            tracker.update(&codes(&[32])),
            vec![KeyEvent::Up(LogicalKey::Esc), KeyEvent::Down(LogicalKey::Space)]
        );
        assert_eq!(tracker.update(&codes(&[])), vec![KeyEvent::Up(LogicalKey::Space)]);
    }

    #[test]
    fn test_tracker_altgr_transition() {
        let mut tracker = KeyTracker::new(TriggerTable::reference());
        // Ctrl part of the chord arrives first
        assert_eq!(
            tracker.update(&codes(&[17, 162])),
            vec![KeyEvent::Down(LogicalKey::LeftCtrl)]
        );
        assert_eq!(
            tracker.update(&codes(&[17, 18, 162, 165])),
            vec![KeyEvent::Up(LogicalKey::LeftCtrl), KeyEvent::Down(LogicalKey::RightAlt)]
        );
    }

    #[test]
    fn test_detector_poll_sends_events() {
        let state = StaticKeyState::new();
        let (tx, rx) = mpsc::channel();
        let detector = KeyStateDetector::new(
            TriggerTable::reference(),
            Box::new(state.clone()),
            tx,
            Duration::from_millis(5),
        );

        state.press(&[17, 18, 162, 165]);
        detector.poll();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![KeyEvent::Down(LogicalKey::RightAlt)]);
        assert_eq!(detector.pressed(), vec![LogicalKey::RightAlt]);

        state.release_all();
        detector.poll();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![KeyEvent::Up(LogicalKey::RightAlt)]);
    }

    #[test]
    fn test_detector_thread() {
        let state = StaticKeyState::new();
        let (tx, rx) = mpsc::channel();
        let detector = KeyStateDetector::new(
            TriggerTable::reference(),
            Box::new(state.clone()),
            tx,
            Duration::from_millis(2),
        );
        detector.start().unwrap();
        state.press(&[13]);
        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(ev, KeyEvent::Down(LogicalKey::Enter));
        detector.stop();
        std::thread::sleep(Duration::from_millis(50));
        assert!(!detector.is_running());
    }
}
