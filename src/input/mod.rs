//! Key-state input
//!
//! Hardware is polled through [`KeyStateSource`], one query per raw code per
//! tick. [`TriggerTable`] maps raw codes to [`LogicalKey`]s and
//! [`KeyStateDetector`] turns the polled state into discrete [`KeyEvent`]s.

mod boot;
mod detector;
#[cfg(feature = "hid")]
mod hid;
mod triggers;
mod typist;

pub use boot::{boot_report_keys, usage_to_key, BOOT_REPORT_LEN};
pub use detector::{KeyStateDetector, KeyTracker};
#[cfg(feature = "hid")]
pub use hid::HidKeySource;
pub use triggers::{TriggerTable, TriggerTableBuilder};
pub use typist::SimulatedTypist;

use std::sync::Arc;

use keyglow_device::LogicalKey;
use parking_lot::Mutex;

/// Edge event for one logical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Down(LogicalKey),
    Up(LogicalKey),
}

impl KeyEvent {
    pub fn key(&self) -> LogicalKey {
        match *self {
            KeyEvent::Down(k) | KeyEvent::Up(k) => k,
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self, KeyEvent::Down(_))
    }
}

/// Raw key-state provider.
///
/// Codes are 8-bit; the detector queries every code once per tick, after a
/// single [`begin_poll`](KeyStateSource::begin_poll).
pub trait KeyStateSource: Send {
    /// Refresh cached state before a sweep
    fn begin_poll(&mut self) {}

    fn is_down(&mut self, code: u8) -> bool;
}

impl<S: KeyStateSource + ?Sized> KeyStateSource for Box<S> {
    fn begin_poll(&mut self) {
        (**self).begin_poll()
    }

    fn is_down(&mut self, code: u8) -> bool {
        (**self).is_down(code)
    }
}

/// Shared, hand-driven key state. Clones see the same codes.
#[derive(Clone)]
pub struct StaticKeyState {
    down: Arc<Mutex<[bool; 256]>>,
}

impl Default for StaticKeyState {
    fn default() -> Self {
        Self {
            down: Arc::new(Mutex::new([false; 256])),
        }
    }
}

impl StaticKeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, codes: &[u8]) {
        let mut down = self.down.lock();
        for &c in codes {
            down[c as usize] = true;
        }
    }

    pub fn release(&self, codes: &[u8]) {
        let mut down = self.down.lock();
        for &c in codes {
            down[c as usize] = false;
        }
    }

    pub fn release_all(&self) {
        *self.down.lock() = [false; 256];
    }
}

impl KeyStateSource for StaticKeyState {
    fn is_down(&mut self, code: u8) -> bool {
        self.down.lock()[code as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_state_shared_between_clones() {
        let handle = StaticKeyState::new();
        let mut source = handle.clone();
        handle.press(&[17, 162]);
        assert!(source.is_down(17));
        assert!(source.is_down(162));
        handle.release(&[17]);
        assert!(!source.is_down(17));
        handle.release_all();
        assert!(!source.is_down(162));
    }

    #[test]
    fn test_event_accessors() {
        let ev = KeyEvent::Up(LogicalKey::Space);
        assert_eq!(ev.key(), LogicalKey::Space);
        assert!(!ev.is_down());
    }
}
