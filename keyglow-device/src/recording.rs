//! Call-recording sink for tests and dry runs

use parking_lot::Mutex;

use crate::error::SinkError;
use crate::frame::Frame;
use crate::keys::LogicalKey;
use crate::types::PctRgb;
use crate::LightingSink;

/// One recorded sink call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    KeyEffect {
        key: LogicalKey,
        from: PctRgb,
        to: PctRgb,
        duration_ms: u32,
        repeat_forever: bool,
    },
    Frame(Frame),
    StopAllEffects,
}

/// Sink that records every call, with optional failure injection
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    fail_remaining: Mutex<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls fail with [`SinkError::Disconnected`].
    /// Failed calls are still recorded.
    pub fn fail_next(&self, n: usize) {
        *self.fail_remaining.lock() = n;
    }

    /// Snapshot of all recorded calls
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    /// Recorded calls addressed to `key`
    pub fn calls_for(&self, key: LogicalKey) -> Vec<SinkCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, SinkCall::KeyEffect { key: k, .. } if *k == key))
            .cloned()
            .collect()
    }

    /// Most recent key effect for `key`
    pub fn last_for(&self, key: LogicalKey) -> Option<SinkCall> {
        self.calls_for(key).pop()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: SinkCall) -> Result<(), SinkError> {
        self.calls.lock().push(call);
        let mut fail = self.fail_remaining.lock();
        if *fail > 0 {
            *fail -= 1;
            return Err(SinkError::Disconnected);
        }
        Ok(())
    }
}

impl LightingSink for RecordingSink {
    fn set_key_effect(
        &self,
        key: LogicalKey,
        from: PctRgb,
        to: PctRgb,
        duration_ms: u32,
        repeat_forever: bool,
    ) -> Result<(), SinkError> {
        self.record(SinkCall::KeyEffect {
            key,
            from,
            to,
            duration_ms,
            repeat_forever,
        })
    }

    fn set_frame(&self, frame: &Frame) -> Result<(), SinkError> {
        self.record(SinkCall::Frame(frame.clone()))
    }

    fn stop_all_effects(&self) -> Result<(), SinkError> {
        self.record(SinkCall::StopAllEffects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let sink = RecordingSink::new();
        sink.stop_all_effects().unwrap();
        sink.set_key_effect(LogicalKey::A, PctRgb::OFF, PctRgb::OFF, 5, false)
            .unwrap();
        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], SinkCall::StopAllEffects);
        assert!(sink.last_for(LogicalKey::A).is_some());
        assert!(sink.last_for(LogicalKey::B).is_none());
    }

    #[test]
    fn test_fail_next() {
        let sink = RecordingSink::new();
        sink.fail_next(1);
        assert!(sink.stop_all_effects().is_err());
        assert!(sink.stop_all_effects().is_ok());
        assert_eq!(sink.len(), 2);
    }
}
