//! LoggingSink middleware for tracing sink traffic
//!
//! Wraps any [`LightingSink`] and emits a `tracing` event for every call and
//! every failure before handing the result back.
//!
//! ```ignore
//! let sink = LoggingSink::wrap(EmulatedKeyboard::new());
//! ```

use tracing::{debug, warn};

use crate::error::SinkError;
use crate::frame::Frame;
use crate::keys::LogicalKey;
use crate::types::PctRgb;
use crate::LightingSink;

/// Sink middleware that traces all calls
pub struct LoggingSink<S> {
    inner: S,
}

impl<S: LightingSink> LoggingSink<S> {
    pub fn wrap(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn report(op: &'static str, result: Result<(), SinkError>) -> Result<(), SinkError> {
        if let Err(e) = &result {
            warn!(op, error = %e, "sink call failed");
        }
        result
    }
}

impl<S: LightingSink> LightingSink for LoggingSink<S> {
    fn set_key_effect(
        &self,
        key: LogicalKey,
        from: PctRgb,
        to: PctRgb,
        duration_ms: u32,
        repeat_forever: bool,
    ) -> Result<(), SinkError> {
        if from == to {
            debug!(%key, color = ?to, duration_ms, repeat_forever, "key effect");
        } else {
            debug!(%key, ?from, ?to, duration_ms, repeat_forever, "key effect");
        }
        Self::report(
            "set_key_effect",
            self.inner
                .set_key_effect(key, from, to, duration_ms, repeat_forever),
        )
    }

    fn set_frame(&self, frame: &Frame) -> Result<(), SinkError> {
        debug!(bytes = frame.as_bytes().len(), "frame");
        Self::report("set_frame", self.inner.set_frame(frame))
    }

    fn stop_all_effects(&self) -> Result<(), SinkError> {
        debug!("stop all effects");
        Self::report("stop_all_effects", self.inner.stop_all_effects())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingSink, SinkCall};

    #[test]
    fn test_forwards_calls_and_errors() {
        let sink = LoggingSink::wrap(RecordingSink::new());
        sink.stop_all_effects().unwrap();
        sink.inner().fail_next(1);
        assert!(sink.set_frame(&Frame::new()).is_err());
        assert_eq!(sink.inner().calls()[0], SinkCall::StopAllEffects);
        assert_eq!(sink.inner().len(), 2);
    }
}
