//! Device abstraction layer for per-key RGB keyboards
//!
//! This crate defines what the lighting engine needs from the hardware:
//!
//! - [`LogicalKey`]: the closed set of physical key positions
//! - [`LightingSink`]: the three primitives a lighting backend must offer
//! - [`Frame`]: the full-surface bitmap accepted by [`LightingSink::set_frame`]
//!
//! It also ships backends that need no hardware: [`EmulatedKeyboard`] models
//! the effect semantics of a real per-key lighting API, [`RecordingSink`]
//! captures calls for tests and [`LoggingSink`] traces every call.

pub mod emulator;
pub mod error;
pub mod frame;
pub mod keys;
pub mod logging;
pub mod recording;
pub mod types;

pub use emulator::{EmulatedKeyboard, FadeCurve};
pub use error::SinkError;
pub use frame::{Frame, FRAME_HEIGHT, FRAME_LEN, FRAME_WIDTH};
pub use keys::{KeyMap, LogicalKey, ParseKeyError};
pub use logging::LoggingSink;
pub use recording::{RecordingSink, SinkCall};
pub use types::{pct, PctRgb};

use std::sync::Arc;

/// A per-key lighting backend.
///
/// Colors are passed as percentages (0-100 per channel). Implementations are
/// called from the scheduler's tick thread and from caller threads, and are
/// expected to return quickly.
pub trait LightingSink: Send + Sync {
    /// Register a two-color fade on a single key.
    ///
    /// The key fades from `from` to `to` over `duration_ms`. With
    /// `repeat_forever` the effect keeps cycling and stays registered until
    /// replaced; otherwise it expires once the fade completes.
    fn set_key_effect(
        &self,
        key: LogicalKey,
        from: PctRgb,
        to: PctRgb,
        duration_ms: u32,
        repeat_forever: bool,
    ) -> Result<(), SinkError>;

    /// Write a full-surface bitmap.
    fn set_frame(&self, frame: &Frame) -> Result<(), SinkError>;

    /// Clear every hardware-resident effect.
    fn stop_all_effects(&self) -> Result<(), SinkError>;
}

impl<S: LightingSink + ?Sized> LightingSink for Arc<S> {
    fn set_key_effect(
        &self,
        key: LogicalKey,
        from: PctRgb,
        to: PctRgb,
        duration_ms: u32,
        repeat_forever: bool,
    ) -> Result<(), SinkError> {
        (**self).set_key_effect(key, from, to, duration_ms, repeat_forever)
    }

    fn set_frame(&self, frame: &Frame) -> Result<(), SinkError> {
        (**self).set_frame(frame)
    }

    fn stop_all_effects(&self) -> Result<(), SinkError> {
        (**self).stop_all_effects()
    }
}
