//! In-memory keyboard that reproduces per-key lighting API semantics.
//!
//! The model follows the behaviour observed on vendor lighting SDKs:
//!
//! - each key carries at most one registered two-color effect; a new effect
//!   replaces the old one
//! - a repeating effect ping-pongs between its colors until replaced
//! - a non-repeating effect expires once its fade completes and the key falls
//!   back to its *base* color: the last written frame if any, otherwise the
//!   color the key had before the process took control
//! - `stop_all_effects` drops every registered effect
//!
//! Rendering is pull-based: callers ask for the displayed color at an instant.

use std::time::{Duration, Instant};

use keyframe::functions::EaseInOut;
use keyframe::EasingFunction;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::SinkError;
use crate::frame::Frame;
use crate::keys::{KeyMap, LogicalKey};
use crate::types::PctRgb;
use crate::LightingSink;

/// Interpolation curve for fades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeCurve {
    #[default]
    Linear,
    EaseInOut,
}

impl FadeCurve {
    fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => t,
            FadeCurve::EaseInOut => EaseInOut.y(t),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct KeyEffect {
    from: (u8, u8, u8),
    to: (u8, u8, u8),
    duration: Duration,
    repeat: bool,
    started: Instant,
}

impl KeyEffect {
    /// Color at `at`, or `None` once a one-shot effect has expired
    fn sample(&self, at: Instant, curve: FadeCurve) -> Option<(u8, u8, u8)> {
        let elapsed = at.saturating_duration_since(self.started);
        if self.duration.is_zero() {
            return (self.repeat).then_some(self.to);
        }
        let dur = self.duration.as_secs_f64();
        let secs = elapsed.as_secs_f64();

        let t = if self.repeat {
            let phase = secs % (2.0 * dur);
            if phase < dur {
                phase / dur
            } else {
                2.0 - phase / dur
            }
        } else if elapsed >= self.duration {
            return None;
        } else {
            secs / dur
        };

        Some(lerp(self.from, self.to, curve.apply(t)))
    }
}

fn lerp(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

struct EmulatorState {
    effects: KeyMap<Option<KeyEffect>>,
    frame: Option<Frame>,
}

/// Software stand-in for a per-key RGB keyboard
pub struct EmulatedKeyboard {
    startup: KeyMap<(u8, u8, u8)>,
    curve: FadeCurve,
    state: Mutex<EmulatorState>,
}

impl Default for EmulatedKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatedKeyboard {
    /// Emulator whose keys start dark
    pub fn new() -> Self {
        Self::with_startup_color((0, 0, 0))
    }

    /// Emulator whose keys show `rgb` before any effect is registered
    pub fn with_startup_color(rgb: (u8, u8, u8)) -> Self {
        Self {
            startup: KeyMap::filled(rgb),
            curve: FadeCurve::default(),
            state: Mutex::new(EmulatorState {
                effects: KeyMap::default(),
                frame: None,
            }),
        }
    }

    /// Use a different fade curve
    pub fn with_curve(mut self, curve: FadeCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Whether `key` has a live effect at `at`
    pub fn has_live_effect(&self, key: LogicalKey, at: Instant) -> bool {
        self.effect_color_at(key, at).is_some()
    }

    /// Color contributed by the key's registered effect, if still live
    pub fn effect_color_at(&self, key: LogicalKey, at: Instant) -> Option<(u8, u8, u8)> {
        let state = self.state.lock();
        state.effects[key].and_then(|fx| fx.sample(at, self.curve))
    }

    /// Displayed color of `key` at `at`.
    ///
    /// `frame_pos` locates the key in the bitmap; when `None` the frame layer
    /// is not consulted for this key.
    pub fn displayed_at(
        &self,
        key: LogicalKey,
        frame_pos: Option<(usize, usize)>,
        at: Instant,
    ) -> (u8, u8, u8) {
        let state = self.state.lock();
        if let Some(rgb) = state.effects[key].and_then(|fx| fx.sample(at, self.curve)) {
            return rgb;
        }
        frame_pos
            .and_then(|(x, y)| state.frame.as_ref().and_then(|f| f.get(x, y)))
            .unwrap_or(self.startup[key])
    }

    /// Displayed color of `key` right now
    pub fn displayed(&self, key: LogicalKey, frame_pos: Option<(usize, usize)>) -> (u8, u8, u8) {
        self.displayed_at(key, frame_pos, Instant::now())
    }

    /// Last frame written, if any
    pub fn frame(&self) -> Option<Frame> {
        self.state.lock().frame.clone()
    }
}

impl LightingSink for EmulatedKeyboard {
    fn set_key_effect(
        &self,
        key: LogicalKey,
        from: PctRgb,
        to: PctRgb,
        duration_ms: u32,
        repeat_forever: bool,
    ) -> Result<(), SinkError> {
        trace!(%key, ?from, ?to, duration_ms, repeat_forever, "emulator effect");
        let mut state = self.state.lock();
        state.effects[key] = Some(KeyEffect {
            from: from.to_rgb8(),
            to: to.to_rgb8(),
            duration: Duration::from_millis(duration_ms as u64),
            repeat: repeat_forever,
            started: Instant::now(),
        });
        Ok(())
    }

    fn set_frame(&self, frame: &Frame) -> Result<(), SinkError> {
        self.state.lock().frame = Some(frame.clone());
        Ok(())
    }

    fn stop_all_effects(&self) -> Result<(), SinkError> {
        trace!("emulator stop all effects");
        let mut state = self.state.lock();
        for fx in state.effects.values_mut() {
            *fx = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: PctRgb = PctRgb { r: 100, g: 0, b: 0 };
    const BLUE: PctRgb = PctRgb { r: 0, g: 0, b: 100 };

    #[test]
    fn test_startup_color_without_effects() {
        let kb = EmulatedKeyboard::with_startup_color((1, 2, 3));
        assert_eq!(kb.displayed(LogicalKey::A, None), (1, 2, 3));
    }

    #[test]
    fn test_persistent_symmetric_pulse_holds_color() {
        let kb = EmulatedKeyboard::new();
        kb.set_key_effect(LogicalKey::A, RED, RED, 10_000, true).unwrap();
        let later = Instant::now() + Duration::from_secs(60);
        assert_eq!(kb.displayed_at(LogicalKey::A, None, later), (255, 0, 0));
    }

    #[test]
    fn test_one_shot_fade_reverts_to_startup_on_expiry() {
        let kb = EmulatedKeyboard::with_startup_color((9, 9, 9));
        kb.set_key_effect(LogicalKey::A, RED, BLUE, 100, false).unwrap();
        let now = Instant::now();
        let mid = kb.displayed_at(LogicalKey::A, None, now + Duration::from_millis(50));
        assert!(mid.0 > 0 && mid.2 > 0, "mid-fade should mix: {mid:?}");
        let after = kb.displayed_at(LogicalKey::A, None, now + Duration::from_millis(500));
        assert_eq!(after, (9, 9, 9));
    }

    #[test]
    fn test_frame_is_base_layer() {
        let kb = EmulatedKeyboard::new();
        let mut frame = Frame::new();
        frame.set(3, 2, 0, 255, 0);
        kb.set_frame(&frame).unwrap();
        assert_eq!(kb.displayed(LogicalKey::A, Some((3, 2))), (0, 255, 0));

        kb.set_key_effect(LogicalKey::A, RED, RED, 10_000, true).unwrap();
        assert_eq!(kb.displayed(LogicalKey::A, Some((3, 2))), (255, 0, 0));

        kb.stop_all_effects().unwrap();
        assert_eq!(kb.displayed(LogicalKey::A, Some((3, 2))), (0, 255, 0));
    }

    #[test]
    fn test_repeat_ping_pongs() {
        let kb = EmulatedKeyboard::new();
        kb.set_key_effect(LogicalKey::B, RED, BLUE, 1000, true).unwrap();
        let at = Instant::now() + Duration::from_millis(1990);
        let rgb = kb.displayed_at(LogicalKey::B, None, at);
        assert!(rgb.0 > 240, "should be back near the start color: {rgb:?}");
    }

    #[test]
    fn test_ease_in_out_curve_endpoints() {
        assert!(FadeCurve::EaseInOut.apply(0.0).abs() < 1e-6);
        assert!((FadeCurve::EaseInOut.apply(1.0) - 1.0).abs() < 1e-6);
        assert_eq!(FadeCurve::Linear.apply(2.0), 1.0);
    }
}
