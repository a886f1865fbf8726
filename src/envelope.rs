//! Timing envelope for transient key highlights

use serde::{Deserialize, Serialize};

/// Delay, fade-in, stay and fade-out durations in milliseconds.
///
/// A pulse shaped by an envelope waits `delay_ms`, fades in over
/// `fade_in_ms`, holds for `stay_ms` and fades out over `fade_out_ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub delay_ms: i32,
    pub fade_in_ms: i32,
    #[serde(default)]
    pub stay_ms: i32,
    pub fade_out_ms: i32,
}

impl Envelope {
    pub const fn new(delay_ms: i32, fade_in_ms: i32, stay_ms: i32, fade_out_ms: i32) -> Self {
        Self {
            delay_ms,
            fade_in_ms,
            stay_ms,
            fade_out_ms,
        }
    }

    /// Same shape, shifted by `delay_ms`
    pub const fn delayed(self, delay_ms: i32) -> Self {
        Self { delay_ms, ..self }
    }

    /// Offset at which the fade-out starts
    pub const fn off_offset_ms(&self) -> i32 {
        self.delay_ms
            .saturating_add(self.fade_in_ms)
            .saturating_add(self.stay_ms)
    }

    /// Offset at which the pulse has fully faded out
    pub const fn total_ms(&self) -> i32 {
        self.off_offset_ms().saturating_add(self.fade_out_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let env = Envelope::new(50, 100, 200, 400);
        assert_eq!(env.off_offset_ms(), 350);
        assert_eq!(env.total_ms(), 750);
        assert_eq!(env.delayed(0).off_offset_ms(), 300);
    }

    #[test]
    fn test_deserialize_defaults() {
        let env: Envelope = toml::from_str("fade_in_ms = 10\nfade_out_ms = 20").unwrap();
        assert_eq!(env, Envelope::new(0, 10, 0, 20));
    }
}
