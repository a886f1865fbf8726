//! Slow ambient wave drawn as full frames
//!
//! Rows of hues oscillate around `hue_center`. Four slow sine terms drift
//! the offset, wavelength, row skew and row step so the pattern never quite
//! repeats.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::driver::Effect;
use crate::grid::ColorGrid;
use crate::scheduler::LightingScheduler;

/// Periods of the drift terms, in wave time units (8 ms each)
const OFFSET_PERIOD: f32 = 7890.0;
const WAVELENGTH_PERIOD: f32 = 8901.0;
const SKEW_PERIOD: f32 = 5678.0;
const STEP_PERIOD: f32 = 6789.0;
const WAVE_TIME_DIV_MS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainbowConfig {
    /// Hue the wave oscillates around, degrees
    pub hue_center: f32,
    /// Peak-to-peak hue swing, degrees
    pub hue_range: f32,
}

impl Default for RainbowConfig {
    fn default() -> Self {
        Self {
            hue_center: 0.0,
            hue_range: 90.0,
        }
    }
}

pub struct Rainbow {
    config: RainbowConfig,
}

impl Rainbow {
    pub fn new(config: RainbowConfig) -> Self {
        Self { config }
    }

    /// The frame shown `total_ms` after start
    pub fn frame_at(&self, total_ms: i64) -> ColorGrid {
        let t = (total_ms / WAVE_TIME_DIV_MS) as f32;
        let offset = (t * TAU / OFFSET_PERIOD).sin() * 3.0;
        let wavelength = 18.0 + (t * TAU / WAVELENGTH_PERIOD).sin() * 6.0;
        let skew = (t * TAU / SKEW_PERIOD).sin() / 3.0;
        let step = (t * TAU / STEP_PERIOD).sin() / 3.0;

        let RainbowConfig { hue_center, hue_range } = self.config;
        ColorGrid::from_fn(|x, y| {
            let row_phase = (y as f32).sin() * skew + offset + y as f32 * step;
            let phase = row_phase + x as f32 * TAU / wavelength;
            Color::from_hsb(hue_center + phase.sin() * hue_range / 2.0, 1.0, 1.0)
        })
    }
}

impl Effect for Rainbow {
    fn name(&self) -> &'static str {
        "rainbow"
    }

    fn on_start(&mut self, scheduler: &LightingScheduler) {
        // per-key effects would cover the frames
        scheduler.stop_persistent_effects();
    }

    fn on_tick(&mut self, scheduler: &LightingScheduler, total_ms: i64, _delta_ms: i64) {
        scheduler.set_full_frame(&self.frame_at(total_ms));
    }
}
