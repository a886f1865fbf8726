//! Every key pulsing between two colors of its own

use keyglow_device::LogicalKey;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::driver::Effect;
use crate::scheduler::LightingScheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub saturation: f32,
    pub brightness: f32,
    /// One-way fade duration
    pub fade_ms: u32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 1.0,
            fade_ms: 4000,
        }
    }
}

pub struct Pulse {
    config: PulseConfig,
    rng: StdRng,
}

impl Pulse {
    pub fn new(config: PulseConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(config: PulseConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Effect for Pulse {
    fn name(&self) -> &'static str {
        "pulse"
    }

    fn on_start(&mut self, scheduler: &LightingScheduler) {
        let PulseConfig {
            saturation,
            brightness,
            fade_ms,
        } = self.config;
        for &key in LogicalKey::ALL {
            let from = Color::random_hue(&mut self.rng, saturation, brightness);
            let to = Color::random_hue(&mut self.rng, saturation, brightness);
            scheduler.pulse(key, from, to, fade_ms, true);
        }
        debug!(keys = LogicalKey::COUNT, fade_ms, "pulses registered");
    }
}
