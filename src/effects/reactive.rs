//! Light each pressed key in a random color

use keyglow_device::LogicalKey;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::driver::Effect;
use crate::envelope::Envelope;
use crate::scheduler::LightingScheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveConfig {
    pub envelope: Envelope,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            envelope: Envelope::new(0, 100, 100, 3800),
        }
    }
}

pub struct Reactive {
    config: ReactiveConfig,
    rng: StdRng,
}

impl Reactive {
    pub fn new(config: ReactiveConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(config: ReactiveConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Effect for Reactive {
    fn name(&self) -> &'static str {
        "reactive"
    }

    fn wants_key_events(&self) -> bool {
        true
    }

    fn on_key_down(&mut self, scheduler: &LightingScheduler, key: LogicalKey) {
        let color = Color::random_hue(&mut self.rng, 1.0, 1.0);
        scheduler.flash_to_background(key, color, self.config.envelope);
    }
}
