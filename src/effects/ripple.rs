//! Rings of light around pressed keys

use keyglow_device::LogicalKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::driver::Effect;
use crate::envelope::Envelope;
use crate::layout::KeyMatrix;
use crate::scheduler::LightingScheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    /// Number of rings around the key
    pub rings: u32,
    /// Delay added per ring
    pub ring_delay_ms: i32,
    /// Maximum random hue offset per ring key, degrees
    pub hue_jitter: i32,
    pub envelope: Envelope,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            rings: 1,
            ring_delay_ms: 50,
            hue_jitter: 30,
            envelope: Envelope::new(0, 150, 400, 850),
        }
    }
}

/// Bounding box of a key in matrix cells, inclusive
#[derive(Debug, Clone, Copy)]
struct Bounds {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

impl Bounds {
    fn of(positions: &[(usize, usize)]) -> Option<Self> {
        let xs = positions.iter().map(|&(x, _)| x as i32);
        let ys = positions.iter().map(|&(_, y)| y as i32);
        Some(Self {
            left: xs.clone().min()?,
            right: xs.max()?,
            top: ys.clone().min()?,
            bottom: ys.max()?,
        })
    }

    fn grow(self, by: i32) -> Self {
        Self {
            left: self.left - by,
            right: self.right + by,
            top: self.top - by,
            bottom: self.bottom + by,
        }
    }

    /// Cells on the border, corners excluded
    fn border(self) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        for y in self.top + 1..self.bottom {
            cells.push((self.left, y));
            cells.push((self.right, y));
        }
        for x in self.left + 1..self.right {
            cells.push((x, self.top));
            cells.push((x, self.bottom));
        }
        cells
    }
}

pub struct Ripple {
    config: RippleConfig,
    matrix: &'static KeyMatrix,
    rng: StdRng,
}

impl Ripple {
    pub fn new(config: RippleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: RippleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: RippleConfig, rng: StdRng) -> Self {
        Self {
            config,
            matrix: KeyMatrix::reference(),
            rng,
        }
    }
}

impl Effect for Ripple {
    fn name(&self) -> &'static str {
        "ripple"
    }

    fn wants_key_events(&self) -> bool {
        true
    }

    fn on_key_down(&mut self, scheduler: &LightingScheduler, key: LogicalKey) {
        let base = Color::random_hue(&mut self.rng, 1.0, 1.0);
        scheduler.flash_to_background(key, base, self.config.envelope);

        let Some(bounds) = Bounds::of(self.matrix.positions(key)) else {
            return;
        };
        let jitter = self.config.hue_jitter.abs();
        for ring in 1..=self.config.rings as i32 {
            let envelope = self.config.envelope.delayed(self.config.ring_delay_ms * ring);
            for (x, y) in bounds.grow(ring).border() {
                let Some(target) = self.matrix.key_at_signed(x, y) else {
                    continue;
                };
                if target == key {
                    continue;
                }
                let offset = self.rng.gen_range(-jitter..=jitter) as f32;
                scheduler.flash_to_background(target, base.map_hue(|h| h + offset), envelope);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::scheduler::SchedulerConfig;
    use keyglow_device::RecordingSink;
    use std::sync::Arc;

    #[test]
    fn test_ring_around_key() {
        let sched = LightingScheduler::new(
            SchedulerConfig::default(),
            Arc::new(RecordingSink::new()),
            Arc::new(ManualClock::new(0)),
        );
        let mut effect = Ripple::seeded(RippleConfig::default(), 9);
        // S sits at (3, 3)
        effect.on_key_down(&sched, LogicalKey::S);

        assert_eq!(sched.pending_for(LogicalKey::S)[0].start_ms, 0);
        for key in [LogicalKey::A, LogicalKey::D, LogicalKey::W, LogicalKey::X] {
            let pending = sched.pending_for(key);
            assert_eq!(pending.len(), 2, "{key}");
            assert_eq!(pending[0].start_ms, 50);
            assert_eq!(pending[0].fade_ms, 150);
        }
        // corners are left out
        for key in [LogicalKey::Q, LogicalKey::E, LogicalKey::Z, LogicalKey::C] {
            assert!(sched.pending_for(key).is_empty(), "{key}");
        }
    }

    #[test]
    fn test_border_excludes_corners() {
        let cells = Bounds {
            left: 0,
            right: 2,
            top: 0,
            bottom: 2,
        }
        .border();
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&(1, 0)));
        assert!(!cells.contains(&(0, 0)));
    }
}
