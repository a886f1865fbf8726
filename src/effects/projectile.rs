//! Horizontal projectiles fired from pressed keys
//!
//! The pressed key lights up and, on every row it spans, a projectile flies
//! out to the left and to the right one cell per step. Each step shifts the
//! hue and, when the range is bounded, dims the color so the trail fades
//! out at `distance`.

use keyglow_device::LogicalKey;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::driver::Effect;
use crate::envelope::Envelope;
use crate::layout::KeyMatrix;
use crate::scheduler::LightingScheduler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Cells travelled per side, 0 for the whole row
    pub distance: u32,
    /// Delay between consecutive cells
    pub step_ms: i32,
    /// Hue shift per cell, degrees
    pub hue_step: f32,
    pub envelope: Envelope,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            distance: 3,
            step_ms: 50,
            hue_step: 15.0,
            envelope: Envelope::new(0, 200, 700, 500),
        }
    }
}

pub struct Projectile {
    config: ProjectileConfig,
    matrix: &'static KeyMatrix,
    rng: StdRng,
}

impl Projectile {
    pub fn new(config: ProjectileConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: ProjectileConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ProjectileConfig, rng: StdRng) -> Self {
        Self {
            config,
            matrix: KeyMatrix::reference(),
            rng,
        }
    }

    fn fire_row(&self, scheduler: &LightingScheduler, y: usize, left: usize, right: usize, base: Color) {
        let distance = self.config.distance as i32;
        let dim = 1.0 / (distance as f32 + 1.0);
        let mut color = base;
        let mut delay = 0;

        for step in 1.. {
            if distance > 0 {
                if step > distance {
                    break;
                }
                color = color.map_brightness(|b| b - dim);
            }
            delay += self.config.step_ms;

            let left_x = left as i32 - step;
            let right_x = right as i32 + step;
            if left_x < 0 && right_x >= self.matrix.width() as i32 {
                break;
            }

            color = color.map_hue(|h| h + self.config.hue_step);
            let envelope = self.config.envelope.delayed(delay);
            for x in [left_x, right_x] {
                if let Some(target) = self.matrix.key_at_signed(x, y as i32) {
                    scheduler.flash_to_background(target, color, envelope);
                }
            }
        }
    }
}

impl Effect for Projectile {
    fn name(&self) -> &'static str {
        "projectile"
    }

    fn wants_key_events(&self) -> bool {
        true
    }

    fn on_key_down(&mut self, scheduler: &LightingScheduler, key: LogicalKey) {
        let base = Color::random_hue(&mut self.rng, 1.0, 1.0);
        scheduler.flash_to_background(key, base, self.config.envelope);

        let positions = self.matrix.positions(key);
        let (Some(&(left, _)), Some(&(right, _))) = (positions.first(), positions.last()) else {
            return;
        };
        for y in self.matrix.rows(key) {
            self.fire_row(scheduler, y, left, right, base);
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

    fn scheduler() -> LightingScheduler {
        LightingScheduler::new(
            SchedulerConfig {
                background: Color::BLACK,
                ..Default::default()
            },
            Arc::new(RecordingSink::new()),
            Arc::new(ManualClock::new(0)),
        )
    }

    #[test]
    fn test_bounded_trail() {
        let sched = scheduler();
        let mut effect = Projectile::seeded(ProjectileConfig::default(), 11);
        // T sits at x = 6 on row 2
        effect.on_key_down(&sched, LogicalKey::T);

        let on = |k| sched.pending_for(k)[0];
        assert_eq!(on(LogicalKey::T).start_ms, 0);
        assert_eq!(on(LogicalKey::R).start_ms, 50);
        assert_eq!(on(LogicalKey::Y).start_ms, 50);
        assert_eq!(on(LogicalKey::E).start_ms, 100);
        assert_eq!(on(LogicalKey::W).start_ms, 150);
        assert_eq!(on(LogicalKey::I).start_ms, 150);
        // fourth cell is out of range
        assert!(sched.pending_for(LogicalKey::Q).is_empty());
        assert!(sched.pending_for(LogicalKey::O).is_empty());
        assert!(sched.pending_for(LogicalKey::Tab).is_empty());
        // trail dims along the way
        let bright = |k| on(k).color.to_hsb().brightness;
        assert!(bright(LogicalKey::R) > bright(LogicalKey::E));
        assert!(bright(LogicalKey::E) > bright(LogicalKey::W));
    }

    #[test]
    fn test_unbounded_reaches_edges() {
        let sched = scheduler();
        let config = ProjectileConfig {
            distance: 0,
            ..Default::default()
        };
        let mut effect = Projectile::seeded(config, 5);
        effect.on_key_down(&sched, LogicalKey::T);
        // Tab spans x = 0 and 1, so it is flashed twice and the last one wins
        assert_eq!(sched.pending_for(LogicalKey::Tab)[0].start_ms, 300);
        assert_eq!(sched.pending_for(LogicalKey::NumPlus)[0].start_ms, 15 * 50);
    }
}
