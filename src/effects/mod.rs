//! Reference lighting strategies
//!
//! Each strategy is an [`Effect`] with a serde-friendly config struct.
//! [`EffectConfig`] selects one of them by `kind` in the config file:
//!
//! ```toml
//! [effect]
//! kind = "projectile"
//! distance = 3
//! ```

mod projectile;
mod pulse;
mod rainbow;
mod reactive;
mod ripple;

pub use projectile::{Projectile, ProjectileConfig};
pub use pulse::{Pulse, PulseConfig};
pub use rainbow::{Rainbow, RainbowConfig};
pub use reactive::{Reactive, ReactiveConfig};
pub use ripple::{Ripple, RippleConfig};

use serde::{Deserialize, Serialize};

use crate::driver::Effect;
use crate::error::{Error, Result};

/// Effect names with a one-line description, for listings
pub const EFFECTS: &[(&str, &str)] = &[
    ("reactive", "Pressed keys light up in a random color and fade out"),
    ("projectile", "Pressed keys shoot color trails left and right"),
    ("ripple", "Pressed keys light up with a ring of neighbours"),
    ("pulse", "Every key pulses between two random colors"),
    ("rainbow", "Slow red-orange-magenta wave across the board"),
];

/// Which strategy to run, with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectConfig {
    Reactive(ReactiveConfig),
    Projectile(ProjectileConfig),
    Ripple(RippleConfig),
    Pulse(PulseConfig),
    Rainbow(RainbowConfig),
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig::Reactive(ReactiveConfig::default())
    }
}

impl EffectConfig {
    /// Default parameters for the effect called `name`
    pub fn from_name(name: &str) -> Result<Self> {
        let config = match name.trim().to_ascii_lowercase().as_str() {
            "reactive" | "press" => EffectConfig::Reactive(ReactiveConfig::default()),
            "projectile" | "projectiles" => EffectConfig::Projectile(ProjectileConfig::default()),
            "ripple" | "radial" => EffectConfig::Ripple(RippleConfig::default()),
            "pulse" => EffectConfig::Pulse(PulseConfig::default()),
            "rainbow" | "wave" => EffectConfig::Rainbow(RainbowConfig::default()),
            _ => return Err(Error::UnknownEffect(name.to_string())),
        };
        Ok(config)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EffectConfig::Reactive(_) => "reactive",
            EffectConfig::Projectile(_) => "projectile",
            EffectConfig::Ripple(_) => "ripple",
            EffectConfig::Pulse(_) => "pulse",
            EffectConfig::Rainbow(_) => "rainbow",
        }
    }

    /// Instantiate the strategy
    pub fn build(&self) -> Box<dyn Effect> {
        match self {
            EffectConfig::Reactive(c) => Box::new(Reactive::new(c.clone())),
            EffectConfig::Projectile(c) => Box::new(Projectile::new(c.clone())),
            EffectConfig::Ripple(c) => Box::new(Ripple::new(c.clone())),
            EffectConfig::Pulse(c) => Box::new(Pulse::new(c.clone())),
            EffectConfig::Rainbow(c) => Box::new(Rainbow::new(c.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        for (name, _) in EFFECTS {
            let config = EffectConfig::from_name(name).unwrap();
            assert_eq!(config.name(), *name);
            assert_eq!(config.build().name(), *name);
        }
        assert!(matches!(
            EffectConfig::from_name("sparkle"),
            Err(Error::UnknownEffect(_))
        ));
    }

    #[test]
    fn test_tagged_toml() {
        let config: EffectConfig = toml::from_str("kind = \"projectile\"\ndistance = 5").unwrap();
        match config {
            EffectConfig::Projectile(p) => {
                assert_eq!(p.distance, 5);
                assert_eq!(p.step_ms, ProjectileConfig::default().step_ms);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_key_input_flags() {
        assert!(EffectConfig::from_name("reactive").unwrap().build().wants_key_events());
        assert!(!EffectConfig::from_name("rainbow").unwrap().build().wants_key_events());
    }
}
