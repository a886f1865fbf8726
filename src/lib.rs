//! Real-time per-key keyboard lighting engine
//!
//! The engine turns key presses and animation clocks into timed color
//! transitions on a per-key lighting device:
//!
//! - [`input`]: polls raw key state and emits edge events
//! - [`driver`]: runs an [`Effect`] against a scheduler, feeding it events
//! - [`scheduler`]: queues delayed fades per key and applies them on a tick
//!   thread, last request wins on overlap
//! - [`effects`]: reference strategies (reactive, projectile, ripple, pulse,
//!   rainbow)
//!
//! Devices are reached through [`keyglow_device::LightingSink`].

pub mod clock;
pub mod color;
pub mod config;
pub mod driver;
pub mod effects;
pub mod envelope;
pub mod error;
pub mod grid;
pub mod input;
pub mod layout;
pub mod preview;
pub mod scheduler;
pub mod worker;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use color::Color;
pub use config::Config;
pub use driver::{DriverConfig, Effect, EffectDriver};
pub use effects::EffectConfig;
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use grid::ColorGrid;
pub use input::{KeyEvent, KeyStateDetector, KeyStateSource, TriggerTable};
pub use layout::KeyMatrix;
pub use scheduler::{DelayedAction, LightingScheduler, SchedulerConfig};
pub use worker::TickWorker;

pub use keyglow_device::{LightingSink, LogicalKey};
