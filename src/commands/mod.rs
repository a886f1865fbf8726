//! Command handlers for the CLI application.
//!
//! - `run`: run an effect against the emulated keyboard
//! - `info`: read-only listings (keys, effects, config)

pub mod info;
pub mod run;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use keyglow::Config;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Set up Ctrl-C handler and return the running flag
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}

/// Load the config from `path`, or the default location
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_default()?,
    };
    Ok(config)
}
