//! The `run` command

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use keyglow::input::{KeyStateSource, SimulatedTypist, TriggerTable};
use keyglow::{preview, Color, Config, EffectConfig, EffectDriver, KeyMatrix, LightingScheduler, LightingSink};
use keyglow_device::{EmulatedKeyboard, LoggingSink};
use tracing::info;

use super::{setup_interrupt_handler, CommandResult};

/// How long a simulated key stays down
const TYPIST_HOLD_MS: f64 = 150.0;

/// Preview frame rate
const PREVIEW_FPS: u32 = 30;

pub struct RunOptions {
    pub effect: Option<String>,
    pub background: Option<String>,
    pub duration_secs: Option<u64>,
    pub no_preview: bool,
    pub hid: Option<String>,
    pub typing_rate: f64,
}

/// Parse "VID:PID" with hex fields, e.g. "046d:c31c"
pub fn parse_vid_pid(s: &str) -> anyhow::Result<(u16, u16)> {
    let (vid, pid) = s
        .split_once(':')
        .with_context(|| format!("expected VID:PID, got {s:?}"))?;
    let parse = |v: &str| {
        u16::from_str_radix(v.trim().trim_start_matches("0x"), 16)
            .with_context(|| format!("invalid hex id {v:?}"))
    };
    Ok((parse(vid)?, parse(pid)?))
}

#[cfg(feature = "hid")]
fn hid_source(vid_pid: &str, table: Arc<TriggerTable>) -> anyhow::Result<Box<dyn KeyStateSource>> {
    let (vid, pid) = parse_vid_pid(vid_pid)?;
    Ok(Box::new(keyglow::input::HidKeySource::open(vid, pid, table)?))
}

#[cfg(not(feature = "hid"))]
fn hid_source(vid_pid: &str, _table: Arc<TriggerTable>) -> anyhow::Result<Box<dyn KeyStateSource>> {
    parse_vid_pid(vid_pid)?;
    bail!("built without HID support, rebuild with --features hid")
}

fn key_source(opts: &RunOptions, config: &Config, table: &Arc<TriggerTable>) -> anyhow::Result<Box<dyn KeyStateSource>> {
    if let Some(vid_pid) = &opts.hid {
        return hid_source(vid_pid, Arc::clone(table));
    }
    if !opts.typing_rate.is_finite() || opts.typing_rate < 0.0 {
        bail!("typing rate must be a non-negative number");
    }
    let poll_ms = config.detector_interval_ms.max(1) as f64;
    let press_chance = (opts.typing_rate * poll_ms / 1000.0).min(1.0);
    let hold_polls = (TYPIST_HOLD_MS / poll_ms).ceil() as u32;
    Ok(Box::new(SimulatedTypist::new(table, press_chance, hold_polls)))
}

pub fn run(mut config: Config, opts: RunOptions) -> CommandResult {
    if let Some(name) = &opts.effect {
        config.effect = EffectConfig::from_name(name)?;
    }
    if let Some(bg) = &opts.background {
        config.background = bg.parse::<Color>().map_err(anyhow::Error::msg)?;
    }

    let bg = config.background;
    let keyboard = Arc::new(EmulatedKeyboard::with_startup_color((bg.r, bg.g, bg.b)));
    let sink: Arc<dyn LightingSink> = Arc::new(LoggingSink::wrap(Arc::clone(&keyboard)));
    let scheduler = LightingScheduler::with_monotonic_clock(config.scheduler_config(), sink);

    let table = TriggerTable::reference();
    let source = key_source(&opts, &config, &table)?;
    let driver = EffectDriver::new(config.effect.build(), scheduler, config.driver_config())
        .with_key_source(Arc::clone(&table), source);

    let running = setup_interrupt_handler();
    let deadline = opts
        .duration_secs
        .map(|s| Instant::now() + Duration::from_secs(s));

    driver.start()?;
    info!(effect = config.effect.name(), background = %bg, "running");

    if opts.no_preview {
        while running.load(Ordering::SeqCst) && deadline.map_or(true, |d| Instant::now() < d) {
            std::thread::sleep(Duration::from_millis(100));
        }
    } else {
        let title = format!("Effect: {}", config.effect.name());
        preview::run(&keyboard, KeyMatrix::reference(), &title, &running, deadline, PREVIEW_FPS)
            .context("terminal preview failed")?;
    }

    driver.stop();
    info!("stopped");
    Ok(())
}
