//! keyglow CLI
//!
//! Runs lighting effects against an emulated keyboard rendered in the
//! terminal, and lists keys, effects and configuration.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

mod commands;
use commands::run::RunOptions;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they stay out of listings and the preview
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None | Some(Commands::Effects) => commands::info::effects(),
        Some(Commands::Keys { json }) => commands::info::keys(json),
        Some(Commands::Config { init }) => commands::info::config(cli.config.as_deref(), init),
        Some(Commands::Run {
            effect,
            background,
            duration_secs,
            no_preview,
            hid,
            typing_rate,
        }) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::run::run(
                config,
                RunOptions {
                    effect,
                    background,
                    duration_secs,
                    no_preview,
                    hid,
                    typing_rate,
                },
            )
        }
    }
}
