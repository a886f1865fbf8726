// CLI definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "keyglow")]
#[command(author, version, about = "Per-key keyboard lighting engine")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Config file (default: $XDG_CONFIG_HOME/keyglow/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an effect on the emulated keyboard
    #[command(visible_aliases = ["r", "start"])]
    Run {
        /// Effect to run, overriding the config file
        #[arg(short, long)]
        effect: Option<String>,

        /// Background color (#RRGGBB or name), overriding the config file
        #[arg(short, long)]
        background: Option<String>,

        /// Stop after this many seconds
        #[arg(short, long)]
        duration_secs: Option<u64>,

        /// Log only, no terminal preview
        #[arg(long)]
        no_preview: bool,

        /// Read keys from a USB keyboard (VID:PID, hex) instead of simulated typing
        #[arg(long, value_name = "VID:PID")]
        hid: Option<String>,

        /// Key presses per second for simulated typing
        #[arg(long, default_value = "4.0")]
        typing_rate: f64,
    },

    /// List logical keys with their trigger codes and matrix cells
    #[command(visible_aliases = ["k"])]
    Keys {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available effects
    #[command(visible_aliases = ["e", "list"])]
    Effects,

    /// Show the config file
    Config {
        /// Write a default config file, replacing an existing one
        #[arg(long)]
        init: bool,
    },
}
