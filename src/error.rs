//! Engine error types

use std::path::PathBuf;

use keyglow_device::{LogicalKey, SinkError};
use thiserror::Error;

/// Errors from the lighting engine and its configuration
#[derive(Error, Debug)]
pub enum Error {
    /// Lighting backend error
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// A worker thread could not be spawned
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Two keys share a trigger set and neither is marked indistinguishable
    #[error("Keys {first} and {second} have identical trigger codes")]
    AmbiguousTrigger {
        first: LogicalKey,
        second: LogicalKey,
    },

    /// A key has no trigger codes
    #[error("Key {0} has an empty trigger set")]
    EmptyTrigger(LogicalKey),

    /// Config file could not be read or written
    #[error("Config I/O error at {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Unknown effect name
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    /// Input device error
    #[error("Input error: {0}")]
    Input(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
