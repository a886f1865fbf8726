//! Sink error types

use thiserror::Error;

/// Errors a lighting backend can report
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Device rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("Invalid frame size: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}
