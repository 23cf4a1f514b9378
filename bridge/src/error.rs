//! Bridge error types.

use advent_guestapi::GuestError;

use crate::command_loop::LoopState;

/// Top-level error type for the bridge crate.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Wasmtime engine, compilation, or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing exports, unexpected imports, etc.).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A guest call or guest-memory access failed.
    #[error(transparent)]
    Guest(#[from] GuestError),

    /// Reading the module or configuration from disk failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed or is out of range.
    #[error("config error: {0}")]
    Config(String),

    /// A command was submitted while another was still in flight.
    #[error("command loop busy ({0:?})")]
    Busy(LoopState),

    /// The session hit a fatal error and accepts no further commands.
    #[error("session halted after a fatal error")]
    Halted,
}

impl BridgeError {
    /// Whether this error came out of the guest itself rather than the host.
    pub fn is_guest_failure(&self) -> bool {
        matches!(self, BridgeError::Guest(_))
    }
}
