//! Error types for danheng-console

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the terminal engine.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The terminal could not be read or written.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The OS refused to start a worker thread.
    #[error("Failed to spawn {worker} thread: {source}")]
    Spawn {
        /// Worker name.
        worker: &'static str,
        /// The underlying spawn error.
        source: io::Error,
    },

    /// A worker thread panicked.
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: io::Error,
    },

    /// Failed to parse JSON
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from submitting a command to the remote server.
///
/// A server that answers with a non-zero code is not an error here; that
/// answer comes back as a [`CommandResponse`](crate::command::CommandResponse).
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No session client is available.
    #[error("No session client for {0}")]
    Offline(String),

    /// The request never produced an answer. Returned by network-backed
    /// [`CommandSubmitter`](crate::command::CommandSubmitter) implementations.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ConsoleError>;
