//! # Error Types
//!
//! Errors surfaced by the orchestration core. None of them ever reaches the
//! store: each is isolated to the task that produced it.

use std::path::PathBuf;

use shared_types::ServiceId;
use thiserror::Error;
use wallet_codec::CodecError;

/// Errors from the wallet runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A service launch failed. Its handle never resolves.
    #[error("Service {service} failed to start: {reason}")]
    ServiceStartFailure { service: ServiceId, reason: String },

    /// A service call triggered by an intent failed.
    #[error("Intent {intent} failed: {reason}")]
    UnhandledIntentFailure { intent: &'static str, reason: String },

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Encoding or decoding failed.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// The replica side of a channel is gone.
    #[error("Replica channel closed")]
    ReplicaClosed,
}

/// Errors from durable snapshot storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another process holds the data directory.
    #[error("Data directory {} already in use{}", path.display(), pid.map(|p| format!(" by process {p}")).unwrap_or_default())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    /// Key contains characters the backend cannot store.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Stored bytes are not UTF-8 text.
    #[error("Stored value for {key} is not valid text")]
    InvalidText { key: String },

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Backend not compiled into this build.
    #[error("Storage backend {0} is not available in this build")]
    Unavailable(&'static str),
}
