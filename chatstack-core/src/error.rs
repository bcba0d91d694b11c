//! Error types for chatstack.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for chatstack operations.
pub type Result<T> = std::result::Result<T, StackError>;

/// Main error type for chatstack.
#[derive(Error, Debug)]
pub enum StackError {
    // Host preparation errors
    #[error("Preflight check failed: {reason}")]
    Preflight { reason: String },

    #[error("Failed to install dependency {package}: {reason}")]
    DependencyInstall { package: String, reason: String },

    #[error("Failed to fetch deployment repository {url}: {reason}")]
    RepositoryFetch { url: String, reason: String },

    // Shared resource errors
    #[error("Network {name} was not found after creation")]
    NetworkCreateFailed { name: String },

    #[error("Failed to create volume {name}: {reason}")]
    VolumeCreateFailed { name: String, reason: String },

    // Group lifecycle errors
    #[error("Stack definition for group {group} is missing at {path:?}")]
    StackDefinitionMissing { group: String, path: PathBuf },

    #[error("Failed to start group {group}: {reason}")]
    GroupStartFailed { group: String, reason: String },

    #[error("Group {group} did not come up after {}s", waited.as_secs())]
    GroupStartTimeout { group: String, waited: Duration },

    #[error("Failed to stop group {group}: {reason}")]
    GroupStopFailed { group: String, reason: String },

    // Runtime errors
    #[error("Container runtime unavailable: {reason}")]
    RuntimeUnavailable { reason: String },

    #[error("Runtime command {command} failed: {reason}")]
    RuntimeCommandFailed { command: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
