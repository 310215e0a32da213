//! Error types for the chassisd daemon.

use thiserror::Error;

/// Errors that can occur while bootstrapping or running the daemon.
///
/// Refresh failures are deliberately absent: they are contained inside the
/// session store and observable only as an absent token.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// I/O error (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outbound client construction error.
    #[error("Client error: {0}")]
    Client(String),
}

/// Result type alias using `DaemonError`.
pub type Result<T> = std::result::Result<T, DaemonError>;
