//! Common error types for media-server backends

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur while talking to a media-server backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Network or transport failure (refused, reset, DNS, TLS)
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Timeout waiting for the backend
    #[error("Operation timed out")]
    Timeout,

    /// Credentials were rejected by the backend
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requested item does not exist on this backend
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload or response could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation not supported by this backend
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Whether this error means the connection itself is unusable.
    ///
    /// Connectivity failures flip the owning instance to `Inactive`;
    /// every other error is a per-call outcome.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            BackendError::Connectivity(_) | BackendError::Timeout | BackendError::Unauthorized(_)
        )
    }
}

/// Errors raised while turning configuration into backend instances
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A server entry has an empty name
    #[error("Server entry has no name")]
    MissingName,

    /// No factory is registered for the configured backend type
    #[error("Unknown server type '{server_type}' for '{name}'")]
    UnknownType { name: String, server_type: String },

    /// The backend rejected its configuration
    #[error("Invalid configuration for '{name}': {reason}")]
    Invalid { name: String, reason: String },

    /// The entry is disabled
    #[error("Server '{0}' is disabled")]
    Disabled(String),

    /// Configuration file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for the expected schema
    #[error("Failed to parse config: {0}")]
    Toml(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
