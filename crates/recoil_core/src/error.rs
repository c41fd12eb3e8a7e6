//! Host error types

use thiserror::Error;

/// Host collaborator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The host cannot schedule frames
    #[error("Frame host unavailable: {0}")]
    Unavailable(String),
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;
