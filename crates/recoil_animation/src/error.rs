//! Animation error types

use recoil_core::HostError;
use thiserror::Error;

/// Boxed error returned by caller-supplied policies
pub type PolicyError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for caller-supplied policies
pub type PolicyResult<T> = std::result::Result<T, PolicyError>;

/// Errors raised at the boundary of the animation engine
#[derive(Error, Debug)]
pub enum AnimationError {
    /// A spring can never converge
    #[error("Invalid spring for `{property}`: {reason}")]
    InvalidSpring { property: String, reason: String },

    /// A numeric value is NaN or infinite
    #[error("Invalid value for `{property}`: not a finite number")]
    InvalidValue { property: String },

    /// A key appears more than once in one list
    #[error("Duplicate key in list: {0}")]
    DuplicateKey(String),

    /// A caller policy failed
    #[error("Policy failed: {0}")]
    Policy(#[source] PolicyError),

    /// The frame host cannot schedule frames
    #[error(transparent)]
    Host(#[from] HostError),

    /// Configuration text could not be parsed
    #[error("Config parse failed: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration values are out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl AnimationError {
    /// Wrap a policy failure
    pub fn policy(err: impl Into<PolicyError>) -> Self {
        Self::Policy(err.into())
    }
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
