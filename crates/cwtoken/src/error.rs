//! Error types for token issuance

use thiserror::Error;

/// Errors raised while issuing a token
///
/// Issuance is all-or-nothing: any error means no token was produced.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The contract or one of its inputs is invalid
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input
        reason: String,
    },

    /// The requested operation is not supported by this engine
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Operation that was rejected
        operation: String,
    },

    /// A provider failed or produced unusable output
    #[error("Token issuance failed: {reason}")]
    IssuanceFailed {
        /// Failure description
        reason: String,
        /// Provider error that caused the failure, if any
        #[source]
        source: Option<ProviderError>,
    },
}

impl TokenError {
    /// Create an input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create an issuance failure without an underlying provider error
    pub fn issuance_failed(reason: impl Into<String>) -> Self {
        Self::IssuanceFailed {
            reason: reason.into(),
            source: None,
        }
    }

    /// Whether the caller supplied invalid input
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Whether the operation is categorically unsupported
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Whether a provider failed to produce the token
    pub fn is_issuance_failure(&self) -> bool {
        matches!(self, Self::IssuanceFailed { .. })
    }
}

impl From<ProviderError> for TokenError {
    fn from(err: ProviderError) -> Self {
        Self::IssuanceFailed {
            reason: err.to_string(),
            source: Some(err),
        }
    }
}

/// Errors reported by signing and serialization providers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No key is registered under the reference
    #[error("Key not found: {key_ref}")]
    KeyNotFound {
        /// Key reference that could not be resolved
        key_ref: String,
    },

    /// The provider does not implement the algorithm
    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// Algorithm identifier
        algorithm: String,
    },

    /// The provider operation failed
    #[error("Provider operation failed: {reason}")]
    Operation {
        /// Failure description
        reason: String,
    },
}

impl ProviderError {
    /// Create an operation failure
    pub fn operation(reason: impl Into<String>) -> Self {
        Self::Operation {
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading [`IssuanceConfig`](crate::config::IssuanceConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(std::path::PathBuf),

    /// Unsupported file format
    #[error("Unsupported configuration format: {0}. Supported formats: toml, yaml, yml, json")]
    UnsupportedFormat(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// A value was parsed but is not acceptable
    #[error("Invalid configuration: {reason}")]
    InvalidValue {
        /// What was wrong with the value
        reason: String,
    },
}
