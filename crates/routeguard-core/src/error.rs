use thiserror::Error;

/// Core error types for routeguard operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

impl CoreError {
    /// Create a new InvalidTimestamp error
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp(message.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidTimestamp(_) | Self::JsonError(_))
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::TimeError(_) | Self::UuidError(_) | Self::RegexError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTimestamp(_) => ErrorCategory::Validation,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::TimeError(_) | Self::UuidError(_) | Self::RegexError(_) => ErrorCategory::System,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
    System,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
