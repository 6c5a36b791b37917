//! Authorization error types.

/// Errors that can occur during authorization operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// A rule string could not be turned into a usable rule.
    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule {
        /// The raw rule string.
        rule: String,
        /// Description of what is wrong with it.
        message: String,
    },

    /// The permission store could not be reached or returned an error.
    #[error("Store error: {message}")]
    Store {
        /// Description of the store error.
        message: String,
    },

    /// The backing permission cache failed.
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error.
        message: String,
    },

    /// The authorization configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthzError {
    /// Create an invalid-rule error.
    pub fn invalid_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenience result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthzError::invalid_rule("/api:BOGUS", "empty path pattern");
        assert_eq!(
            err.to_string(),
            "Invalid rule '/api:BOGUS': empty path pattern"
        );

        let err = AuthzError::store("connection refused");
        assert_eq!(err.to_string(), "Store error: connection refused");
    }
}
