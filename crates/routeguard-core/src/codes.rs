//! Wire error codes and their HTTP status mapping.
//!
//! Every error body written by the middleware carries one of these codes.
//! The code strings are part of the client contract and must not change.

use serde::{Deserialize, Serialize};

/// Error codes surfaced to clients in the structured error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Authentication is missing or unusable (HTTP 401).
    #[serde(rename = "SYSTEM_AUTHORIZATION")]
    SystemAuthorization,
    /// The caller is authenticated but not allowed (HTTP 403).
    #[serde(rename = "FORBIDDEN")]
    Forbidden,
    /// A deployment or wiring defect prevented a decision (HTTP 500).
    #[serde(rename = "SYSTEM_ERROR")]
    SystemError,
}

impl ErrorCode {
    /// The code string written on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAuthorization => "SYSTEM_AUTHORIZATION",
            Self::Forbidden => "FORBIDDEN",
            Self::SystemError => "SYSTEM_ERROR",
        }
    }

    /// Default human-readable message for this code.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::SystemAuthorization => "Authentication is required to access this resource",
            Self::Forbidden => "Access to this resource is denied",
            Self::SystemError => "Internal server error",
        }
    }

    /// HTTP status code paired with this error code.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::SystemAuthorization => 401,
            Self::Forbidden => 403,
            Self::SystemError => 500,
        }
    }

    /// Look up a code from its wire string (case-insensitive).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        if code.eq_ignore_ascii_case("SYSTEM_AUTHORIZATION") {
            Some(Self::SystemAuthorization)
        } else if code.eq_ignore_ascii_case("FORBIDDEN") {
            Some(Self::Forbidden)
        } else if code.eq_ignore_ascii_case("SYSTEM_ERROR") {
            Some(Self::SystemError)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
