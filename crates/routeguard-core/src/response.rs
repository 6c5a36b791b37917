use crate::codes::ErrorCode;
use crate::id::generate_trace_id;
use crate::time::UtcTimestamp;
use serde::{Deserialize, Serialize};

/// Structured error body written to clients when a request is rejected.
///
/// Field names are part of the client contract.
///
/// # Example
/// ```
/// use routeguard_core::{ApiErrorResponse, ErrorCode};
///
/// let body = ApiErrorResponse::new(ErrorCode::Forbidden, "/api/products/42", "PUT");
/// assert_eq!(body.code, "FORBIDDEN");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Trace id correlating this response with server logs.
    pub guid: String,
    /// Wire error code, see [`ErrorCode`].
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Request path that was rejected.
    pub path: String,
    /// Request HTTP method.
    pub method: String,
    /// UTC instant the response was produced, RFC 3339.
    pub timestamp: UtcTimestamp,
}

impl ApiErrorResponse {
    /// Build a response with the code's default message and a fresh trace id.
    #[must_use]
    pub fn new(code: ErrorCode, path: impl Into<String>, method: impl Into<String>) -> Self {
        Self::with_message(code, code.default_message(), path, method)
    }

    /// Build a response with an explicit message.
    #[must_use]
    pub fn with_message(
        code: ErrorCode,
        message: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            guid: generate_trace_id(),
            code: code.as_str().to_string(),
            message: message.into(),
            path: path.into(),
            method: method.into(),
            timestamp: UtcTimestamp::now(),
        }
    }

    /// Override the generated trace id with an existing per-request one.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.guid = trace_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_applied() {
        let body = ApiErrorResponse::new(ErrorCode::SystemAuthorization, "/api/x", "GET");
        assert_eq!(body.code, "SYSTEM_AUTHORIZATION");
        assert_eq!(
            body.message,
            ErrorCode::SystemAuthorization.default_message()
        );
        assert_eq!(body.path, "/api/x");
        assert_eq!(body.method, "GET");
        assert!(!body.guid.is_empty());
    }

    #[test]
    fn test_explicit_message() {
        let body =
            ApiErrorResponse::with_message(ErrorCode::SystemError, "cache not wired", "/a", "POST");
        assert_eq!(body.code, "SYSTEM_ERROR");
        assert_eq!(body.message, "cache not wired");
    }

    #[test]
    fn test_trace_id_override() {
        let body = ApiErrorResponse::new(ErrorCode::Forbidden, "/a", "GET")
            .with_trace_id("req-123");
        assert_eq!(body.guid, "req-123");
    }

    #[test]
    fn test_wire_field_names() {
        let body = ApiErrorResponse::new(ErrorCode::Forbidden, "/api/orders", "DELETE")
            .with_trace_id("abc");
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();

        let obj = json.as_object().unwrap();
        for field in ["guid", "code", "message", "path", "method", "timestamp"] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
        assert_eq!(obj.len(), 6);
        assert_eq!(json["guid"], "abc");
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["method"], "DELETE");

        let ts = json["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z') || ts.contains('+'), "not RFC 3339: {ts}");
    }

    #[test]
    fn test_roundtrip() {
        let body = ApiErrorResponse::new(ErrorCode::SystemError, "/health", "GET");
        let json = serde_json::to_string(&body).unwrap();
        let parsed: ApiErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.code, body.code);
        assert_eq!(parsed.guid, body.guid);
    }
}
