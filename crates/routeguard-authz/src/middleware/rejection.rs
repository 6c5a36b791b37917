//! Rendering denied and errored decisions as HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use routeguard_core::{ApiErrorResponse, ErrorCode};

use crate::engine::AccessDecision;

/// A non-`Allow` decision bound to the request it rejects.
#[derive(Debug)]
pub struct AuthzRejection {
    code: ErrorCode,
    message: String,
    path: String,
    method: String,
    trace_id: Option<String>,
}

impl AuthzRejection {
    /// Build a rejection from a decision. Returns `None` for `Allow`.
    #[must_use]
    pub fn from_decision(
        decision: &AccessDecision,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> Option<Self> {
        let (code, message) = match decision {
            AccessDecision::Allow => return None,
            AccessDecision::Deny(reason) => (reason.error_code(), reason.message.clone()),
            AccessDecision::Error(_) => (
                ErrorCode::SystemError,
                ErrorCode::SystemError.default_message().to_string(),
            ),
        };

        Some(Self {
            code,
            message,
            path: path.into(),
            method: method.into(),
            trace_id: None,
        })
    }

    /// Attach the per-request trace id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// The HTTP status this rejection renders with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AuthzRejection {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut body =
            ApiErrorResponse::with_message(self.code, self.message, self.path, self.method);
        if let Some(trace_id) = self.trace_id {
            body = body.with_trace_id(trace_id);
        }

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
