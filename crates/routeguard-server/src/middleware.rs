//! Request-scoped middleware: trace ids and development identity.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use routeguard_authz::{Identity, TraceId};
use routeguard_core::generate_trace_id;

/// Header carrying the per-request trace id, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header the development identity layer reads the user id from.
pub const DEBUG_USER_HEADER: &str = "x-debug-user";

/// Ensure every request carries a trace id and mirror it on the response.
///
/// An incoming `X-Request-Id` is preserved; otherwise a fresh id is
/// generated. The id is stored as a [`TraceId`] extension and stamped onto
/// the request headers, so inner layers (the trace span, error bodies) see
/// it regardless of whether the client sent one. This middleware must be
/// the outermost layer of the stack.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static(REQUEST_ID_HEADER);

    let id = req
        .headers()
        .get(&header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(generate_trace_id);

    req.extensions_mut().insert(TraceId(id.clone()));

    let value = HeaderValue::from_str(&id).ok();
    if let Some(value) = &value {
        req.headers_mut().insert(header_name.clone(), value.clone());
    }

    let mut res = next.run(req).await;

    if let Some(value) = value {
        res.headers_mut().insert(header_name, value);
    }
    res
}

/// Materialize an [`Identity`] from the `X-Debug-User` header.
///
/// Stand-in for a real authentication layer in this reference host; the
/// authorization engine only consumes the resulting `Identity` extension,
/// so swapping this for token validation requires no other changes.
pub async fn debug_identity(mut req: Request<Body>, next: Next) -> Response {
    let debug_user = req
        .headers()
        .get(DEBUG_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string);

    if let Some(user) = debug_user {
        req.extensions_mut().insert(Identity::new(user));
    }

    next.run(req).await
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, middleware, routing::get};
    use axum::http::{Request as HttpRequest, StatusCode};
    use tower::ServiceExt;

    fn echo_app() -> Router {
        // Handler echoes the trace id as seen by inner layers.
        Router::new()
            .route(
                "/echo",
                get(|Extension(TraceId(id)): Extension<TraceId>| async move { id }),
            )
            .layer(middleware::from_fn(request_id))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_generated_id_is_visible_to_inner_layers() {
        let response = echo_app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/echo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let header = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap();
        let body = body_string(response).await;

        // Extension, request header, and response header all carry one id.
        assert!(!body.is_empty());
        assert_eq!(body, header);
    }

    #[tokio::test]
    async fn test_incoming_id_is_preserved() {
        let response = echo_app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/echo")
                    .header(REQUEST_ID_HEADER, "client-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "client-7");
    }
}
