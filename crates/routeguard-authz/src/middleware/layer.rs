//! The authorization middleware function.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::identity::Identity;
use crate::middleware::rejection::AuthzRejection;
use crate::middleware::types::{AnonymousAllowed, AuthzState, TraceId};

/// Authorize one request, passing it on or writing an error body.
///
/// Wire with `axum::middleware::from_fn_with_state`; exempt routes are
/// configured on the state so the exemption is visible before the decision:
///
/// ```ignore
/// let state = AuthzState::new(engine).with_anonymous_path("/open");
/// let app = Router::new()
///     .route("/open", get(landing))
///     .route("/api/orders/{id}", put(update_order))
///     .layer(middleware::from_fn_with_state(state, authorize));
/// ```
pub async fn authorize(
    State(state): State<AuthzState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().as_str().to_uppercase();
    // The extension can only come from an outer layer; route-scoped
    // exemptions are configured on the state instead.
    let anonymous_allowed = request.extensions().get::<AnonymousAllowed>().is_some()
        || state.is_anonymous_path(&path);
    let identity = request.extensions().get::<Identity>().cloned();
    let trace_id = request.extensions().get::<TraceId>().cloned();

    let decision = state
        .engine
        .authorize(&path, &method, identity.as_ref(), anonymous_allowed)
        .await;

    match AuthzRejection::from_decision(&decision, &path, &method) {
        None => next.run(request).await,
        Some(rejection) => {
            let rejection = match trace_id {
                Some(TraceId(id)) => rejection.with_trace_id(id),
                None => rejection,
            };
            rejection.into_response()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
