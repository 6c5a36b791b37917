//! Request extension types and shared middleware state.

use std::sync::Arc;

use crate::engine::AuthzEngine;

/// Shared state for the [`authorize`](super::authorize) middleware.
#[derive(Clone)]
pub struct AuthzState {
    /// The engine consulted for every request.
    pub engine: Arc<AuthzEngine>,

    /// Paths exempt from authorization, matched case-insensitively.
    anonymous_paths: Arc<Vec<String>>,
}

impl AuthzState {
    /// Wrap an engine for use as middleware state.
    #[must_use]
    pub fn new(engine: Arc<AuthzEngine>) -> Self {
        Self {
            engine,
            anonymous_paths: Arc::new(Vec::new()),
        }
    }

    /// Exempt a path from authorization, letting unauthenticated callers
    /// through. The request path is compared case-insensitively.
    ///
    /// This is the route-scoped equivalent of an "allow anonymous"
    /// annotation. A route-scoped `Extension` layer cannot serve that role:
    /// it runs inside the router-level `authorize` middleware, so the
    /// extension would be inserted only after the decision was already made.
    #[must_use]
    pub fn with_anonymous_path(mut self, path: impl Into<String>) -> Self {
        let mut paths = (*self.anonymous_paths).clone();
        paths.push(path.into());
        self.anonymous_paths = Arc::new(paths);
        self
    }

    /// Whether a request path is exempt from authorization.
    #[must_use]
    pub fn is_anonymous_path(&self, path: &str) -> bool {
        self.anonymous_paths
            .iter()
            .any(|p| p.eq_ignore_ascii_case(path))
    }
}

/// Request extension marking the request as exempt from authorization.
///
/// Must be inserted by middleware running *before* `authorize` (an outer
/// layer), such as an authentication layer that recognizes public
/// endpoints. For per-route exemptions use
/// [`AuthzState::with_anonymous_path`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAllowed;

/// Per-request trace id, echoed as `guid` in error bodies.
///
/// The surrounding application inserts one per request; when absent, error
/// bodies carry a freshly generated id instead.
#[derive(Debug, Clone)]
pub struct TraceId(pub String);
