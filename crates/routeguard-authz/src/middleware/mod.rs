//! Axum integration for the authorization engine.
//!
//! The [`authorize`] middleware reads the caller's [`Identity`] from request
//! extensions, checks for an authorization exemption (the
//! [`AnonymousAllowed`] marker set by an outer layer, or a path configured
//! via [`AuthzState::with_anonymous_path`]), asks the engine for a decision,
//! and turns anything but `Allow` into the structured error body clients
//! expect.
//!
//! [`Identity`]: crate::identity::Identity

mod layer;
mod rejection;
mod types;

pub use layer::authorize;
pub use rejection::AuthzRejection;
pub use types::{AnonymousAllowed, AuthzState, TraceId};
