//! # routeguard-authz
//!
//! Declarative, pattern-based authorization for HTTP services. Textual rules
//! like `/api/orders/*:POST:@orders.create` are compiled once at startup;
//! every request is then checked against them, with the caller's permission
//! set resolved through a TTL cache in front of a pluggable store.
//!
//! ## Components
//!
//! - [`pattern`] - path pattern → compiled regex translation
//! - [`rule`] - rule parsing and the first-match-wins rule set
//! - [`config`] - declarative configuration for rules and caching
//! - [`store`] - permission store and cache store abstractions
//! - [`cache`] - TTL-cached permission lookups with explicit invalidation
//! - [`engine`] - the per-request Allow/Deny/Error decision function
//! - [`middleware`] - axum integration and error body rendering
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use routeguard_authz::{
//!     AuthzEngine, AuthzState, RuleSet, UserPermissionCache,
//!     config::AuthzConfig, store::MemoryCacheStore,
//! };
//!
//! let config: AuthzConfig = load_config()?;
//! let rules = Arc::new(RuleSet::from_config(&config));
//! let cache = UserPermissionCache::new(store, Arc::new(MemoryCacheStore::new()), config.cache.ttl);
//! let engine = Arc::new(AuthzEngine::new(rules, Arc::new(cache)));
//!
//! let app = router.layer(axum::middleware::from_fn_with_state(
//!     AuthzState::new(engine),
//!     routeguard_authz::middleware::authorize,
//! ));
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod pattern;
pub mod rule;
pub mod store;

pub use cache::UserPermissionCache;
pub use config::AuthzConfig;
pub use engine::{AccessDecision, AuthzEngine, DenyReason, ErrorReason};
pub use error::{AuthzError, AuthzResult};
pub use identity::Identity;
pub use middleware::{AnonymousAllowed, AuthzState, TraceId};
pub use rule::{Rule, RuleSet};
pub use store::{MemoryCacheStore, PermissionCacheStore, PermissionStore};
