//! The per-request authorization decision function.
//!
//! The engine is stateless per call; all shared state lives in the rule set
//! (read-only after startup) and the permission cache it is given. Checks
//! run in a fixed order and short-circuit on the first applicable branch:
//!
//! 1. anonymous-allowed marker → allow
//! 2. permit-all path → allow
//! 3. no matching rule → deny (default-deny)
//! 4. no authenticated identity → deny
//! 5. no user id / no permission service wired → deny / error
//! 6. permission evaluation (OR over required permissions) → allow or deny

use std::sync::Arc;

use serde::Serialize;

use routeguard_core::ErrorCode;

use crate::cache::UserPermissionCache;
use crate::identity::Identity;
use crate::rule::RuleSet;

// =============================================================================
// Access Decision
// =============================================================================

/// Result of an authorization check.
#[derive(Debug, Clone)]
pub enum AccessDecision {
    /// The request may proceed.
    Allow,
    /// The request is rejected for a caller-attributable reason.
    Deny(DenyReason),
    /// No decision could be made; a deployment or wiring defect.
    Error(ErrorReason),
}

impl AccessDecision {
    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` if access was denied.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    /// Get the deny reason if access was denied.
    #[must_use]
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Deny(reason) => Some(reason),
            _ => None,
        }
    }
}

// =============================================================================
// Deny Reason
// =============================================================================

/// Reason for a denial.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenyReason {
    /// Stable reason code for programmatic handling.
    pub code: String,

    /// Human-readable message.
    pub message: String,

    /// Permissions the matched rule required, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_permissions: Option<Vec<String>>,
}

impl DenyReason {
    /// No rule matched the request; default-deny.
    #[must_use]
    pub fn no_matching_rule() -> Self {
        Self {
            code: "no-matching-rule".to_string(),
            message: "No permission rule grants access to this endpoint".to_string(),
            required_permissions: None,
        }
    }

    /// The caller is not authenticated or carries no usable user id.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            code: "unauthenticated".to_string(),
            message: "Authentication is required to access this resource".to_string(),
            required_permissions: None,
        }
    }

    /// The caller lacks every permission the matched rule requires.
    #[must_use]
    pub fn insufficient_permission(required: &[String]) -> Self {
        Self {
            code: "insufficient-permission".to_string(),
            message: "Access to this resource is denied".to_string(),
            required_permissions: Some(required.to_vec()),
        }
    }

    /// The wire error code this denial maps to.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        if self.code == "unauthenticated" {
            ErrorCode::SystemAuthorization
        } else {
            ErrorCode::Forbidden
        }
    }
}

// =============================================================================
// Error Reason
// =============================================================================

/// Reason authorization could not be decided at all. Always maps to HTTP 500.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReason {
    /// Stable reason code for programmatic handling.
    pub code: String,

    /// Human-readable message.
    pub message: String,
}

impl ErrorReason {
    /// The permission lookup collaborator is not wired up.
    #[must_use]
    pub fn misconfigured() -> Self {
        Self {
            code: "misconfigured".to_string(),
            message: "Permission service is not configured".to_string(),
        }
    }

    /// The permission lookup itself failed.
    #[must_use]
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        Self {
            code: "lookup-failed".to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Authorization Engine
// =============================================================================

/// Per-request authorization engine.
///
/// Cheap to share behind an `Arc`; one instance serves all in-flight
/// requests concurrently.
pub struct AuthzEngine {
    rules: Arc<RuleSet>,

    /// Permission lookup collaborator. `None` means the deployment forgot
    /// to wire it; protected endpoints then fail with a server error.
    permissions: Option<Arc<UserPermissionCache>>,
}

impl AuthzEngine {
    /// Create an engine with a wired permission service.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, permissions: Arc<UserPermissionCache>) -> Self {
        Self {
            rules,
            permissions: Some(permissions),
        }
    }

    /// Create an engine without a permission service.
    ///
    /// Permit-all paths still work; any rule-protected endpoint yields a
    /// server error for authenticated callers.
    #[must_use]
    pub fn without_permission_service(rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            permissions: None,
        }
    }

    /// The rule set this engine evaluates.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decide whether one request may proceed.
    ///
    /// `method` is upper-cased internally; `anonymous_allowed` is the
    /// per-endpoint escape hatch that bypasses every check.
    pub async fn authorize(
        &self,
        path: &str,
        method: &str,
        identity: Option<&Identity>,
        anonymous_allowed: bool,
    ) -> AccessDecision {
        if anonymous_allowed {
            return AccessDecision::Allow;
        }

        if self.rules.is_permit_all(path) {
            return AccessDecision::Allow;
        }

        let method = method.to_uppercase();
        let Some(rule) = self.rules.find_match(&method, path) else {
            tracing::warn!(method = %method, path = %path, "No permission rule found");
            return AccessDecision::Deny(DenyReason::no_matching_rule());
        };

        let Some(user_id) = identity.and_then(Identity::user_id) else {
            if identity.is_some() {
                tracing::warn!(method = %method, path = %path, "User id not found in identity");
            }
            return AccessDecision::Deny(DenyReason::unauthenticated());
        };

        let Some(permissions) = &self.permissions else {
            tracing::error!(
                method = %method,
                path = %path,
                "Permission service not wired; cannot evaluate rule"
            );
            return AccessDecision::Error(ErrorReason::misconfigured());
        };

        let user_permissions = match permissions.permissions(user_id).await {
            Ok(perms) => perms,
            Err(e) => {
                tracing::error!(
                    method = %method,
                    path = %path,
                    user_id = %user_id,
                    error = %e,
                    "Permission lookup failed"
                );
                return AccessDecision::Error(ErrorReason::lookup_failed(
                    "Failed to resolve user permissions",
                ));
            }
        };

        let required = rule.required_permissions();
        if required.is_empty() {
            return AccessDecision::Allow;
        }

        let has_permission = required
            .iter()
            .any(|rp| user_permissions.iter().any(|up| up.eq_ignore_ascii_case(rp)));

        if has_permission {
            AccessDecision::Allow
        } else {
            if tracing::enabled!(tracing::Level::INFO) {
                tracing::info!(
                    method = %method,
                    path = %path,
                    required = %required.join(","),
                    user_permissions = %user_permissions.join(","),
                    "Authorization failed"
                );
            }
            AccessDecision::Deny(DenyReason::insufficient_permission(required))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
