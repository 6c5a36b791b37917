//! Authorization configuration.
//!
//! Declarative configuration for the rule set and permission cache:
//!
//! ```toml
//! [authz]
//! permit_all = ["/health", "/api/public/info"]
//!
//! [authz.permissions]
//! orders = [
//!     "/api/orders/*:POST:@orders.create",
//!     "/api/orders/{REGEX}:GET:@orders.read",
//! ]
//!
//! [authz.cache]
//! ttl = "10m"
//! ```
//!
//! Group names under `permissions` are organizational only; at evaluation
//! time all rules form one flat sequence in declaration order.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AuthzError, AuthzResult};

/// Authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthzConfig {
    /// Paths that bypass authorization entirely (case-insensitive exact match).
    pub permit_all: Vec<String>,

    /// Ordered groups of raw rule strings. Declaration order is the
    /// evaluation order; first match wins.
    pub permissions: IndexMap<String, Vec<String>>,

    /// Permission cache settings.
    pub cache: PermissionCacheConfig,
}

/// Permission cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionCacheConfig {
    /// How long a user's cached permission set remains valid.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for PermissionCacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_cache_ttl(),
        }
    }
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(600)
}

impl AuthzConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache TTL is zero or a permit-all entry is
    /// empty.
    pub fn validate(&self) -> AuthzResult<()> {
        if self.cache.ttl.is_zero() {
            return Err(AuthzError::configuration("cache.ttl must be positive"));
        }

        if self.permit_all.iter().any(|p| p.trim().is_empty()) {
            return Err(AuthzError::configuration(
                "permit_all entries must not be empty",
            ));
        }

        Ok(())
    }

    /// All raw rule strings across groups, in declaration order.
    pub fn raw_rules(&self) -> impl Iterator<Item = &str> {
        self.permissions
            .values()
            .flat_map(|rules| rules.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthzConfig::default();
        assert!(config.permit_all.is_empty());
        assert!(config.permissions.is_empty());
        assert_eq!(config.cache.ttl, Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config: AuthzConfig = toml::from_str(
            r#"
            permit_all = ["/health"]

            [permissions]
            orders = ["/api/orders/*:POST:@orders.create"]
            reports = ["/api/reports/{REGEX}:GET:@reports.read"]

            [cache]
            ttl = "5m"
            "#,
        )
        .unwrap();

        assert_eq!(config.permit_all, vec!["/health"]);
        assert_eq!(config.permissions.len(), 2);
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_raw_rules_preserve_declaration_order() {
        let config: AuthzConfig = toml::from_str(
            r#"
            [permissions]
            b_second = ["/api/b:GET"]
            a_first = ["/api/a:GET", "/api/a2:GET"]
            "#,
        )
        .unwrap();

        let rules: Vec<&str> = config.raw_rules().collect();
        assert_eq!(rules, vec!["/api/b:GET", "/api/a:GET", "/api/a2:GET"]);
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = AuthzConfig {
            cache: PermissionCacheConfig {
                ttl: Duration::ZERO,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_permit_all() {
        let config = AuthzConfig {
            permit_all: vec!["  ".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
