//! Rule parsing and the rule set.
//!
//! A raw rule has the shape `<pathPattern>[:<METHOD>[:<perm1>[,<perm2>...]]]`:
//!
//! - `/api/orders/*:POST:@orders.create` — POST, one segment after
//!   `/api/orders/`, requires `orders.create`
//! - `/api/reports/{REGEX}:GET:@reports.read` — GET, any suffix after
//!   `/api/reports/`, requires `reports.read`
//! - `/api/public:GET` — no required permissions; authentication suffices
//!
//! The rule set is built once at startup and read-only afterward. Rule order
//! equals declaration order and the first match wins.

use crate::config::AuthzConfig;
use crate::error::{AuthzError, AuthzResult};
use crate::pattern::CompiledPattern;

// =============================================================================
// Rule
// =============================================================================

/// One compiled authorization rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Original rule string, kept for diagnostics.
    raw: String,

    /// Compiled path matcher.
    matcher: CompiledPattern,

    /// Upper-cased HTTP method, `GET` when the rule omits one.
    method: String,

    /// Normalized permission tokens. Empty means authentication suffices.
    /// Duplicates are accepted as written; OR evaluation makes them harmless.
    required_permissions: Vec<String>,
}

impl Rule {
    /// Parse one raw rule string.
    ///
    /// Fields are separated by `:` with empty segments dropped. The method
    /// defaults to `GET`; the permission field is only honored when all
    /// three fields are present. A leading `@` and a trailing comma run on
    /// the permission field are stripped.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank rule, an empty path pattern, or a path
    /// pattern whose derived regex fails to compile.
    pub fn parse(raw: &str) -> AuthzResult<Self> {
        if raw.trim().is_empty() {
            return Err(AuthzError::invalid_rule(raw, "rule is blank"));
        }

        let parts: Vec<&str> = raw.split(':').filter(|s| !s.is_empty()).collect();

        let path_pattern = parts.first().map(|s| s.trim()).unwrap_or_default();
        if path_pattern.is_empty() {
            return Err(AuthzError::invalid_rule(raw, "empty path pattern"));
        }

        let method = match parts.get(1).map(|s| s.trim()) {
            Some(m) if !m.is_empty() => m.to_uppercase(),
            _ => "GET".to_string(),
        };

        let perms_part = if parts.len() == 3 {
            parts[2].trim()
        } else {
            ""
        };
        let perms_part = perms_part
            .strip_prefix('@')
            .unwrap_or(perms_part)
            .trim()
            .trim_end_matches(',');

        let required_permissions = perms_part
            .split(',')
            .filter(|p| !p.is_empty())
            .map(normalize_permission_token)
            .collect();

        let matcher = CompiledPattern::compile(path_pattern)?;

        Ok(Self {
            raw: raw.to_string(),
            matcher,
            method,
            required_permissions,
        })
    }

    /// Whether this rule applies to the given method and path.
    #[must_use]
    pub fn applies_to(&self, method: &str, path: &str) -> bool {
        self.method == method && self.matcher.matches(path)
    }

    /// The original rule string.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The rule's HTTP method (always upper-case).
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Permissions of which the caller must hold at least one.
    #[must_use]
    pub fn required_permissions(&self) -> &[String] {
        &self.required_permissions
    }
}

/// Trim a permission token and strip leading `/` runs and one leading `@`.
fn normalize_permission_token(token: &str) -> String {
    let token = token.trim();
    let token = token.trim_start_matches('/');
    let token = token.strip_prefix('@').unwrap_or(token);
    token.to_string()
}

// =============================================================================
// Rule Set
// =============================================================================

/// The immutable collection of compiled rules plus the permit-all list.
///
/// Built once during bootstrap; concurrent readers never race because it is
/// never written after construction.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    permit_all: Vec<String>,
}

impl RuleSet {
    /// Build the rule set from configuration.
    ///
    /// Rules that fail to parse are logged and skipped; a malformed rule
    /// never aborts startup.
    #[must_use]
    pub fn from_config(config: &AuthzConfig) -> Self {
        let mut rules = Vec::new();

        for raw in config.raw_rules() {
            match Rule::parse(raw) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    tracing::warn!(rule = %raw, error = %e, "Skipping unparseable rule");
                }
            }
        }

        tracing::info!(
            rules = rules.len(),
            permit_all = config.permit_all.len(),
            "Authorization rule set loaded"
        );

        Self {
            rules,
            permit_all: config.permit_all.clone(),
        }
    }

    /// Build a rule set directly from parsed rules (mainly for tests).
    #[must_use]
    pub fn new(rules: Vec<Rule>, permit_all: Vec<String>) -> Self {
        Self { rules, permit_all }
    }

    /// First rule whose method and pattern match, in declaration order.
    #[must_use]
    pub fn find_match(&self, method: &str, path: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.applies_to(method, path))
    }

    /// Whether the path bypasses authorization (case-insensitive exact match).
    #[must_use]
    pub fn is_permit_all(&self, path: &str) -> bool {
        self.permit_all.iter().any(|p| p.eq_ignore_ascii_case(path))
    }

    /// Number of loaded rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the rule set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
