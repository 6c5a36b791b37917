//! Path pattern compilation for rule matching.
//!
//! Rule path patterns support two markers:
//!
//! - `*` matches exactly one path segment (one or more characters, no `/`)
//! - `{REGEX}` matches any non-empty suffix, including further `/` separators
//!
//! Everything else in the pattern is matched literally and case-insensitively.
//!
//! # Example
//!
//! ```
//! use routeguard_authz::pattern::CompiledPattern;
//!
//! let pattern = CompiledPattern::compile("/api/orders/*").unwrap();
//! assert!(pattern.matches("/api/orders/42"));
//! assert!(!pattern.matches("/api/orders/42/items"));
//! ```

use std::sync::OnceLock;

use dashmap::DashMap;
use regex::{Regex, RegexBuilder};

use crate::error::{AuthzError, AuthzResult};

/// Marker in a path pattern that matches an arbitrary non-empty suffix.
pub const REGEX_TOKEN: &str = "{REGEX}";

/// Stand-in for `{REGEX}` while the rest of the pattern is escaped.
/// Contains NUL bytes so it cannot collide with configured path text.
const PLACEHOLDER: &str = "\x00DYNREGEX\x00";

/// Upper bound on the compiled automaton size for the first compile attempt.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

// =============================================================================
// Compiled Pattern
// =============================================================================

/// A path pattern compiled to an anchored, case-insensitive regex.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile a path pattern.
    ///
    /// Identical derived regexes share one compiled instance through a
    /// process-wide cache, so rules repeating the same pattern compile the
    /// regex engine exactly once.
    ///
    /// # Errors
    ///
    /// Returns an error if the derived regex fails to compile both with and
    /// without the size limit.
    pub fn compile(path_pattern: &str) -> AuthzResult<Self> {
        let source = path_pattern_to_regex(path_pattern);
        let regex = get_or_compile_regex(&source)?;
        Ok(Self { source, regex })
    }

    /// Check whether the full request path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The derived regex source, kept for diagnostics.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

// =============================================================================
// Translation
// =============================================================================

/// Translate a path pattern into an anchored regex source string.
///
/// The `{REGEX}` token is swapped for a placeholder before the whole pattern
/// is escaped; escaping first would also escape the substitution target and
/// the markers would match literally instead of as regex groups.
#[must_use]
pub fn path_pattern_to_regex(path_pattern: &str) -> String {
    let preprocessed = path_pattern.replace(REGEX_TOKEN, PLACEHOLDER);
    let escaped = regex::escape(&preprocessed);

    let expanded = escaped
        .replace(&regex::escape(PLACEHOLDER), "(.+?)")
        .replace("\\*", "[^/]+");

    format!("^{expanded}$")
}

/// Get a compiled regex from the process-wide cache, compiling on first use.
///
/// Compilation is attempted with a size limit first; oversized patterns fall
/// back to an unbounded compile rather than being rejected outright.
fn get_or_compile_regex(source: &str) -> AuthzResult<Regex> {
    static CACHE: OnceLock<DashMap<String, Regex>> = OnceLock::new();
    let cache = CACHE.get_or_init(DashMap::new);

    if let Some(regex) = cache.get(source) {
        return Ok(regex.clone());
    }

    let regex = RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .or_else(|_| RegexBuilder::new(source).case_insensitive(true).build())
        .map_err(|e| AuthzError::invalid_rule(source, e.to_string()))?;

    cache.insert(source.to_string(), regex.clone());
    Ok(regex)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Translation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_literal_pattern() {
        assert_eq!(path_pattern_to_regex("/api/public"), "^/api/public$");
    }

    #[test]
    fn test_wildcard_becomes_single_segment() {
        assert_eq!(
            path_pattern_to_regex("/api/orders/*"),
            "^/api/orders/[^/]+$"
        );
    }

    #[test]
    fn test_regex_token_becomes_suffix_group() {
        assert_eq!(
            path_pattern_to_regex("/api/reports/{REGEX}"),
            "^/api/reports/(.+?)$"
        );
    }

    #[test]
    fn test_metacharacters_are_escaped() {
        let source = path_pattern_to_regex("/api/v1.0/items");
        assert_eq!(source, "^/api/v1\\.0/items$");

        let pattern = CompiledPattern::compile("/api/v1.0/items").unwrap();
        assert!(pattern.matches("/api/v1.0/items"));
        assert!(!pattern.matches("/api/v1x0/items"));
    }

    // -------------------------------------------------------------------------
    // Matching Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_wildcard_does_not_cross_segments() {
        let pattern = CompiledPattern::compile("/api/products/*").unwrap();
        assert!(pattern.matches("/api/products/42"));
        assert!(pattern.matches("/api/products/abc-def"));
        assert!(!pattern.matches("/api/products/42/reviews"));
        assert!(!pattern.matches("/api/products/"));
    }

    #[test]
    fn test_regex_token_crosses_segments() {
        let pattern = CompiledPattern::compile("/api/reports/{REGEX}").unwrap();
        assert!(pattern.matches("/api/reports/2024"));
        assert!(pattern.matches("/api/reports/2024/q3/summary"));
        assert!(!pattern.matches("/api/reports/"));
        assert!(!pattern.matches("/api/reports"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let pattern = CompiledPattern::compile("/api/Products/*").unwrap();
        assert!(pattern.matches("/API/products/42"));
        assert!(pattern.matches("/api/PRODUCTS/42"));
    }

    #[test]
    fn test_matching_is_anchored() {
        let pattern = CompiledPattern::compile("/api/orders").unwrap();
        assert!(!pattern.matches("/api/orders/42"));
        assert!(!pattern.matches("/v2/api/orders"));
        assert!(pattern.matches("/api/orders"));
    }

    #[test]
    fn test_multiple_wildcards() {
        let pattern = CompiledPattern::compile("/api/*/items/*").unwrap();
        assert!(pattern.matches("/api/shop1/items/42"));
        assert!(!pattern.matches("/api/shop1/sub/items/42"));
    }

    #[test]
    fn test_wildcard_and_regex_token_combined() {
        let pattern = CompiledPattern::compile("/api/*/files/{REGEX}").unwrap();
        assert!(pattern.matches("/api/tenant1/files/a/b/c.txt"));
        assert!(!pattern.matches("/api/t1/t2/files/a"));
    }

    #[test]
    fn test_identical_patterns_share_compiled_regex() {
        let a = CompiledPattern::compile("/api/shared/*").unwrap();
        let b = CompiledPattern::compile("/api/shared/*").unwrap();
        assert_eq!(a.source(), b.source());
        assert!(a.matches("/api/shared/x"));
        assert!(b.matches("/api/shared/x"));
    }
}
