//! Config-backed permission store for the reference host.

use async_trait::async_trait;
use indexmap::IndexMap;

use routeguard_authz::{AuthzResult, PermissionStore};

/// Permission store serving the static `[users]` table from the config file.
///
/// Unknown users resolve to an empty permission set rather than an error.
pub struct StaticPermissionStore {
    assignments: IndexMap<String, Vec<String>>,
}

impl StaticPermissionStore {
    #[must_use]
    pub fn new(assignments: IndexMap<String, Vec<String>>) -> Self {
        Self { assignments }
    }
}

#[async_trait]
impl PermissionStore for StaticPermissionStore {
    async fn permissions_by_user_id(&self, user_id: &str) -> AuthzResult<Vec<String>> {
        Ok(self.assignments.get(user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_users() {
        let mut assignments = IndexMap::new();
        assignments.insert("alice".to_string(), vec!["products.update".to_string()]);
        let store = StaticPermissionStore::new(assignments);

        let perms = store.permissions_by_user_id("alice").await.unwrap();
        assert_eq!(perms, vec!["products.update"]);

        let perms = store.permissions_by_user_id("nobody").await.unwrap();
        assert!(perms.is_empty());
    }
}
