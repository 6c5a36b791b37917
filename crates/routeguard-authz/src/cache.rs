//! TTL-cached user permission lookups.
//!
//! Wraps a [`PermissionStore`] with a keyed byte cache so the system of
//! record is only consulted on cache miss. Cache faults (read, write, or
//! deserialization failures) are logged and degrade to fetching from the
//! store; they never fail the request. Concurrent callers for the same
//! uncached user may both hit the store; the store is the source of truth,
//! so duplicate fetches are harmless.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AuthzResult;
use crate::store::{PermissionCacheStore, PermissionStore};

/// Cached permission lookup service.
pub struct UserPermissionCache {
    store: Arc<dyn PermissionStore>,
    cache: Arc<dyn PermissionCacheStore>,
    ttl: Duration,
}

impl UserPermissionCache {
    /// Create a new permission cache.
    ///
    /// # Arguments
    ///
    /// * `store` - system of record for permissions
    /// * `cache` - keyed byte cache with per-entry TTL
    /// * `ttl` - how long a cached permission set remains valid
    #[must_use]
    pub fn new(
        store: Arc<dyn PermissionStore>,
        cache: Arc<dyn PermissionCacheStore>,
        ttl: Duration,
    ) -> Self {
        Self { store, cache, ttl }
    }

    /// Get a user's permission set, cached.
    ///
    /// An empty `user_id` yields an empty set without touching the cache or
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns an error only if the permission store itself fails; cache
    /// faults are swallowed and logged.
    pub async fn permissions(&self, user_id: &str) -> AuthzResult<Vec<String>> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }

        let key = cache_key(user_id);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(permissions) => return Ok(permissions),
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %e,
                        "Discarding undecodable cached permission entry"
                    );
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to read permissions from cache"
                );
            }
        }

        let permissions = self.store.permissions_by_user_id(user_id).await?;

        match serde_json::to_vec(&permissions) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, bytes, self.ttl).await {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %e,
                        "Failed to write permissions to cache"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to serialize permissions for caching"
                );
            }
        }

        Ok(permissions)
    }

    /// Drop the cached entry for a user so the next lookup refetches.
    ///
    /// Call this whenever the application mutates a user's permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend fails.
    pub async fn invalidate(&self, user_id: &str) -> AuthzResult<()> {
        self.cache.remove(&cache_key(user_id)).await
    }

    /// Whether the user holds a specific permission (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the permission store fails.
    pub async fn user_has_permission(
        &self,
        user_id: &str,
        permission: &str,
    ) -> AuthzResult<bool> {
        if user_id.is_empty() || permission.is_empty() {
            return Ok(false);
        }

        let permissions = self.permissions(user_id).await?;
        Ok(permissions
            .iter()
            .any(|p| p.eq_ignore_ascii_case(permission)))
    }
}

fn cache_key(user_id: &str) -> String {
    format!("perms:{user_id}")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthzError;
    use crate::store::MemoryCacheStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -------------------------------------------------------------------------
    // Mock Store
    // -------------------------------------------------------------------------

    struct MockPermissionStore {
        permissions: Vec<String>,
        call_count: AtomicUsize,
    }

    impl MockPermissionStore {
        fn with_permissions(permissions: &[&str]) -> Self {
            Self {
                permissions: permissions.iter().map(|s| s.to_string()).collect(),
                call_count: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PermissionStore for MockPermissionStore {
        async fn permissions_by_user_id(&self, _user_id: &str) -> AuthzResult<Vec<String>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(self.permissions.clone())
        }
    }

    struct FailingCacheStore;

    #[async_trait]
    impl PermissionCacheStore for FailingCacheStore {
        async fn get(&self, _key: &str) -> AuthzResult<Option<Vec<u8>>> {
            Err(AuthzError::cache("cache unavailable"))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> AuthzResult<()> {
            Err(AuthzError::cache("cache unavailable"))
        }

        async fn remove(&self, _key: &str) -> AuthzResult<()> {
            Err(AuthzError::cache("cache unavailable"))
        }
    }

    fn make_cache(store: Arc<MockPermissionStore>, ttl: Duration) -> UserPermissionCache {
        UserPermissionCache::new(store, Arc::new(MemoryCacheStore::new()), ttl)
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_user_id_returns_empty_set() {
        let store = Arc::new(MockPermissionStore::with_permissions(&["a.read"]));
        let cache = make_cache(store.clone(), Duration::from_secs(60));

        let perms = cache.permissions("").await.unwrap();
        assert!(perms.is_empty());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let store = Arc::new(MockPermissionStore::with_permissions(&[
            "orders.read",
            "orders.create",
        ]));
        let cache = make_cache(store.clone(), Duration::from_secs(60));

        let first = cache.permissions("u1").await.unwrap();
        let second = cache.permissions("u1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, vec!["orders.read", "orders.create"]);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let store = Arc::new(MockPermissionStore::with_permissions(&["a.read"]));
        let cache = make_cache(store.clone(), Duration::ZERO);

        cache.permissions("u1").await.unwrap();
        cache.permissions("u1").await.unwrap();

        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_exactly_one_refetch() {
        let store = Arc::new(MockPermissionStore::with_permissions(&["a.read"]));
        let cache = make_cache(store.clone(), Duration::from_secs(60));

        cache.permissions("u1").await.unwrap();
        assert_eq!(store.calls(), 1);

        cache.invalidate("u1").await.unwrap();

        cache.permissions("u1").await.unwrap();
        cache.permissions("u1").await.unwrap();
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_is_per_user() {
        let store = Arc::new(MockPermissionStore::with_permissions(&["a.read"]));
        let cache = make_cache(store.clone(), Duration::from_secs(60));

        cache.permissions("u1").await.unwrap();
        cache.permissions("u2").await.unwrap();
        assert_eq!(store.calls(), 2);

        cache.invalidate("u1").await.unwrap();

        cache.permissions("u2").await.unwrap();
        assert_eq!(store.calls(), 2);
        cache.permissions("u1").await.unwrap();
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test]
    async fn test_cache_fault_degrades_to_store() {
        let store = Arc::new(MockPermissionStore::with_permissions(&["a.read"]));
        let cache = UserPermissionCache::new(
            store.clone(),
            Arc::new(FailingCacheStore),
            Duration::from_secs(60),
        );

        let perms = cache.permissions("u1").await.unwrap();
        assert_eq!(perms, vec!["a.read"]);

        cache.permissions("u1").await.unwrap();
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_refetches() {
        let store = Arc::new(MockPermissionStore::with_permissions(&["a.read"]));
        let byte_cache = Arc::new(MemoryCacheStore::new());
        byte_cache
            .set("perms:u1", b"not json".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let cache = UserPermissionCache::new(store.clone(), byte_cache, Duration::from_secs(60));

        let perms = cache.permissions("u1").await.unwrap();
        assert_eq!(perms, vec!["a.read"]);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_user_has_permission_is_case_insensitive() {
        let store = Arc::new(MockPermissionStore::with_permissions(&["Orders.Read"]));
        let cache = make_cache(store, Duration::from_secs(60));

        assert!(cache.user_has_permission("u1", "orders.read").await.unwrap());
        assert!(!cache.user_has_permission("u1", "orders.write").await.unwrap());
        assert!(!cache.user_has_permission("", "orders.read").await.unwrap());
        assert!(!cache.user_has_permission("u1", "").await.unwrap());
    }
}
