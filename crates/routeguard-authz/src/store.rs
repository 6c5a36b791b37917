//! Permission store and cache store abstractions.
//!
//! The engine never talks to the system of record directly; it goes through
//! [`PermissionStore`] (what permissions does user X have) and
//! [`PermissionCacheStore`] (a byte-oriented keyed cache such as Redis or an
//! in-process map). Both are supplied by the surrounding application.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::error::AuthzResult;

// =============================================================================
// Traits
// =============================================================================

/// System of record for user permissions.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Fetch the permission set for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be reached.
    async fn permissions_by_user_id(&self, user_id: &str) -> AuthzResult<Vec<String>>;
}

/// Byte-oriented keyed cache with per-entry TTL.
#[async_trait]
pub trait PermissionCacheStore: Send + Sync {
    /// Read a cached value. `None` means absent or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend fails.
    async fn get(&self, key: &str) -> AuthzResult<Option<Vec<u8>>>;

    /// Store a value with a TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend fails.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> AuthzResult<()>;

    /// Remove a cached value. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache backend fails.
    async fn remove(&self, key: &str) -> AuthzResult<()>;
}

// =============================================================================
// In-Memory Cache Store
// =============================================================================

/// In-process [`PermissionCacheStore`] backed by a concurrent map.
///
/// Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: OffsetDateTime,
}

impl MemoryCacheStore {
    /// Create an empty cache store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including not-yet-collected expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PermissionCacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> AuthzResult<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > OffsetDateTime::now_utc() {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        // Entry existed but is stale.
        self.entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> AuthzResult<()> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: OffsetDateTime::now_utc() + ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> AuthzResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryCacheStore::new();
        store
            .set("k", b"value".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let store = MemoryCacheStore::new();
        store
            .set("k", b"value".to_vec(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryCacheStore::new();
        store
            .set("k", b"value".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        // Removing an absent key succeeds.
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = MemoryCacheStore::new();
        store
            .set("k", b"old".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("k", b"new".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len(), 1);
    }
}
