// ABOUTME: In-memory query cache for clinic API reads with staleness and prefix invalidation
// ABOUTME: LRU eviction behind an async RwLock; a successful import invalidates the pet list family
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use crate::errors::AppResult;
use central_vet_core::constants::{cache, query_keys};
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Query cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCacheConfig {
    /// Entries older than this are refetched
    pub stale_after: Duration,
    /// Maximum entries before LRU eviction
    pub max_entries: usize,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(cache::DEFAULT_STALE_SECS),
            max_entries: cache::DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Hierarchical query key, e.g. `["ownerDetail", "12"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Key made of the given segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The pet list family
    #[must_use]
    pub fn pets() -> Self {
        Self::new([query_keys::PETS])
    }

    /// Key segments
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `self` starts with every segment of `prefix`
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    stored_at: Instant,
}

/// In-memory query cache shared by the flow and list views
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<RwLock<LruCache<QueryKey, CacheEntry>>>,
    config: QueryCacheConfig,
}

impl QueryCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(cache::DEFAULT_MAX_ENTRIES) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create an empty cache
    #[must_use]
    pub fn new(config: QueryCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            config,
        }
    }

    /// Fresh value for `key`, if present
    ///
    /// # Errors
    ///
    /// Returns an error if the stored bytes do not deserialize into `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> AppResult<Option<T>> {
        let mut store = self.store.write().await;
        let is_fresh = store
            .peek(key)
            .map(|entry| entry.stored_at.elapsed() < self.config.stale_after);
        let fresh = match is_fresh {
            Some(true) => store
                .get(key)
                .map(|entry| serde_json::from_slice(&entry.data))
                .transpose()?,
            Some(false) => {
                store.pop(key);
                None
            }
            None => None,
        };
        drop(store);
        Ok(fresh)
    }

    /// Store `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if `value` fails to serialize
    pub async fn set<T: Serialize + Sync>(&self, key: QueryKey, value: &T) -> AppResult<()> {
        let data = serde_json::to_vec(value)?;
        self.store.write().await.put(
            key,
            CacheEntry {
                data,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Drop every entry whose key starts with `prefix`; returns how many went
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut store = self.store.write().await;
        let doomed: Vec<QueryKey> = store
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            store.pop(key);
        }
        drop(store);
        debug!(%prefix, removed = doomed.len(), "query cache invalidated");
        doomed.len()
    }

    /// Whether a fresh entry exists for `key`
    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.store
            .read()
            .await
            .peek(key)
            .is_some_and(|entry| entry.stored_at.elapsed() < self.config.stale_after)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(QueryCacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_removes_whole_family() {
        let cache = QueryCache::default();
        cache.set(QueryKey::pets(), &vec![1, 2, 3]).await.unwrap();
        cache
            .set(QueryKey::new(["pets", "7"]), &"detail")
            .await
            .unwrap();
        cache
            .set(QueryKey::new(["clinics"]), &"list")
            .await
            .unwrap();

        assert_eq!(cache.invalidate(&QueryKey::pets()).await, 2);
        assert!(!cache.contains(&QueryKey::pets()).await);
        assert!(cache.contains(&QueryKey::new(["clinics"])).await);
    }

    #[tokio::test]
    async fn test_stale_entries_are_not_served() {
        let cache = QueryCache::new(QueryCacheConfig {
            stale_after: Duration::from_millis(10),
            max_entries: 4,
        });
        cache.set(QueryKey::pets(), &"old").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let value: Option<String> = cache.get(&QueryKey::pets()).await.unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_key_prefix_matching() {
        let detail = QueryKey::new(["ownerDetail", "3"]);
        assert!(detail.starts_with(&QueryKey::new(["ownerDetail"])));
        assert!(!detail.starts_with(&QueryKey::pets()));
        assert_eq!(detail.to_string(), "[ownerDetail, 3]");
    }
}
