//! In-memory provider using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use dashx_core::config::cache::MemoryCacheConfig;
use dashx_core::result::AppResult;
use dashx_core::traits::cache::CacheProvider;

/// Stored value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

/// Expires every entry after its own TTL.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory provider. Suitable for development and tests only: state is
/// per-process and lost on restart.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Entry>,
}

impl MemoryCacheProvider {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let entry = Entry {
            value: value.to_string(),
            ttl,
            expires_at: Instant::now() + ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        // Removal can race the eviction of an expired entry.
        Ok(self
            .cache
            .remove(key)
            .await
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        // Collect first; moka iterators must not observe their own removals.
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, _)| key.to_string())
            .collect();

        let mut count = 0u64;
        for key in keys {
            if self.cache.remove(&key).await.is_some() {
                count += 1;
            }
        }

        debug!(pattern, count, "Deleted keys matching pattern");
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Redis-style glob restricted to `*` (any run of characters, including empty).
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all.
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig::default())
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("token:refresh:*:u1", "token:refresh:abc:u1"));
        assert!(!glob_match("token:refresh:*:u1", "token:refresh:abc:u2"));
        assert!(!glob_match("token:refresh:*:u1", "token:reset:abc:u1"));
        assert!(glob_match("pre-user:*", "pre-user:email:a@b.c"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
        assert!(glob_match("a*b*c", "a-x-b-y-c"));
        assert!(!glob_match("ab*ba", "aba"));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = provider();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(cache.exists("k").await.unwrap());

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        // Deleting again is fine.
        cache.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_entries_expire_after_their_own_ttl() {
        let cache = provider();
        cache.set("short", "1", Duration::from_millis(50)).await.unwrap();
        cache.set("long", "2", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.get("long").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_take_returns_value_once() {
        let cache = provider();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.take("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.take("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_take_skips_expired_entry() {
        let cache = provider();
        cache.set("k", "v", Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.take("k").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_take_has_single_winner() {
        let cache = provider();
        for round in 0..50 {
            let key = format!("token:refresh:{round}:u1");
            cache.set(&key, "v", Duration::from_secs(60)).await.unwrap();

            let barrier = std::sync::Arc::new(tokio::sync::Barrier::new(8));
            let tasks: Vec<_> = (0..8)
                .map(|_| {
                    let cache = cache.clone();
                    let key = key.clone();
                    let barrier = barrier.clone();
                    tokio::spawn(async move {
                        barrier.wait().await;
                        cache.take(&key).await.unwrap()
                    })
                })
                .collect();

            let mut winners = 0;
            for task in tasks {
                if task.await.unwrap().is_some() {
                    winners += 1;
                }
            }
            assert_eq!(winners, 1, "round {round}");
        }
    }

    #[tokio::test]
    async fn test_delete_pattern_only_touches_matches() {
        let cache = provider();
        let ttl = Duration::from_secs(60);
        cache.set("token:refresh:a:u1", "x", ttl).await.unwrap();
        cache.set("token:refresh:b:u1", "x", ttl).await.unwrap();
        cache.set("token:refresh:c:u2", "x", ttl).await.unwrap();
        cache.set("token:reset:d:u1", "x", ttl).await.unwrap();

        let removed = cache.delete_pattern("token:refresh:*:u1").await.unwrap();
        assert_eq!(removed, 2);
        assert!(cache.exists("token:refresh:c:u2").await.unwrap());
        assert!(cache.exists("token:reset:d:u1").await.unwrap());

        assert_eq!(cache.delete_pattern("token:refresh:*:u1").await.unwrap(), 0);
    }
}
