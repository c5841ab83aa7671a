//! In-memory TTL cache.
//!
//! Entries carry an absolute expiry. Reads treat expired entries as absent; a
//! background task sweeps them out every five minutes.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const VIEW_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

type Store<V> = RwLock<HashMap<String, Entry<V>>>;

#[derive(Clone)]
pub struct TtlCache<V> {
    items: Arc<Store<V>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Must be called inside a tokio runtime: it spawns the sweeper.
    pub fn new() -> Self {
        Self::with_sweep_interval(SWEEP_INTERVAL)
    }

    pub fn with_sweep_interval(interval: Duration) -> Self {
        let items = Arc::new(RwLock::new(HashMap::new()));
        tokio::spawn(sweep_expired(Arc::downgrade(&items), interval));
        Self { items }
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.items.write().await.insert(key.into(), entry);
    }

    /// Store the value unless a live entry exists. Check and insert happen
    /// under one write guard; returns whether the value was stored.
    pub async fn insert_if_absent(&self, key: impl Into<String>, value: V, ttl: Duration) -> bool {
        let now = Instant::now();
        let mut items = self.items.write().await;
        let key = key.into();
        if items.get(&key).is_some_and(|entry| now < entry.expires_at) {
            return false;
        }
        items.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        true
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let items = self.items.read().await;
        items
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub async fn exists(&self, key: &str) -> bool {
        let items = self.items.read().await;
        items
            .get(key)
            .map(|entry| Instant::now() < entry.expires_at)
            .unwrap_or(false)
    }

    pub async fn delete(&self, key: &str) {
        self.items.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    /// Stored entries, expired-but-unswept ones included.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn purge_expired(&self) -> usize {
        purge(&self.items).await
    }
}

async fn purge<V>(items: &Store<V>) -> usize {
    let now = Instant::now();
    let mut items = items.write().await;
    let before = items.len();
    items.retain(|_, entry| now < entry.expires_at);
    before - items.len()
}

async fn sweep_expired<V>(items: Weak<Store<V>>, period: Duration) {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let Some(items) = items.upgrade() else {
            break;
        };
        let removed = purge(&items).await;
        if removed > 0 {
            debug!("Cache sweep removed {} expired entries", removed);
        }
    }
}

/// Remembers which IP viewed which post during the last 24 hours.
#[derive(Clone)]
pub struct ViewCountCache {
    cache: TtlCache<()>,
}

impl ViewCountCache {
    pub fn new() -> Self {
        Self { cache: TtlCache::new() }
    }

    pub fn key(post_id: i64, ip: &str) -> String {
        format!("view:{}:{}", post_id, ip)
    }

    pub async fn has_viewed(&self, post_id: i64, ip: &str) -> bool {
        self.cache.exists(&Self::key(post_id, ip)).await
    }

    pub async fn mark_viewed(&self, post_id: i64, ip: &str) {
        self.cache.set(Self::key(post_id, ip), (), VIEW_TTL).await;
    }

    /// Mark the view and report whether it is the first within the TTL.
    pub async fn try_mark(&self, post_id: i64, ip: &str) -> bool {
        self.cache.insert_if_absent(Self::key(post_id, ip), (), VIEW_TTL).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_on_read() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(10)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(!cache.exists("k").await);
        // Still stored until a sweep runs
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired_entries() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("short", 1, Duration::from_secs(5)).await;
        cache.set("long", 2, Duration::from_secs(50)).await;

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.get("long").await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_runs_periodically() {
        let cache: TtlCache<i32> = TtlCache::with_sweep_interval(Duration::from_secs(60));
        cache.set("k", 1, Duration::from_secs(30)).await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_and_clear() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("a", 1, Duration::from_secs(5)).await;
        cache.set("b", 2, Duration::from_secs(5)).await;
        cache.delete("a").await;
        assert_eq!(cache.get("a").await, None);
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn insert_if_absent_respects_live_entries() {
        let cache: TtlCache<i32> = TtlCache::new();
        assert!(cache.insert_if_absent("k", 1, Duration::from_secs(10)).await);
        assert!(!cache.insert_if_absent("k", 2, Duration::from_secs(10)).await);
        assert_eq!(cache.get("k").await, Some(1));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(cache.insert_if_absent("k", 3, Duration::from_secs(10)).await);
        assert_eq!(cache.get("k").await, Some(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_marks_from_one_ip_succeed_once() {
        let views = ViewCountCache::new();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let views = views.clone();
                tokio::spawn(async move { views.try_mark(42, "9.9.9.9").await })
            })
            .collect();

        let mut first = 0;
        for handle in handles {
            if handle.await.unwrap() {
                first += 1;
            }
        }
        assert_eq!(first, 1);
        assert!(views.has_viewed(42, "9.9.9.9").await);
    }

    #[tokio::test(start_paused = true)]
    async fn views_are_remembered_for_a_day() {
        let views = ViewCountCache::new();
        assert_eq!(ViewCountCache::key(7, "1.2.3.4"), "view:7:1.2.3.4");

        assert!(!views.has_viewed(7, "1.2.3.4").await);
        views.mark_viewed(7, "1.2.3.4").await;
        assert!(views.has_viewed(7, "1.2.3.4").await);
        assert!(!views.has_viewed(7, "5.6.7.8").await);

        tokio::time::advance(Duration::from_secs(23 * 60 * 60)).await;
        assert!(views.has_viewed(7, "1.2.3.4").await);

        tokio::time::advance(Duration::from_secs(60 * 60)).await;
        assert!(!views.has_viewed(7, "1.2.3.4").await);
    }
}
