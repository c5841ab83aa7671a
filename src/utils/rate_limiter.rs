//! Per-identifier token bucket.
//!
//! Each identifier gets `rate` tokens per `window`. Buckets refill all at once
//! when a full window has elapsed since the last refill; there is no smooth
//! trickle. Buckets idle for `window * 2` are swept by a background task that
//! wakes at that interval, at most an hour apart.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Upper bound on how long the sweeper sleeps between passes.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy)]
struct Visitor {
    tokens: u32,
    last_refill: Instant,
}

struct Inner {
    visitors: RwLock<HashMap<String, Visitor>>,
    rate: u32,
    window: Duration,
    cleanup: Duration,
}

/// Cheap to clone; clones share the same buckets.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    /// Must be called inside a tokio runtime: it spawns the cleanup task.
    pub fn new(rate: u32, window: Duration) -> Self {
        let cleanup = window
            .checked_mul(2)
            .unwrap_or(Duration::MAX)
            .max(Duration::from_millis(1));
        let inner = Arc::new(Inner {
            visitors: RwLock::new(HashMap::new()),
            rate,
            window,
            cleanup,
        });

        tokio::spawn(cleanup_stale(Arc::downgrade(&inner), cleanup.min(MAX_SWEEP_PERIOD)));

        Self { inner }
    }

    pub fn rate(&self) -> u32 {
        self.inner.rate
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Consume a token for `identifier`, returning whether the request may proceed.
    pub async fn allow(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut visitors = self.inner.visitors.write().await;

        let visitor = match visitors.get_mut(identifier) {
            Some(visitor) => visitor,
            None => {
                if self.inner.rate == 0 {
                    return false;
                }
                visitors.insert(
                    identifier.to_string(),
                    Visitor {
                        tokens: self.inner.rate - 1,
                        last_refill: now,
                    },
                );
                return true;
            }
        };

        if now.duration_since(visitor.last_refill) >= self.inner.window {
            visitor.tokens = self.inner.rate;
            visitor.last_refill = now;
        }

        if visitor.tokens > 0 {
            visitor.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Forget everything known about `identifier`.
    pub async fn reset(&self, identifier: &str) {
        self.inner.visitors.write().await.remove(identifier);
    }

    /// Tokens left for `identifier` without consuming one.
    pub async fn remaining(&self, identifier: &str) -> u32 {
        let visitors = self.inner.visitors.read().await;
        match visitors.get(identifier) {
            None => self.inner.rate,
            Some(v) if Instant::now().duration_since(v.last_refill) >= self.inner.window => self.inner.rate,
            Some(v) => v.tokens,
        }
    }

    /// Number of identifiers currently tracked.
    pub async fn tracked(&self) -> usize {
        self.inner.visitors.read().await.len()
    }

    /// Drop buckets whose last refill is older than the cleanup interval.
    pub async fn purge_stale(&self) -> usize {
        self.inner.purge_stale().await
    }
}

impl Inner {
    async fn purge_stale(&self) -> usize {
        let now = Instant::now();
        let mut visitors = self.visitors.write().await;
        let before = visitors.len();
        visitors.retain(|_, v| now.duration_since(v.last_refill) <= self.cleanup);
        before - visitors.len()
    }
}

async fn cleanup_stale(inner: Weak<Inner>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let removed = inner.purge_stale().await;
        if removed > 0 {
            debug!("Rate limiter removed {} stale visitors", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn allows_exactly_rate_requests_per_window() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));

        for _ in 0..5 {
            assert!(limiter.allow("10.0.0.1").await);
        }
        assert!(!limiter.allow("10.0.0.1").await);
        assert!(!limiter.allow("10.0.0.1").await);

        // Other identifiers have their own bucket
        assert!(limiter.allow("10.0.0.2").await);
    }

    #[tokio::test(start_paused = true)]
    async fn refills_fully_once_the_window_elapses() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.allow("ip").await);
        }
        assert!(!limiter.allow("ip").await);

        // No partial refill before the window is over
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!limiter.allow("ip").await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(limiter.remaining("ip").await, 3);
        for _ in 0..3 {
            assert!(limiter.allow("ip").await);
        }
        assert!(!limiter.allow("ip").await);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_and_reset() {
        let limiter = RateLimiter::new(4, Duration::from_secs(10));
        assert_eq!(limiter.remaining("a").await, 4);

        limiter.allow("a").await;
        limiter.allow("a").await;
        assert_eq!(limiter.remaining("a").await, 2);

        limiter.reset("a").await;
        assert_eq!(limiter.remaining("a").await, 4);
        assert_eq!(limiter.tracked().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_rate_rejects_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(10));
        assert!(!limiter.allow("a").await);
        assert_eq!(limiter.tracked().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_stale_visitors() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        limiter.allow("old").await;

        tokio::time::advance(Duration::from_secs(15)).await;
        limiter.allow("fresh").await;

        tokio::time::advance(Duration::from_secs(6)).await;
        limiter.purge_stale().await;
        assert_eq!(limiter.tracked().await, 1);
        assert_eq!(limiter.remaining("fresh").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_windows_do_not_overflow() {
        let limiter = RateLimiter::new(1, Duration::from_secs(u64::MAX));
        assert!(limiter.allow("a").await);
        assert!(!limiter.allow("a").await);

        // The sweeper wakes up but the bucket is nowhere near stale
        tokio::time::sleep(MAX_SWEEP_PERIOD * 2).await;
        assert_eq!(limiter.tracked().await, 1);
        assert_eq!(limiter.remaining("a").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_sweeps_stale_visitors() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        limiter.allow("a").await;

        // Two cleanup periods: the first tick sees an entry exactly 20s old,
        // the second one removes it.
        tokio::time::sleep(Duration::from_secs(41)).await;
        assert_eq!(limiter.tracked().await, 0);
    }
}
