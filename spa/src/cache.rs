//! Bounded, time-windowed navigation memoization with single-flight
//! semantics.
//!
//! Avoids duplicate page-function invocations during rapid navigation: a
//! second navigation to a key with an in-flight invocation joins that
//! invocation instead of starting another, and a completed `ok` result is
//! reused within the TTL window. Errors and redirects are never retained;
//! they re-run on the next navigation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use pagecraft_core::result::PageResult;
use tokio::sync::Mutex;

/// Cache parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a completed `ok` result stays reusable.
    pub ttl: Duration,
    /// Maximum number of retained results; the oldest is evicted first.
    pub capacity: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            capacity: 32,
        }
    }
}

type SharedRun = Shared<BoxFuture<'static, Arc<PageResult>>>;

enum Slot {
    InFlight(SharedRun),
    Ready {
        value: Arc<PageResult>,
        inserted_at: Instant,
    },
}

/// The navigation memo. Owned by the dispatcher; never ambient state.
pub struct NavigationCache {
    policy: CachePolicy,
    slots: Mutex<HashMap<String, Slot>>,
}

impl NavigationCache {
    /// An empty cache with the given policy.
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `key`, reusing a fresh result or joining an in-flight
    /// invocation; otherwise runs `run`.
    pub async fn get_or_run<F, Fut>(&self, key: &str, run: F) -> Arc<PageResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PageResult> + Send + 'static,
    {
        let shared = {
            let mut slots = self.slots.lock().await;
            Self::evict_expired(&mut slots, self.policy.ttl);
            match slots.get(key) {
                Some(Slot::Ready { value, .. }) => {
                    tracing::debug!(key, "navigation cache hit");
                    return Arc::clone(value);
                },
                Some(Slot::InFlight(shared)) => {
                    tracing::debug!(key, "joining in-flight navigation");
                    shared.clone()
                },
                None => {
                    let fut = run();
                    let shared: SharedRun =
                        async move { Arc::new(fut.await) }.boxed().shared();
                    slots.insert(key.to_string(), Slot::InFlight(shared.clone()));
                    shared
                },
            }
        };

        let value = shared.await;

        let mut slots = self.slots.lock().await;
        if matches!(slots.get(key), Some(Slot::InFlight(_))) {
            if matches!(value.as_ref(), PageResult::Ok { .. }) {
                slots.insert(
                    key.to_string(),
                    Slot::Ready {
                        value: Arc::clone(&value),
                        inserted_at: Instant::now(),
                    },
                );
                Self::enforce_capacity(&mut slots, self.policy.capacity);
            } else {
                slots.remove(key);
            }
        }
        value
    }

    /// Drop every retained result.
    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    /// Number of slots currently held (in-flight and retained).
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    fn evict_expired(slots: &mut HashMap<String, Slot>, ttl: Duration) {
        slots.retain(|_, slot| match slot {
            Slot::InFlight(_) => true,
            Slot::Ready { inserted_at, .. } => inserted_at.elapsed() <= ttl,
        });
    }

    fn enforce_capacity(slots: &mut HashMap<String, Slot>, capacity: usize) {
        while slots.len() > capacity {
            let oldest = slots
                .iter()
                .filter_map(|(key, slot)| match slot {
                    Slot::Ready { inserted_at, .. } => Some((key.clone(), *inserted_at)),
                    Slot::InFlight(_) => None,
                })
                .min_by_key(|(_, inserted_at)| *inserted_at);
            match oldest {
                Some((key, _)) => {
                    slots.remove(&key);
                },
                // Nothing evictable; every slot is in flight.
                None => break,
            }
        }
    }
}

impl std::fmt::Debug for NavigationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ok_result() -> PageResult {
        PageResult::ok(json!({"n": 1}))
    }

    #[tokio::test]
    async fn ok_results_are_reused_within_ttl() {
        let cache = NavigationCache::new(CachePolicy::default());
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let runs = Arc::clone(&runs);
            let result = cache
                .get_or_run("/a", move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    ok_result()
                })
                .await;
            assert!(matches!(result.as_ref(), PageResult::Ok { .. }));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_invocation() {
        let cache = Arc::new(NavigationCache::new(CachePolicy::default()));
        let runs = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let runs = Arc::clone(&runs);
                tokio::spawn(async move {
                    cache
                        .get_or_run("/shared", move || async move {
                            runs.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            ok_result()
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_ok_results_are_not_retained() {
        let cache = NavigationCache::new(CachePolicy::default());
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let runs = Arc::clone(&runs);
            cache
                .get_or_run("/missing", move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    PageResult::not_found()
                })
                .await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn expired_results_rerun() {
        let cache = NavigationCache::new(CachePolicy {
            ttl: Duration::from_millis(10),
            capacity: 8,
        });
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let runs = Arc::clone(&runs);
            cache
                .get_or_run("/b", move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    ok_result()
                })
                .await;
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_first() {
        let cache = NavigationCache::new(CachePolicy {
            ttl: Duration::from_secs(60),
            capacity: 2,
        });
        for key in ["/1", "/2", "/3"] {
            cache.get_or_run(key, move || async move { ok_result() }).await;
            // Distinct insertion instants.
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(cache.len().await, 2);

        // "/1" was evicted, so it runs again.
        let runs = Arc::new(AtomicUsize::new(0));
        let runs2 = Arc::clone(&runs);
        cache
            .get_or_run("/1", move || async move {
                runs2.fetch_add(1, Ordering::SeqCst);
                ok_result()
            })
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
