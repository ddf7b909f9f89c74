// ── Query cache ──
//
// Keyed store of remote reads shared by every view. Owns entry
// lifetimes, request de-duplication, polling and invalidation.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::entry::{Entry, FetchFn};
use super::key::{QueryKey, ResourceKind};
use super::state::{AnyData, QueryState, QueryStatus};
use super::subscription::{QueryOptions, Subscription};
use crate::config::CacheConfig;
use crate::error::CoreError;

/// Which entries an invalidation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Every entry of one resource kind.
    Kind(ResourceKind),
    /// Every entry of any listed kind.
    Kinds(&'static [ResourceKind]),
    /// Exactly one key.
    Key(QueryKey),
    All,
}

impl Invalidation {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::Kind(kind) => key.kind() == *kind,
            Self::Kinds(kinds) => kinds.contains(&key.kind()),
            Self::Key(k) => k == key,
            Self::All => true,
        }
    }
}

/// Shared query cache. Cheap to clone; all clones see the same entries.
///
/// Fetches and poll loops run as Tokio tasks, so every method that can
/// start one must be called from within a runtime.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: DashMap<QueryKey, Arc<Entry>>,
    config: CacheConfig,
    cancel: CancellationToken,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                config,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Subscribe to `key`, creating its entry on first use.
    ///
    /// The fetcher is invoked when the entry is due (stale, never
    /// settled, errored, or older than `stale_time`) and on every poll
    /// tick. Concurrent demands for an equal key share one fetch.
    pub fn subscribe<T, F, Fut>(&self, key: QueryKey, fetcher: F, options: QueryOptions) -> Subscription<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let fetch: FetchFn = Arc::new(move || {
            fetcher()
                .map(|result| result.map(|data| -> AnyData { Arc::new(data) }))
                .boxed()
        });

        // Register while the shard lock is held so a concurrent
        // `collect_garbage` cannot drop the entry in between.
        let (entry, id) = {
            let slot = self.inner.entries.entry(key.clone()).or_insert_with(|| {
                Entry::new(key, self.inner.config.stale_time, &self.inner.cancel)
            });
            let entry = Arc::clone(slot.value());
            let id = entry.register(fetch, options);
            (entry, id)
        };

        entry.activate(id);
        debug!(key = %entry.key(), subscriber = id, "subscribed");
        Subscription::new(entry, id)
    }

    /// One-shot read through the cache. Joins an in-flight fetch for the
    /// same key and returns cached data when it is still fresh.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let subscription = self.subscribe::<T, _, _>(key, fetcher, QueryOptions::default());
        let state = subscription.wait_settled().await;
        match state.status {
            QueryStatus::Success => state.data.ok_or_else(|| {
                CoreError::Internal(format!("cached payload for {} has an unexpected type", subscription.key()))
            }),
            QueryStatus::Error => Err(state
                .error
                .unwrap_or_else(|| CoreError::Internal("fetch failed without an error".into()))),
            QueryStatus::Pending => Err(CoreError::Internal(format!(
                "query {} did not settle",
                subscription.key()
            ))),
        }
    }

    /// Current state of `key` without subscribing.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<QueryState<T>> {
        let entry = self.entry(key)?;
        Some(QueryState::from_entry(&entry.snapshot()))
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.entry(key).map_or(0, |e| e.subscriber_count())
    }

    /// Interval of the running poll task for `key`, if any.
    pub fn poll_interval(&self, key: &QueryKey) -> Option<Duration> {
        self.entry(key).and_then(|e| e.poll_interval())
    }

    // ── Invalidation ─────────────────────────────────────────────────

    /// Mark every entry whose key matches `predicate` stale.
    ///
    /// Entries with an enabled subscriber are refetched immediately and
    /// this call returns once a response issued after the invalidation has
    /// been applied, even when an overlapping invalidation superseded its
    /// own refetch. Other entries hide their data and refetch on their next
    /// subscription. Responses to requests issued before the invalidation
    /// are never applied. Returns the number of matched entries.
    pub async fn invalidate<P>(&self, predicate: P) -> usize
    where
        P: Fn(&QueryKey) -> bool,
    {
        let matched: Vec<Arc<Entry>> = self
            .inner
            .entries
            .iter()
            .filter(|r| predicate(r.key()))
            .map(|r| Arc::clone(r.value()))
            .collect();

        let pending: Vec<(Arc<Entry>, u64)> = matched
            .iter()
            .filter_map(|entry| entry.invalidate().map(|generation| (Arc::clone(entry), generation)))
            .collect();

        debug!(
            matched = matched.len(),
            refetching = pending.len(),
            "invalidated queries"
        );
        join_all(
            pending
                .iter()
                .map(|(entry, generation)| entry.wait_applied(*generation)),
        )
        .await;

        matched.len()
    }

    pub async fn invalidate_where(&self, target: &Invalidation) -> usize {
        self.invalidate(|key| target.matches(key)).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Drop entries with no subscribers, no poll task and no fetch in
    /// flight. Returns how many were removed.
    pub fn collect_garbage(&self) -> usize {
        self.inner.collect_garbage()
    }

    /// Run [`collect_garbage`](Self::collect_garbage) every `every` until
    /// shutdown or until the last cache handle is dropped.
    pub fn spawn_gc(&self, every: Duration) {
        tokio::spawn(gc_task(
            Arc::downgrade(&self.inner),
            every,
            self.inner.cancel.child_token(),
        ));
    }

    /// Stop every poll task and the GC sweep. Subscriptions stay readable
    /// and can still refetch on demand.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        for entry in &self.inner.entries {
            entry.value().stop_polling();
        }
        debug!("query cache shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    fn entry(&self, key: &QueryKey) -> Option<Arc<Entry>> {
        self.inner.entries.get(key).map(|r| Arc::clone(r.value()))
    }
}

impl CacheInner {
    fn collect_garbage(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, entry| {
            let idle = entry.is_idle();
            if idle {
                debug!(%key, "collecting idle entry");
                removed += 1;
            }
            !idle
        });
        removed
    }
}

async fn gc_task(cache: Weak<CacheInner>, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = cache.upgrade() else { break };
                let removed = inner.collect_garbage();
                if removed > 0 {
                    debug!(removed, "gc sweep");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;
    use tokio::time::sleep;
    use uptime_api::EndpointListParams;

    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(CacheConfig {
            stale_time: Duration::ZERO,
            gc_interval: None,
        })
    }

    fn key(name: &str) -> QueryKey {
        QueryKey::new(ResourceKind::Endpoints).with("scope", Some(name))
    }

    /// Fetcher returning the call number, counting invocations.
    fn counting(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> futures_util::future::Ready<Result<usize, CoreError>> + Send + Sync + 'static
    {
        let calls = Arc::clone(calls);
        move || futures_util::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_subscribers_share_one_fetch() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let slow = {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(100)).await;
                    Ok(vec![1_u32, 2, 3])
                }
            }
        };

        let a: Subscription<Vec<u32>> = cache.subscribe(key("list"), slow.clone(), QueryOptions::default());
        let b: Subscription<Vec<u32>> = cache.subscribe(key("list"), slow, QueryOptions::default());

        let state_a = a.wait_settled().await;
        let state_b = b.wait_settled().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state_a.items(), &[1, 2, 3]);
        assert_eq!(state_b.items(), &[1, 2, 3]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.subscriber_count(&key("list")), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn absent_params_share_an_entry() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let from_params = QueryKey::from_params(
            ResourceKind::Endpoints,
            &EndpointListParams {
                limit: Some(10),
                offset: Some(0),
                endpoint_name: None,
            },
        );
        let built = QueryKey::new(ResourceKind::Endpoints)
            .with("limit", Some(10_u32))
            .with("offset", Some(0_u32));

        let _a: Subscription<usize> = cache.subscribe(from_params, counting(&calls), QueryOptions::default());
        let _b: Subscription<usize> = cache.subscribe(built, counting(&calls), QueryOptions::default());

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refetch_keeps_previous_data() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let flaky = {
            let calls = Arc::clone(&calls);
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 1 {
                        Ok(String::from("first"))
                    } else {
                        Err(CoreError::Network {
                            message: "connection refused".into(),
                        })
                    }
                }
            }
        };

        let sub: Subscription<String> = cache.subscribe(key("detail"), flaky, QueryOptions::default());
        let first = sub.wait_settled().await;
        assert!(first.is_success());
        assert!(first.last_fetched_at.is_some());

        let second = sub.refetch().await;
        assert_eq!(second.status, QueryStatus::Error);
        assert_eq!(second.data().map(String::as_str), Some("first"));
        assert!(second.error.as_ref().is_some_and(CoreError::is_network));
        assert_eq!(second.last_fetched_at, first.last_fetched_at);
    }

    #[tokio::test(start_paused = true)]
    async fn response_issued_before_invalidation_is_discarded() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let fetcher = {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let gate = Arc::clone(&gate);
                async move {
                    if n == 1 {
                        gate.notified().await;
                    }
                    Ok(n)
                }
            }
        };

        let sub: Subscription<usize> = cache.subscribe(key("list"), fetcher, QueryOptions::default());
        tokio::task::yield_now().await;

        // The first request is still blocked; invalidation issues a second
        // one and waits for it.
        let matched = cache.invalidate(|k| k.kind() == ResourceKind::Endpoints).await;
        assert_eq!(matched, 1);
        assert_eq!(sub.current().data().copied(), Some(2));

        // Let the superseded request complete.
        gate.notify_one();
        sleep(Duration::from_millis(1)).await;

        let state = sub.current();
        assert_eq!(state.data().copied(), Some(2));
        assert!(!state.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_invalidations_resolve_with_fresh_data() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = {
            let calls = Arc::clone(&calls);
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    match n {
                        2 => sleep(Duration::from_millis(10)).await,
                        3 => sleep(Duration::from_millis(500)).await,
                        _ => {}
                    }
                    Ok(n)
                }
            }
        };

        let sub: Subscription<usize> = cache.subscribe(key("list"), fetcher, QueryOptions::default());
        assert_eq!(sub.wait_settled().await.data().copied(), Some(1));

        // The first invalidation's refetch lands first but is superseded by
        // the second one; it must not resolve on the discarded response.
        let first = async {
            cache.invalidate(|k| k.kind() == ResourceKind::Endpoints).await;
            sub.current().data().copied()
        };
        let second = async {
            cache.invalidate(|k| k.kind() == ResourceKind::Endpoints).await;
            sub.current().data().copied()
        };
        let (seen_first, seen_second) = tokio::join!(first, second);

        assert_eq!(seen_first, Some(3));
        assert_eq!(seen_second, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_entries_hide_data_until_refetched_on_subscribe() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let sub: Subscription<usize> = cache.subscribe(key("list"), counting(&calls), QueryOptions::default());
        sub.wait_settled().await;
        drop(sub);

        cache.invalidate_where(&Invalidation::Kind(ResourceKind::Endpoints)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no refetch without subscribers");
        let peeked = cache.peek::<usize>(&key("list")).unwrap();
        assert!(peeked.is_stale);
        assert_eq!(peeked.data(), None);

        let again: Subscription<usize> = cache.subscribe(key("list"), counting(&calls), QueryOptions::default());
        let pending = again.current();
        assert_eq!(pending.data(), None);
        assert!(pending.is_loading());
        let state = again.wait_settled().await;
        assert_eq!(state.data().copied(), Some(2));
        assert!(!state.is_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refetch_after_invalidation_keeps_data_hidden() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let flaky = {
            let calls = Arc::clone(&calls);
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 1 {
                        Ok(n)
                    } else {
                        Err(CoreError::Network {
                            message: "connection refused".into(),
                        })
                    }
                }
            }
        };

        let sub: Subscription<usize> = cache.subscribe(key("list"), flaky.clone(), QueryOptions::default());
        sub.wait_settled().await;
        drop(sub);
        cache.invalidate_where(&Invalidation::All).await;

        let again: Subscription<usize> = cache.subscribe(key("list"), flaky, QueryOptions::default());
        let state = again.wait_settled().await;
        assert!(state.is_error());
        assert_eq!(state.data(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_subscriptions_never_fetch() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let sub: Subscription<usize> = cache.subscribe(
            key("detail"),
            counting(&calls),
            QueryOptions::polled(Duration::from_secs(10)).with_enabled(false),
        );
        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sub.current().is_loading());
        assert_eq!(cache.poll_interval(&key("detail")), None);

        sub.set_enabled(true);
        let state = sub.wait_settled().await;
        assert_eq!(state.data().copied(), Some(1));
        assert_eq!(cache.poll_interval(&key("detail")), Some(Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_refetches_on_interval() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let sub: Subscription<usize> = cache.subscribe(
            key("list"),
            counting(&calls),
            QueryOptions::polled(Duration::from_secs(10)),
        );
        sub.wait_settled().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(35)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        sub.set_enabled(false);
        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn effective_interval_is_minimum_of_enabled_subscribers() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let slow: Subscription<usize> = cache.subscribe(
            key("list"),
            counting(&calls),
            QueryOptions::polled(Duration::from_secs(30)),
        );
        let fast: Subscription<usize> = cache.subscribe(
            key("list"),
            counting(&calls),
            QueryOptions::polled(Duration::from_secs(10)),
        );
        assert_eq!(cache.poll_interval(&key("list")), Some(Duration::from_secs(10)));

        fast.set_enabled(false);
        assert_eq!(cache.poll_interval(&key("list")), Some(Duration::from_secs(30)));

        drop(fast);
        drop(slow);
        assert_eq!(cache.poll_interval(&key("list")), None);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_entries_are_collected() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let kept: Subscription<usize> = cache.subscribe(key("kept"), counting(&calls), QueryOptions::default());
        let dropped: Subscription<usize> = cache.subscribe(key("dropped"), counting(&calls), QueryOptions::default());
        kept.wait_settled().await;
        dropped.wait_settled().await;
        drop(dropped);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.collect_garbage(), 1);
        assert!(cache.contains(&key("kept")));
        assert!(!cache.contains(&key("dropped")));
    }

    #[tokio::test(start_paused = true)]
    async fn mismatched_payload_type_reads_as_no_data() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let sub: Subscription<usize> = cache.subscribe(key("list"), counting(&calls), QueryOptions::default());
        sub.wait_settled().await;

        let wrong = cache.peek::<String>(&key("list")).unwrap();
        assert!(wrong.data.is_none());
        assert!(wrong.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_returns_data_or_error() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache.fetch(key("one-shot"), counting(&calls)).await.unwrap();
        assert_eq!(*value, 1);

        let err = cache
            .fetch::<usize, _, _>(key("broken"), || async {
                Err(CoreError::NotFound {
                    message: "Endpoint not found".into(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_polling() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let sub: Subscription<usize> = cache.subscribe(
            key("list"),
            counting(&calls),
            QueryOptions::polled(Duration::from_secs(10)),
        );
        sub.wait_settled().await;

        cache.shutdown();
        sleep(Duration::from_secs(60)).await;
        assert!(cache.is_shut_down());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.poll_interval(&key("list")), None);
    }
}
