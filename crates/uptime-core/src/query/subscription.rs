// ── Subscription handles ──
//
// A `Subscription<T>` is a typed, reactive view of one cache entry.
// Holding it keeps the entry active (and polled, if requested);
// dropping it releases the registration.

use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::watch;
use tokio_stream::Stream;
use tokio_stream::wrappers::WatchStream;

use super::entry::Entry;
use super::key::QueryKey;
use super::state::{EntryState, QueryState};

/// Per-subscriber options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Refetch this often while the subscription is enabled.
    pub poll_interval: Option<Duration>,
    /// Disabled subscribers never trigger fetches or polling.
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            poll_interval: None,
            enabled: true,
        }
    }
}

impl QueryOptions {
    pub fn polled(interval: Duration) -> Self {
        Self {
            poll_interval: Some(interval),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Unregisters from the entry on drop.
struct Registration {
    entry: Arc<Entry>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.entry.unregister(self.id);
    }
}

/// Reactive handle to one query.
///
/// `current()` reads the latest state; `changed().await` waits for the
/// next transition. Several subscriptions to equal keys share one entry,
/// one in-flight fetch and one poll task.
pub struct Subscription<T> {
    registration: Registration,
    rx: watch::Receiver<EntryState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub(crate) fn new(entry: Arc<Entry>, id: u64) -> Self {
        let rx = entry.watch();
        Self {
            registration: Registration { entry, id },
            rx,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        self.registration.entry.key()
    }

    /// Latest state without waiting.
    pub fn current(&self) -> QueryState<T> {
        QueryState::from_entry(&self.rx.borrow())
    }

    /// Wait for the next state transition. Returns `None` once the entry
    /// is gone (never while this subscription is alive).
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.rx.changed().await.ok()?;
        Some(QueryState::from_entry(&self.rx.borrow_and_update()))
    }

    /// `true` when a transition happened since the last `changed()`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.registration.entry.is_enabled(self.registration.id)
    }

    /// Enable or disable this subscriber. Enabling fetches when the entry
    /// is due and resumes polling; disabling the last enabled subscriber
    /// stops it.
    pub fn set_enabled(&self, enabled: bool) {
        self.registration
            .entry
            .set_enabled(self.registration.id, enabled);
    }

    /// Fetch now (joining any in-flight fetch) and return the settled state.
    pub async fn refetch(&self) -> QueryState<T> {
        if let Some(generation) = self.registration.entry.fetch() {
            self.registration.entry.wait_settled(generation).await;
        }
        self.current()
    }

    /// Wait until no fetch is in flight and return the state.
    pub async fn wait_settled(&self) -> QueryState<T> {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|s| !s.is_fetching).await;
        self.current()
    }

    /// Convert into a `Stream` that yields the current state first, then
    /// every transition. The registration moves into the stream.
    pub fn into_stream(self) -> SubscriptionStream<T> {
        let Self {
            registration, rx, ..
        } = self;
        SubscriptionStream {
            _registration: registration,
            inner: WatchStream::new(rx),
            _marker: PhantomData,
        }
    }
}

/// Stream adapter returned by [`Subscription::into_stream`].
pub struct SubscriptionStream<T> {
    _registration: Registration,
    inner: WatchStream<EntryState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Stream for SubscriptionStream<T> {
    type Item = QueryState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|next| next.map(|state| QueryState::from_entry(&state)))
    }
}
