// ── Cache entries ──
//
// One entry per query key. The watch channel carries the observable
// state; the mutex guards bookkeeping (fetcher, generations, subscriber
// options, poll task). Lock order is always control -> watch, and the
// control lock is never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::key::QueryKey;
use super::state::{AnyData, EntryState, QueryStatus};
use super::subscription::QueryOptions;
use crate::error::CoreError;

pub(crate) type FetchFn =
    Arc<dyn Fn() -> BoxFuture<'static, Result<AnyData, CoreError>> + Send + Sync>;

pub(crate) struct Entry {
    key: QueryKey,
    state: watch::Sender<EntryState>,
    control: Mutex<Control>,
    stale_time: Duration,
    /// Parent of every poll task token; cancelled on cache shutdown.
    cancel: CancellationToken,
}

#[derive(Default)]
struct Control {
    fetcher: Option<FetchFn>,
    /// Last generation handed out.
    issued: u64,
    /// Last generation whose result was written into the state.
    applied: u64,
    /// Results from generations below this are discarded.
    floor: u64,
    in_flight: Option<u64>,
    stale: bool,
    settled_at: Option<Instant>,
    subscribers: HashMap<u64, QueryOptions>,
    next_subscriber: u64,
    poll: Option<PollTask>,
}

struct PollTask {
    interval: Duration,
    cancel: CancellationToken,
}

impl Control {
    fn has_enabled_subscriber(&self) -> bool {
        self.subscribers.values().any(|o| o.enabled)
    }

    /// Shortest interval requested by an enabled subscriber.
    fn effective_interval(&self) -> Option<Duration> {
        self.subscribers
            .values()
            .filter(|o| o.enabled)
            .filter_map(|o| o.poll_interval)
            .filter(|d| !d.is_zero())
            .min()
    }
}

impl Entry {
    pub(crate) fn new(key: QueryKey, stale_time: Duration, cancel: &CancellationToken) -> Arc<Self> {
        let (state, _) = watch::channel(EntryState::default());
        Arc::new(Self {
            key,
            state,
            control: Mutex::new(Control::default()),
            stale_time,
            cancel: cancel.clone(),
        })
    }

    pub(crate) fn key(&self) -> &QueryKey {
        &self.key
    }

    pub(crate) fn watch(&self) -> watch::Receiver<EntryState> {
        self.state.subscribe()
    }

    pub(crate) fn snapshot(&self) -> EntryState {
        self.state.borrow().clone()
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Subscribers ──────────────────────────────────────────────────

    /// Record a subscriber. The most recent fetcher wins; equal keys are
    /// expected to describe the same remote read.
    pub(crate) fn register(&self, fetcher: FetchFn, options: QueryOptions) -> u64 {
        let mut control = self.control();
        control.fetcher = Some(fetcher);
        control.next_subscriber += 1;
        let id = control.next_subscriber;
        control.subscribers.insert(id, options);
        id
    }

    pub(crate) fn unregister(self: &Arc<Self>, id: u64) {
        let mut control = self.control();
        control.subscribers.remove(&id);
        self.reconcile_poll(&mut control);
    }

    /// Start a fetch for subscriber `id` if it is enabled and the entry
    /// is due, then bring the poll task in line with the subscriber set.
    pub(crate) fn activate(self: &Arc<Self>, id: u64) -> Option<u64> {
        let mut control = self.control();
        let enabled = control.subscribers.get(&id).is_some_and(|o| o.enabled);
        let generation = if enabled && self.is_due(&control) {
            self.start_fetch(&mut control, false)
        } else {
            None
        };
        self.reconcile_poll(&mut control);
        generation
    }

    pub(crate) fn set_enabled(self: &Arc<Self>, id: u64, enabled: bool) -> Option<u64> {
        {
            let mut control = self.control();
            if let Some(options) = control.subscribers.get_mut(&id) {
                options.enabled = enabled;
            }
        }
        self.activate(id)
    }

    pub(crate) fn is_enabled(&self, id: u64) -> bool {
        self.control().subscribers.get(&id).is_some_and(|o| o.enabled)
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.control().subscribers.len()
    }

    /// No subscribers, no poll task and nothing in flight.
    pub(crate) fn is_idle(&self) -> bool {
        let control = self.control();
        control.subscribers.is_empty() && control.poll.is_none() && control.in_flight.is_none()
    }

    pub(crate) fn poll_interval(&self) -> Option<Duration> {
        self.control().poll.as_ref().map(|p| p.interval)
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Join the in-flight fetch or start a new one. Returns the
    /// generation to wait for, `None` when no fetcher is registered.
    pub(crate) fn fetch(self: &Arc<Self>) -> Option<u64> {
        let mut control = self.control();
        self.start_fetch(&mut control, false)
    }

    /// Mark the entry stale. With an enabled subscriber a fresh fetch is
    /// issued at once and its generation returned; otherwise the retained
    /// data is withheld from readers until the next subscription refetches.
    /// Either way, responses to requests issued before this call are
    /// discarded.
    pub(crate) fn invalidate(self: &Arc<Self>) -> Option<u64> {
        let mut control = self.control();
        control.stale = true;
        if control.has_enabled_subscriber() {
            return self.start_fetch(&mut control, true);
        }
        control.floor = control.issued + 1;
        let floor = control.floor;
        self.state.send_modify(|s| {
            s.is_stale = true;
            s.withheld = s.data.is_some();
            s.floor = floor;
        });
        debug!(key = %self.key, "marked stale");
        None
    }

    /// Wait until generation `generation` has settled, applied or not.
    pub(crate) async fn wait_settled(&self, generation: u64) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| s.settled >= generation).await;
    }

    /// Wait until a result at or above both `generation` and the current
    /// invalidation floor has been applied. A later invalidation raises the
    /// floor and supersedes `generation`, so the wait follows it. Returns
    /// early when nothing is in flight that could satisfy it.
    pub(crate) async fn wait_applied(&self, generation: u64) {
        let mut rx = self.state.subscribe();
        let _ = rx
            .wait_for(|s| {
                s.applied >= generation.max(s.floor)
                    || (!s.is_fetching && s.settled >= generation)
            })
            .await;
    }

    fn is_due(&self, control: &Control) -> bool {
        control.stale
            || self.state.borrow().status == QueryStatus::Error
            || control
                .settled_at
                .is_none_or(|at| at.elapsed() >= self.stale_time)
    }

    fn start_fetch(self: &Arc<Self>, control: &mut Control, invalidating: bool) -> Option<u64> {
        match control.in_flight {
            Some(generation) if !invalidating && generation >= control.floor => {
                debug!(key = %self.key, generation, "joining in-flight fetch");
                return Some(generation);
            }
            _ => {}
        }
        let fetcher = control.fetcher.clone()?;

        control.issued += 1;
        let generation = control.issued;
        control.in_flight = Some(generation);
        if invalidating {
            control.floor = generation;
        }
        let floor = control.floor;
        self.state.send_modify(|s| {
            s.is_fetching = true;
            s.floor = floor;
        });
        debug!(key = %self.key, generation, invalidating, "fetch issued");

        let entry = Arc::clone(self);
        tokio::spawn(async move {
            let result = fetcher().await;
            entry.settle(generation, result);
        });
        Some(generation)
    }

    fn settle(&self, generation: u64, result: Result<AnyData, CoreError>) {
        let mut control = self.control();
        if control.in_flight == Some(generation) {
            control.in_flight = None;
        }
        let fetching = control.in_flight.is_some();

        if generation <= control.applied || generation < control.floor {
            debug!(
                key = %self.key,
                generation,
                applied = control.applied,
                floor = control.floor,
                "discarding superseded response"
            );
            self.state.send_modify(|s| {
                s.settled = s.settled.max(generation);
                s.is_fetching = fetching;
            });
            return;
        }

        control.applied = generation;
        control.settled_at = Some(Instant::now());
        match result {
            Ok(data) => {
                control.stale = false;
                debug!(key = %self.key, generation, "fetch settled");
                let now = Utc::now();
                self.state.send_modify(|s| {
                    s.data = Some(data);
                    s.status = QueryStatus::Success;
                    s.error = None;
                    s.last_fetched_at = Some(now);
                    s.is_stale = false;
                    s.withheld = false;
                    s.is_fetching = fetching;
                    s.settled = s.settled.max(generation);
                    s.applied = generation;
                });
            }
            Err(err) => {
                warn!(key = %self.key, generation, error = %err, "fetch failed");
                let stale = control.stale;
                self.state.send_modify(|s| {
                    s.status = QueryStatus::Error;
                    s.error = Some(err);
                    s.is_stale = stale;
                    s.is_fetching = fetching;
                    s.settled = s.settled.max(generation);
                    s.applied = generation;
                });
            }
        }
    }

    // ── Polling ──────────────────────────────────────────────────────

    fn reconcile_poll(self: &Arc<Self>, control: &mut Control) {
        let wanted = control.effective_interval();
        if let (Some(task), Some(interval)) = (&control.poll, wanted) {
            if task.interval == interval {
                return;
            }
        }

        if let Some(task) = control.poll.take() {
            task.cancel.cancel();
            debug!(key = %self.key, "polling stopped");
        }
        if let Some(interval) = wanted {
            let cancel = self.cancel.child_token();
            tokio::spawn(poll_task(Arc::clone(self), interval, cancel.clone()));
            debug!(key = %self.key, ?interval, "polling started");
            control.poll = Some(PollTask { interval, cancel });
        }
    }

    pub(crate) fn stop_polling(&self) {
        if let Some(task) = self.control().poll.take() {
            task.cancel.cancel();
        }
    }

    fn next_poll_at(&self, interval: Duration) -> Instant {
        self.control()
            .settled_at
            .map_or_else(|| Instant::now() + interval, |at| at + interval)
    }
}

/// Refetch `interval` after the end of the last settled fetch. Any
/// settle (including one triggered by invalidation) pushes the next
/// tick out, so polls never overlap or pile up.
async fn poll_task(entry: Arc<Entry>, interval: Duration, cancel: CancellationToken) {
    let mut rx = entry.watch();

    loop {
        let deadline = entry.next_poll_at(interval);
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            () = tokio::time::sleep_until(deadline) => {
                let Some(generation) = entry.fetch() else {
                    debug!(key = %entry.key, "no fetcher registered, polling stopped");
                    break;
                };
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = entry.wait_settled(generation) => {}
                }
            }
        }
    }
}
