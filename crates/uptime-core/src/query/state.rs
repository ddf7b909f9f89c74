// ── Query state ──
//
// `EntryState` is the type-erased record broadcast through each entry's
// watch channel. `QueryState<T>` is the typed view a subscriber reads.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use strum::Display;
use tracing::warn;

use crate::error::CoreError;

pub(crate) type AnyData = Arc<dyn Any + Send + Sync>;

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryStatus {
    /// No fetch has settled yet.
    #[default]
    Pending,
    /// The most recent applied fetch succeeded.
    Success,
    /// The most recent applied fetch failed. Earlier data is kept.
    Error,
}

#[derive(Clone, Default)]
pub(crate) struct EntryState {
    pub data: Option<AnyData>,
    pub status: QueryStatus,
    pub error: Option<CoreError>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub is_fetching: bool,
    pub is_stale: bool,
    /// Highest fetch generation that has settled, applied or discarded.
    pub settled: u64,
    /// Highest fetch generation whose result was written here.
    pub applied: u64,
    /// Results from generations below this are discarded.
    pub floor: u64,
    /// `data` predates an invalidation that nothing refetched yet.
    /// Typed readers see no data until a fetch succeeds.
    pub withheld: bool,
}

/// Snapshot of one query as seen by a typed subscriber.
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub status: QueryStatus,
    pub error: Option<CoreError>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<T: Send + Sync + 'static> QueryState<T> {
    pub(crate) fn from_entry(entry: &EntryState) -> Self {
        if entry.withheld {
            return Self {
                data: None,
                status: match entry.status {
                    QueryStatus::Success => QueryStatus::Pending,
                    other => other,
                },
                error: entry.error.clone(),
                last_fetched_at: entry.last_fetched_at,
                is_fetching: entry.is_fetching,
                is_stale: true,
            };
        }
        let data = entry.data.clone().and_then(|d| match d.downcast::<T>() {
            Ok(typed) => Some(typed),
            Err(_) => {
                warn!(
                    expected = std::any::type_name::<T>(),
                    "cached payload has a different type than the subscriber"
                );
                None
            }
        });
        Self {
            data,
            status: entry.status,
            error: entry.error.clone(),
            last_fetched_at: entry.last_fetched_at,
            is_fetching: entry.is_fetching,
            is_stale: entry.is_stale,
        }
    }
}

impl<T> QueryState<T> {
    /// Nothing to show yet: no data and the first fetch has not settled.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }
}

impl<T> QueryState<Vec<T>> {
    /// Length of the last known list, 0 when there is none.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> &[T] {
        self.data.as_deref().map(Vec::as_slice).unwrap_or_default()
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
            last_fetched_at: self.last_fetched_at,
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: QueryStatus::Pending,
            error: None,
            last_fetched_at: None,
            is_fetching: false,
            is_stale: false,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for QueryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("data", &self.data)
            .field("status", &self.status)
            .field("error", &self.error)
            .field("last_fetched_at", &self.last_fetched_at)
            .field("is_fetching", &self.is_fetching)
            .field("is_stale", &self.is_stale)
            .finish()
    }
}
