// ── Offset/limit pagination ──
//
// A small state machine owned by each list view. The server returns no
// total count, so "has a next page" is inferred from whether the last
// page came back full. That inference only ever applies to the page it
// was observed on: every filter, limit or page change starts a new
// epoch and forgets it.

use strum::Display;
use uptime_api::PageParams;

use crate::error::CoreError;
use crate::query::{QueryState, QueryStatus};

/// Page sizes offered by the list views.
pub const PAGE_SIZES: [u32; 3] = [10, 25, 50];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PageStatus {
    /// Nothing requested yet, or the query is disabled.
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Footer information for the current page ("Page N • Showing a-b").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based.
    pub current_page: u32,
    pub offset: u32,
    pub limit: u32,
    /// Rows on the current page.
    pub shown: usize,
    /// 1-based index of the first row shown, or `offset` when empty.
    pub range_start: usize,
    pub range_end: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Filter + window state for one paginated list.
#[derive(Debug, Clone)]
pub struct Paginator<F> {
    filter: F,
    limit: u32,
    offset: u32,
    status: PageStatus,
    epoch: u64,
    /// Row count of the last result seen in the current epoch.
    observed: Option<usize>,
}

impl<F: PartialEq> Paginator<F> {
    pub fn new(filter: F, limit: u32) -> Result<Self, CoreError> {
        check_limit(limit)?;
        Ok(Self {
            filter,
            limit,
            offset: 0,
            status: PageStatus::Idle,
            epoch: 0,
            observed: None,
        })
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    /// Transition counter; results observed under an older epoch are ignored.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Window for the next request.
    pub fn page(&self) -> PageParams {
        PageParams::new(self.limit, self.offset)
    }

    /// Replace the filter and go back to the first page. Returns `false`
    /// when the filter is unchanged.
    pub fn set_filter(&mut self, filter: F) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        self.offset = 0;
        self.transition();
        true
    }

    /// Change the page size and go back to the first page.
    pub fn set_limit(&mut self, limit: u32) -> Result<bool, CoreError> {
        check_limit(limit)?;
        if self.limit == limit {
            return Ok(false);
        }
        self.limit = limit;
        self.offset = 0;
        self.transition();
        Ok(true)
    }

    /// Advance one page when the current one came back full.
    pub fn next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.offset = self.offset.saturating_add(self.limit);
        self.transition();
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.has_prev_page() {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.limit);
        self.transition();
        true
    }

    /// Record the state of the query for `epoch`. Stale epochs are ignored.
    pub fn observe<T>(&mut self, epoch: u64, state: &QueryState<Vec<T>>) {
        if epoch != self.epoch {
            return;
        }
        if let Some(data) = &state.data {
            self.observed = Some(data.len());
        }
        self.status = match state.status {
            QueryStatus::Success => PageStatus::Ready,
            QueryStatus::Error => PageStatus::Error,
            QueryStatus::Pending if state.is_fetching => PageStatus::Loading,
            QueryStatus::Pending => PageStatus::Idle,
        };
    }

    /// Record a result length directly (tests and non-cached callers).
    pub fn observe_len(&mut self, epoch: u64, len: usize) {
        if epoch == self.epoch {
            self.observed = Some(len);
            self.status = PageStatus::Ready;
        }
    }

    pub fn has_next_page(&self) -> bool {
        usize::try_from(self.limit).is_ok_and(|limit| self.observed == Some(limit))
    }

    pub fn has_prev_page(&self) -> bool {
        self.offset > 0
    }

    pub fn page_info(&self) -> PageInfo {
        let shown = self.observed.unwrap_or(0);
        let offset = self.offset as usize;
        PageInfo {
            current_page: self.offset / self.limit + 1,
            offset: self.offset,
            limit: self.limit,
            shown,
            range_start: if shown == 0 { offset } else { offset + 1 },
            range_end: offset + shown,
            has_next_page: self.has_next_page(),
            has_prev_page: self.has_prev_page(),
        }
    }

    fn transition(&mut self) {
        self.epoch += 1;
        self.observed = None;
        self.status = PageStatus::Loading;
    }
}

fn check_limit(limit: u32) -> Result<(), CoreError> {
    if limit == 0 {
        return Err(CoreError::validation("limit", "must be greater than zero"));
    }
    Ok(())
}
