// Health logs: paginated global log list polled every 30 s, with a
// client-side error-message search over the rows already loaded.

use std::sync::Arc;

use uptime_api::HealthLog;

use super::normalize_search;
use crate::error::CoreError;
use crate::pagination::{PageInfo, PageStatus, Paginator};
use crate::queries;
use crate::query::{QueryOptions, QueryState, Subscription};
use crate::runtime::Dashboard;

#[derive(Debug, Clone)]
pub struct LogsModel {
    pub search: Option<String>,
    /// The page as fetched.
    pub logs: QueryState<Vec<HealthLog>>,
    /// Rows of `logs` whose error message matches `search`.
    pub visible: Vec<HealthLog>,
    pub page: PageInfo,
    pub status: PageStatus,
}

pub struct LogsView {
    dashboard: Dashboard,
    pager: Paginator<()>,
    search: Option<String>,
    list: Subscription<Vec<HealthLog>>,
    list_epoch: u64,
}

impl LogsView {
    pub(crate) fn new(dashboard: &Dashboard) -> Result<Self, CoreError> {
        let pager = Paginator::new((), dashboard.config().pagination.default_limit)?;
        let list = subscribe(dashboard, &pager);
        Ok(Self {
            dashboard: dashboard.clone(),
            list_epoch: pager.epoch(),
            pager,
            search: None,
            list,
        })
    }

    /// Narrow the loaded page by error message. Does not refetch and does
    /// not move the window.
    pub fn set_search(&mut self, text: &str) {
        self.search = normalize_search(text).map(|s| s.to_lowercase());
    }

    pub fn set_limit(&mut self, limit: u32) -> Result<bool, CoreError> {
        let changed = self.pager.set_limit(limit)?;
        if changed {
            self.resubscribe();
        }
        Ok(changed)
    }

    pub fn next_page(&mut self) -> bool {
        self.sync();
        let moved = self.pager.next_page();
        if moved {
            self.resubscribe();
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.pager.prev_page();
        if moved {
            self.resubscribe();
        }
        moved
    }

    pub fn snapshot(&mut self) -> LogsModel {
        self.sync();
        let logs = self.list.current();
        let visible = filter_logs(logs.data.as_ref(), self.search.as_deref());
        LogsModel {
            search: self.search.clone(),
            logs,
            visible,
            page: self.pager.page_info(),
            status: self.pager.status(),
        }
    }

    pub async fn changed(&mut self) -> bool {
        self.list.changed().await.is_some()
    }

    pub async fn wait_ready(&mut self) -> LogsModel {
        self.list.wait_settled().await;
        self.snapshot()
    }

    fn sync(&mut self) {
        let state = self.list.current();
        self.pager.observe(self.list_epoch, &state);
    }

    fn resubscribe(&mut self) {
        self.list = subscribe(&self.dashboard, &self.pager);
        self.list_epoch = self.pager.epoch();
    }
}

fn subscribe(dashboard: &Dashboard, pager: &Paginator<()>) -> Subscription<Vec<HealthLog>> {
    queries::health_logs(dashboard.client(), pager.page()).subscribe(
        dashboard.cache(),
        QueryOptions::polled(dashboard.config().polling.health_logs),
    )
}

/// Case-insensitive substring match on the error message. Logs without
/// an error message only match an empty search.
fn filter_logs(logs: Option<&Arc<Vec<HealthLog>>>, needle: Option<&str>) -> Vec<HealthLog> {
    let Some(logs) = logs else {
        return Vec::new();
    };
    match needle {
        None => logs.to_vec(),
        Some(needle) => logs
            .iter()
            .filter(|log| {
                log.error_message
                    .as_deref()
                    .is_some_and(|msg| msg.to_lowercase().contains(needle))
            })
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn log(id: &str, error: Option<&str>) -> HealthLog {
        HealthLog {
            id: id.into(),
            endpoint_id: "ep-1".into(),
            status_code: None,
            response_time_ms: None,
            success: error.is_none(),
            error_message: error.map(str::to_owned),
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn search_matches_error_messages_case_insensitively() {
        let logs = Arc::new(vec![
            log("1", Some("connect ECONNREFUSED 10.0.0.1:443")),
            log("2", None),
            log("3", Some("Timeout after 30000ms")),
        ]);

        let hits = filter_logs(Some(&logs), Some("econnrefused"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");

        assert_eq!(filter_logs(Some(&logs), None).len(), 3);
        assert!(filter_logs(None, Some("timeout")).is_empty());
    }
}
