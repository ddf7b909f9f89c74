// Endpoint detail: the endpoint itself, analytics for a selectable time
// range, its paginated health logs and its latest alerts. Nothing is
// fetched while the id is blank.

use uptime_api::{Alert, Analytics, Endpoint, HealthLog, TimeRange, UpdateEndpointRequest};

use super::RECENT_ALERTS_LIMIT;
use crate::error::CoreError;
use crate::pagination::{PageInfo, PageStatus, Paginator};
use crate::queries;
use crate::query::{QueryOptions, QueryState, Subscription};
use crate::runtime::Dashboard;

#[derive(Debug, Clone)]
pub struct EndpointDetailModel {
    pub endpoint_id: String,
    /// `false` when the id is blank; every query is then disabled.
    pub enabled: bool,
    pub endpoint: QueryState<Endpoint>,
    pub time_range: TimeRange,
    pub analytics: QueryState<Analytics>,
    pub logs: QueryState<Vec<HealthLog>>,
    pub logs_page: PageInfo,
    pub logs_status: PageStatus,
    pub recent_alerts: QueryState<Vec<Alert>>,
}

pub struct EndpointDetailView {
    dashboard: Dashboard,
    endpoint_id: String,
    time_range: TimeRange,
    logs_pager: Paginator<()>,
    endpoint: Subscription<Endpoint>,
    analytics: Subscription<Analytics>,
    logs: Subscription<Vec<HealthLog>>,
    logs_epoch: u64,
    alerts: Subscription<Vec<Alert>>,
}

impl EndpointDetailView {
    pub(crate) fn new(dashboard: &Dashboard, endpoint_id: &str) -> Result<Self, CoreError> {
        let endpoint_id = endpoint_id.trim().to_owned();
        let options = options_for(&endpoint_id);
        let time_range = TimeRange::default();
        let logs_pager = Paginator::new((), dashboard.config().pagination.default_limit)?;

        let client = dashboard.client();
        let cache = dashboard.cache();
        let endpoint = queries::endpoint(client, &endpoint_id).subscribe(cache, options);
        let analytics =
            queries::endpoint_analytics(client, &endpoint_id, time_range).subscribe(cache, options);
        let logs = queries::endpoint_health_logs(client, &endpoint_id, logs_pager.page())
            .subscribe(cache, options);
        let alerts = queries::endpoint_alerts(client, &endpoint_id, Some(RECENT_ALERTS_LIMIT))
            .subscribe(cache, options);

        Ok(Self {
            dashboard: dashboard.clone(),
            logs_epoch: logs_pager.epoch(),
            endpoint_id,
            time_range,
            logs_pager,
            endpoint,
            analytics,
            logs,
            alerts,
        })
    }

    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    pub fn is_enabled(&self) -> bool {
        !self.endpoint_id.is_empty()
    }

    pub fn set_time_range(&mut self, range: TimeRange) -> bool {
        if self.time_range == range {
            return false;
        }
        self.time_range = range;
        self.analytics = queries::endpoint_analytics(self.dashboard.client(), &self.endpoint_id, range)
            .subscribe(self.dashboard.cache(), options_for(&self.endpoint_id));
        true
    }

    pub fn set_logs_limit(&mut self, limit: u32) -> Result<bool, CoreError> {
        let changed = self.logs_pager.set_limit(limit)?;
        if changed {
            self.resubscribe_logs();
        }
        Ok(changed)
    }

    pub fn next_logs_page(&mut self) -> bool {
        self.sync();
        let moved = self.logs_pager.next_page();
        if moved {
            self.resubscribe_logs();
        }
        moved
    }

    pub fn prev_logs_page(&mut self) -> bool {
        let moved = self.logs_pager.prev_page();
        if moved {
            self.resubscribe_logs();
        }
        moved
    }

    pub fn snapshot(&mut self) -> EndpointDetailModel {
        self.sync();
        EndpointDetailModel {
            endpoint_id: self.endpoint_id.clone(),
            enabled: self.is_enabled(),
            endpoint: self.endpoint.current(),
            time_range: self.time_range,
            analytics: self.analytics.current(),
            logs: self.logs.current(),
            logs_page: self.logs_pager.page_info(),
            logs_status: self.logs_pager.status(),
            recent_alerts: self.alerts.current(),
        }
    }

    /// Wait for any of the four queries to change.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            s = self.endpoint.changed() => s.is_some(),
            s = self.analytics.changed() => s.is_some(),
            s = self.logs.changed() => s.is_some(),
            s = self.alerts.changed() => s.is_some(),
        }
    }

    pub async fn wait_ready(&mut self) -> EndpointDetailModel {
        if self.is_enabled() {
            self.endpoint.wait_settled().await;
            self.analytics.wait_settled().await;
            self.logs.wait_settled().await;
            self.alerts.wait_settled().await;
        }
        self.snapshot()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Flip the active flag of the endpoint as currently loaded.
    pub async fn toggle_active(&self) -> Result<Endpoint, CoreError> {
        let Some(endpoint) = self.endpoint.current().data else {
            return Err(CoreError::validation("endpoint", "not loaded yet"));
        };
        self.dashboard.mutations().toggle_endpoint(&endpoint).await
    }

    pub async fn update(&self, update: UpdateEndpointRequest) -> Result<Endpoint, CoreError> {
        self.dashboard
            .mutations()
            .update_endpoint(&self.endpoint_id, update)
            .await
    }

    pub async fn delete(&self) -> Result<(), CoreError> {
        self.dashboard
            .mutations()
            .delete_endpoint(&self.endpoint_id)
            .await
    }

    fn sync(&mut self) {
        let state = self.logs.current();
        self.logs_pager.observe(self.logs_epoch, &state);
    }

    fn resubscribe_logs(&mut self) {
        self.logs = queries::endpoint_health_logs(
            self.dashboard.client(),
            &self.endpoint_id,
            self.logs_pager.page(),
        )
        .subscribe(self.dashboard.cache(), options_for(&self.endpoint_id));
        self.logs_epoch = self.logs_pager.epoch();
    }
}

fn options_for(endpoint_id: &str) -> QueryOptions {
    QueryOptions::default().with_enabled(!endpoint_id.is_empty())
}
