// Overview: every endpoint plus the most recent unacknowledged alerts,
// with summary counts.

use uptime_api::{Alert, AlertListParams, Endpoint, EndpointListParams};

use crate::error::CoreError;
use crate::queries;
use crate::query::{QueryOptions, QueryState, Subscription};
use crate::runtime::Dashboard;

/// Alerts shown on the overview and the endpoint detail screen.
pub const RECENT_ALERTS_LIMIT: u32 = 5;

#[derive(Debug, Clone)]
pub struct DashboardModel {
    pub endpoints: QueryState<Vec<Endpoint>>,
    pub recent_alerts: QueryState<Vec<Alert>>,
    pub total_endpoints: usize,
    pub active_endpoints: usize,
    pub inactive_endpoints: usize,
    /// Unacknowledged alerts shown (at most [`RECENT_ALERTS_LIMIT`]).
    pub open_alerts: usize,
}

impl DashboardModel {
    /// Nothing to show yet on either panel.
    pub fn is_loading(&self) -> bool {
        self.endpoints.is_loading() || self.recent_alerts.is_loading()
    }
}

pub struct DashboardView {
    dashboard: Dashboard,
    endpoints: Subscription<Vec<Endpoint>>,
    alerts: Subscription<Vec<Alert>>,
}

impl DashboardView {
    pub(crate) fn new(dashboard: &Dashboard) -> Self {
        let polling = &dashboard.config().polling;
        let endpoints = queries::endpoint_list(dashboard.client(), EndpointListParams::default())
            .subscribe(dashboard.cache(), QueryOptions::polled(polling.endpoints));
        let alerts = queries::alert_list(
            dashboard.client(),
            AlertListParams {
                acknowledged: Some(false),
                limit: Some(RECENT_ALERTS_LIMIT),
                offset: Some(0),
            },
        )
        .subscribe(dashboard.cache(), QueryOptions::polled(polling.alerts));
        Self {
            dashboard: dashboard.clone(),
            endpoints,
            alerts,
        }
    }

    pub fn snapshot(&self) -> DashboardModel {
        let endpoints = self.endpoints.current();
        let recent_alerts = self.alerts.current();

        let total_endpoints = endpoints.len();
        let active_endpoints = endpoints.items().iter().filter(|e| e.is_active).count();
        DashboardModel {
            total_endpoints,
            active_endpoints,
            inactive_endpoints: total_endpoints - active_endpoints,
            open_alerts: recent_alerts.len(),
            endpoints,
            recent_alerts,
        }
    }

    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            s = self.endpoints.changed() => s.is_some(),
            s = self.alerts.changed() => s.is_some(),
        }
    }

    pub async fn wait_ready(&self) -> DashboardModel {
        self.endpoints.wait_settled().await;
        self.alerts.wait_settled().await;
        self.snapshot()
    }

    /// Acknowledge one of the recent alerts. Resolves once the alert
    /// panels have been refreshed.
    pub async fn acknowledge(&self, id: &str) -> Result<Alert, CoreError> {
        self.dashboard.mutations().acknowledge_alert(id).await
    }
}
