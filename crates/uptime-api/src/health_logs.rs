// Health log and analytics calls

use serde::Serialize;
use tracing::debug;

use crate::client::MonitorClient;
use crate::error::Error;
use crate::models::{Analytics, HealthLog, PageParams, TimeRange};

#[derive(Serialize)]
struct AnalyticsQuery {
    hours: u32,
}

impl MonitorClient {
    /// List health checks across all endpoints, newest first.
    ///
    /// `GET /health-logs?limit=&offset=`
    pub async fn list_health_logs(&self, page: &PageParams) -> Result<Vec<HealthLog>, Error> {
        let url = self.url(&["health-logs"])?;
        debug!(?page, "listing health logs");
        self.get(url, Some(page)).await
    }

    /// List health checks for one endpoint.
    ///
    /// `GET /health-logs/endpoint/{id}?limit=&offset=`
    pub async fn list_endpoint_health_logs(
        &self,
        endpoint_id: &str,
        page: &PageParams,
    ) -> Result<Vec<HealthLog>, Error> {
        let url = self.url(&["health-logs", "endpoint", endpoint_id])?;
        debug!(endpoint_id, ?page, "listing endpoint health logs");
        self.get(url, Some(page)).await
    }

    /// Uptime and latency analytics for one endpoint over `range`.
    ///
    /// `GET /health-logs/analytics/{id}?hours=`
    pub async fn endpoint_analytics(
        &self,
        endpoint_id: &str,
        range: TimeRange,
    ) -> Result<Analytics, Error> {
        let url = self.url(&["health-logs", "analytics", endpoint_id])?;
        let query = AnalyticsQuery {
            hours: range.hours(),
        };
        self.get(url, Some(&query)).await
    }
}
