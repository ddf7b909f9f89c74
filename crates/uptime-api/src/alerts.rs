// Alert calls
//
// Acknowledgement is the only alert write; the service creates and
// resolves alerts on its own.

use serde::Serialize;
use tracing::debug;

use crate::client::MonitorClient;
use crate::error::Error;
use crate::models::{Alert, AlertListParams};

#[derive(Serialize)]
struct LimitQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl MonitorClient {
    /// List alerts, optionally filtered by acknowledgement state.
    ///
    /// `GET /alerts?acknowledged=&limit=&offset=`
    pub async fn list_alerts(&self, params: &AlertListParams) -> Result<Vec<Alert>, Error> {
        let url = self.url(&["alerts"])?;
        debug!(?params, "listing alerts");
        self.get(url, Some(params)).await
    }

    /// Most recent alerts for one endpoint.
    ///
    /// `GET /alerts/endpoint/{id}?limit=`
    pub async fn list_endpoint_alerts(
        &self,
        endpoint_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Alert>, Error> {
        let url = self.url(&["alerts", "endpoint", endpoint_id])?;
        self.get(url, Some(&LimitQuery { limit })).await
    }

    /// Acknowledge an alert. The service stamps `acknowledgedAt`.
    ///
    /// `PUT /alerts/{id}/acknowledge`
    pub async fn acknowledge_alert(&self, id: &str) -> Result<Alert, Error> {
        let url = self.url(&["alerts", id, "acknowledge"])?;
        debug!(id, "acknowledging alert");
        self.put(url, None::<&()>).await
    }
}
