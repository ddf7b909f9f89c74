// ── Query definitions ──
//
// Key + fetcher pairs for every remote read the views make. Keeping
// them in one place guarantees that two views asking for the same data
// build equal keys and therefore share a cache entry.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use uptime_api::{
    Alert, AlertListParams, Analytics, Endpoint, EndpointListParams, HealthLog, MonitorClient,
    PageParams, TimeRange,
};

use crate::error::CoreError;
use crate::query::{QueryCache, QueryKey, QueryOptions, ResourceKind, Subscription};

type Fetch<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;

/// A cacheable remote read: its key and how to perform it.
pub struct Query<T> {
    key: QueryKey,
    fetch: Fetch<T>,
}

impl<T: Send + Sync + 'static> Query<T> {
    fn new<F, Fut>(key: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        Self {
            key,
            fetch: Arc::new(move || fetch().boxed()),
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn subscribe(self, cache: &QueryCache, options: QueryOptions) -> Subscription<T> {
        let fetch = self.fetch;
        cache.subscribe(self.key, move || fetch(), options)
    }

    pub async fn fetch(self, cache: &QueryCache) -> Result<Arc<T>, CoreError> {
        let fetch = self.fetch;
        cache.fetch(self.key, move || fetch()).await
    }
}

// ── Endpoints ────────────────────────────────────────────────────────

pub fn endpoint_list(client: &MonitorClient, params: EndpointListParams) -> Query<Vec<Endpoint>> {
    let key = QueryKey::new(ResourceKind::Endpoints)
        .with("scope", Some("list"))
        .with_params(&params);
    let client = client.clone();
    Query::new(key, move || {
        let client = client.clone();
        let params = params.clone();
        async move { Ok(client.list_endpoints(&params).await?) }
    })
}

pub fn endpoint(client: &MonitorClient, id: &str) -> Query<Endpoint> {
    let key = QueryKey::new(ResourceKind::Endpoints)
        .with("scope", Some("detail"))
        .with("id", Some(id));
    let client = client.clone();
    let id = id.to_owned();
    Query::new(key, move || {
        let client = client.clone();
        let id = id.clone();
        async move { Ok(client.get_endpoint(&id).await?) }
    })
}

// ── Health logs ──────────────────────────────────────────────────────

pub fn health_logs(client: &MonitorClient, page: PageParams) -> Query<Vec<HealthLog>> {
    let key = QueryKey::new(ResourceKind::HealthLogs)
        .with("scope", Some("all"))
        .with_params(&page);
    let client = client.clone();
    Query::new(key, move || {
        let client = client.clone();
        async move { Ok(client.list_health_logs(&page).await?) }
    })
}

pub fn endpoint_health_logs(
    client: &MonitorClient,
    endpoint_id: &str,
    page: PageParams,
) -> Query<Vec<HealthLog>> {
    let key = QueryKey::new(ResourceKind::HealthLogs)
        .with("scope", Some("endpoint"))
        .with("endpointId", Some(endpoint_id))
        .with_params(&page);
    let client = client.clone();
    let endpoint_id = endpoint_id.to_owned();
    Query::new(key, move || {
        let client = client.clone();
        let endpoint_id = endpoint_id.clone();
        async move { Ok(client.list_endpoint_health_logs(&endpoint_id, &page).await?) }
    })
}

pub fn endpoint_analytics(client: &MonitorClient, endpoint_id: &str, range: TimeRange) -> Query<Analytics> {
    let key = QueryKey::new(ResourceKind::Analytics)
        .with("endpointId", Some(endpoint_id))
        .with("hours", Some(range.hours()));
    let client = client.clone();
    let endpoint_id = endpoint_id.to_owned();
    Query::new(key, move || {
        let client = client.clone();
        let endpoint_id = endpoint_id.clone();
        async move { Ok(client.endpoint_analytics(&endpoint_id, range).await?) }
    })
}

// ── Alerts ───────────────────────────────────────────────────────────

pub fn alert_list(client: &MonitorClient, params: AlertListParams) -> Query<Vec<Alert>> {
    let key = QueryKey::new(ResourceKind::Alerts)
        .with("scope", Some("all"))
        .with_params(&params);
    let client = client.clone();
    Query::new(key, move || {
        let client = client.clone();
        async move { Ok(client.list_alerts(&params).await?) }
    })
}

pub fn endpoint_alerts(client: &MonitorClient, endpoint_id: &str, limit: Option<u32>) -> Query<Vec<Alert>> {
    let key = QueryKey::new(ResourceKind::Alerts)
        .with("scope", Some("endpoint"))
        .with("endpointId", Some(endpoint_id))
        .with("limit", limit);
    let client = client.clone();
    let endpoint_id = endpoint_id.to_owned();
    Query::new(key, move || {
        let client = client.clone();
        let endpoint_id = endpoint_id.clone();
        async move { Ok(client.list_endpoint_alerts(&endpoint_id, limit).await?) }
    })
}
