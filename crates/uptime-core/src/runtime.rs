// ── Dashboard runtime ──
//
// Composition root: owns the HTTP client, the query cache and the
// mutation coordinator for the lifetime of the application, and hands
// out view controllers that share them.

use std::sync::Arc;

use tracing::info;
use uptime_api::{MonitorClient, TlsMode, TransportConfig};

use crate::config::{DashboardConfig, TlsVerification};
use crate::error::CoreError;
use crate::mutation::MutationCoordinator;
use crate::query::QueryCache;
use crate::view::{AlertsView, DashboardView, EndpointDetailView, EndpointsView, LogsView};

/// Shared data layer. Cheaply cloneable via `Arc`; every view created
/// from one `Dashboard` reads through the same cache.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    client: MonitorClient,
    cache: QueryCache,
    mutations: MutationCoordinator,
}

impl Dashboard {
    /// Build the HTTP client from `config` and start the data layer.
    ///
    /// Must be called inside a Tokio runtime when a GC interval is set.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let client = MonitorClient::new(config.api_url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Start the data layer around an existing client.
    pub fn with_client(config: DashboardConfig, client: MonitorClient) -> Self {
        let cache = QueryCache::new(config.cache.clone());
        if let Some(every) = config.cache.gc_interval {
            cache.spawn_gc(every);
        }
        let mutations = MutationCoordinator::new(client.clone(), cache.clone());
        info!(api_url = %config.api_url, "dashboard data layer started");

        Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                cache,
                mutations,
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &MonitorClient {
        &self.inner.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.inner.mutations
    }

    // ── Views ────────────────────────────────────────────────────────

    // List views fail only when the configured page size is zero.

    pub fn endpoints_view(&self) -> Result<EndpointsView, CoreError> {
        EndpointsView::new(self)
    }

    pub fn endpoint_detail_view(&self, endpoint_id: &str) -> Result<EndpointDetailView, CoreError> {
        EndpointDetailView::new(self, endpoint_id)
    }

    pub fn alerts_view(&self) -> Result<AlertsView, CoreError> {
        AlertsView::new(self)
    }

    pub fn logs_view(&self) -> Result<LogsView, CoreError> {
        LogsView::new(self)
    }

    pub fn overview(&self) -> DashboardView {
        DashboardView::new(self)
    }

    /// Stop all background polling and GC. In-flight requests finish but
    /// nothing new is scheduled.
    pub fn shutdown(&self) {
        self.inner.cache.shutdown();
        info!("dashboard data layer stopped");
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
