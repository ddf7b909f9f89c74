// ── Runtime dashboard configuration ──
//
// These types describe *how* the data layer talks to the monitoring
// service and how aggressively it refreshes. They never touch disk:
// uptime-config (or a test) constructs a `DashboardConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// Background refresh cadence per resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingConfig {
    pub endpoints: Duration,
    pub alerts: Duration,
    pub health_logs: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            endpoints: Duration::from_secs(10),
            alerts: Duration::from_secs(15),
            health_logs: Duration::from_secs(30),
        }
    }
}

/// Query cache tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a settled entry counts as fresh for new subscribers.
    /// Zero means every new subscription revalidates.
    pub stale_time: Duration,
    /// Sweep interval for idle entries. `None` leaves collection to
    /// explicit [`QueryCache::collect_garbage`](crate::QueryCache::collect_garbage) calls.
    pub gc_interval: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_interval: Some(Duration::from_secs(300)),
        }
    }
}

/// Page sizes used by the list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Initial limit for endpoint and log lists.
    pub default_limit: u32,
    /// Initial limit for the alerts view.
    pub alerts_limit: u32,
    /// Page sizes a user can pick from.
    pub page_sizes: Vec<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            alerts_limit: 25,
            page_sizes: vec![10, 25, 50],
        }
    }
}

/// Everything needed to build a [`Dashboard`](crate::Dashboard).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// API root of the monitoring service (e.g. `http://localhost:3001/api`).
    pub api_url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub polling: PollingConfig,
    pub cache: CacheConfig,
    pub pagination: PaginationConfig,
}

impl DashboardConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            polling: PollingConfig::default(),
            cache: CacheConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}
