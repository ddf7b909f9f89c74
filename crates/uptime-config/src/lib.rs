//! Shared configuration for uptime-dash front-ends.
//!
//! TOML file plus `UPTIME_`-prefixed environment, layered over built-in
//! defaults and translated to `uptime_core::DashboardConfig`. The CLI adds
//! flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use uptime_core::{
    CacheConfig, DashboardConfig, PaginationConfig, PollingConfig, TlsVerification,
};

/// API root used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub polling: PollingSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub pagination: PaginationSection,
}

/// Presentation defaults for the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// How to reach the monitoring service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollingSection {
    #[serde(default = "default_endpoints_poll")]
    pub endpoints_secs: u64,
    #[serde(default = "default_alerts_poll")]
    pub alerts_secs: u64,
    #[serde(default = "default_logs_poll")]
    pub health_logs_secs: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            endpoints_secs: default_endpoints_poll(),
            alerts_secs: default_alerts_poll(),
            health_logs_secs: default_logs_poll(),
        }
    }
}

fn default_endpoints_poll() -> u64 {
    10
}
fn default_alerts_poll() -> u64 {
    15
}
fn default_logs_poll() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheSection {
    #[serde(default)]
    pub stale_time_ms: u64,

    /// Idle-entry sweep interval; 0 disables the sweeper.
    #[serde(default = "default_gc_interval")]
    pub gc_interval_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            stale_time_ms: 0,
            gc_interval_secs: default_gc_interval(),
        }
    }
}

fn default_gc_interval() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaginationSection {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_alerts_limit")]
    pub alerts_limit: u32,
}

impl Default for PaginationSection {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            alerts_limit: default_alerts_limit(),
        }
    }
}

fn default_limit() -> u32 {
    10
}
fn default_alerts_limit() -> u32 {
    25
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "uptime-dash", "uptime-dash").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("uptime-dash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file is not an
/// error; defaults apply.
///
/// Environment keys nest with a double underscore, e.g.
/// `UPTIME_API__BASE_URL` or `UPTIME_POLLING__ALERTS_SECS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UPTIME_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate `cfg` and build the runtime `DashboardConfig`.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    let api_url: url::Url = cfg
        .api
        .base_url
        .parse()
        .map_err(|_| ConfigError::validation("api.base_url", format!("invalid URL: {}", cfg.api.base_url)))?;
    if !matches!(api_url.scheme(), "http" | "https") {
        return Err(ConfigError::validation(
            "api.base_url",
            format!("expected http or https, got '{}'", api_url.scheme()),
        ));
    }

    if cfg.api.timeout_secs == 0 {
        return Err(ConfigError::validation("api.timeout_secs", "must be at least 1"));
    }

    let tls = if cfg.api.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.api.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let polling = PollingConfig {
        endpoints: poll_interval("polling.endpoints_secs", cfg.polling.endpoints_secs)?,
        alerts: poll_interval("polling.alerts_secs", cfg.polling.alerts_secs)?,
        health_logs: poll_interval("polling.health_logs_secs", cfg.polling.health_logs_secs)?,
    };

    let cache = CacheConfig {
        stale_time: Duration::from_millis(cfg.cache.stale_time_ms),
        gc_interval: (cfg.cache.gc_interval_secs > 0)
            .then(|| Duration::from_secs(cfg.cache.gc_interval_secs)),
    };

    if cfg.pagination.default_limit == 0 {
        return Err(ConfigError::validation("pagination.default_limit", "must be at least 1"));
    }
    if cfg.pagination.alerts_limit == 0 {
        return Err(ConfigError::validation("pagination.alerts_limit", "must be at least 1"));
    }
    let pagination = PaginationConfig {
        default_limit: cfg.pagination.default_limit,
        alerts_limit: cfg.pagination.alerts_limit,
        ..PaginationConfig::default()
    };

    let mut dashboard = DashboardConfig::new(api_url);
    dashboard.tls = tls;
    dashboard.timeout = Duration::from_secs(cfg.api.timeout_secs);
    dashboard.polling = polling;
    dashboard.cache = cache;
    dashboard.pagination = pagination;
    Ok(dashboard)
}

fn poll_interval(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::validation(field, "must be at least 1"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_the_dashboard() {
        let dashboard = to_dashboard_config(&Config::default()).unwrap();
        assert_eq!(dashboard.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(dashboard.tls, TlsVerification::SystemDefaults);
        assert_eq!(dashboard.polling, PollingConfig::default());
        assert_eq!(dashboard.cache, CacheConfig::default());
        assert_eq!(dashboard.pagination, PaginationConfig::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.polling.alerts_secs, 15);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://monitor.internal/api\"\ninsecure = true\n\n\
             [polling]\nalerts_secs = 5\n\n[cache]\ngc_interval_secs = 0\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.api.base_url, "https://monitor.internal/api");
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.polling.alerts_secs, 5);
        assert_eq!(cfg.polling.endpoints_secs, 10);

        let dashboard = to_dashboard_config(&cfg).unwrap();
        assert_eq!(dashboard.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(dashboard.polling.alerts, Duration::from_secs(5));
        assert_eq!(dashboard.cache.gc_interval, None);
    }

    #[test]
    fn save_then_load_preserves_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.api.ca_cert = Some(PathBuf::from("/etc/ssl/monitor-ca.pem"));
        cfg.pagination.alerts_limit = 50;

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn rejects_unusable_values() {
        let mut cfg = Config::default();
        cfg.api.base_url = "ftp://monitor.internal".into();
        assert!(matches!(
            to_dashboard_config(&cfg),
            Err(ConfigError::Validation { ref field, .. }) if field == "api.base_url"
        ));

        let mut cfg = Config::default();
        cfg.polling.health_logs_secs = 0;
        assert!(matches!(
            to_dashboard_config(&cfg),
            Err(ConfigError::Validation { ref field, .. }) if field == "polling.health_logs_secs"
        ));

        let mut cfg = Config::default();
        cfg.pagination.default_limit = 0;
        assert!(to_dashboard_config(&cfg).is_err());
    }
}
