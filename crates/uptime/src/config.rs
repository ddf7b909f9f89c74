//! CLI configuration: thin wrapper around `uptime_config`.
//!
//! Adds `GlobalOpts`-aware resolution so flags (--api-url, --timeout,
//! --insecure, --output) take priority over file and environment values.

use std::path::PathBuf;

use clap::ValueEnum;

use uptime_core::DashboardConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use uptime_config::{Config, config_path, load_config_from, save_config_to};

/// Config file in effect: `--config` if given, else the platform default.
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file and layer CLI flags on top.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&active_path(global))?;
    if let Some(ref url) = global.api_url {
        cfg.api.base_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.api.timeout_secs = timeout;
    }
    if global.insecure {
        cfg.api.insecure = true;
    }
    Ok(cfg)
}

/// Validate the merged config into the runtime form.
pub fn dashboard_config(cfg: &Config) -> Result<DashboardConfig, CliError> {
    Ok(uptime_config::to_dashboard_config(cfg)?)
}

/// Fill `--output` / `--color` from `[defaults]` when not given on the
/// command line. Unrecognized values fall back silently.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&cfg.defaults.color, true).ok();
    }
}
