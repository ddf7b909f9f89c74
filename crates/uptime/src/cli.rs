//! Clap derive structures for the `uptime-dash` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// uptime-dash -- terminal dashboard for the uptime monitoring service
#[derive(Debug, Parser)]
#[command(
    name = "uptime-dash",
    version,
    about = "Watch and manage monitored endpoints from the command line",
    long_about = "A terminal front-end for the uptime monitoring service.\n\n\
        Lists endpoints, health logs and alerts, applies changes, and\n\
        keeps live views refreshed by polling in the background.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// API root of the monitoring service (overrides config)
    #[arg(long, short = 'u', env = "UPTIME_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, env = "UPTIME_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "UPTIME_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Effective output format once config defaults are applied.
    pub fn format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage monitored endpoints
    #[command(alias = "ep", alias = "e")]
    Endpoints(EndpointsArgs),

    /// View and acknowledge alerts
    #[command(alias = "al")]
    Alerts(AlertsArgs),

    /// View health-check logs and analytics
    Logs(LogsArgs),

    /// Live, auto-refreshing views
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Shared pagination arguments for list commands.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Max results per page
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Pagination offset
    #[arg(long, default_value = "0")]
    pub offset: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENDPOINTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EndpointsArgs {
    #[command(subcommand)]
    pub command: EndpointsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EndpointsCommand {
    /// List monitored endpoints
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Server-side name search
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show endpoint details with uptime analytics
    Get {
        /// Endpoint ID
        id: String,

        /// Analytics window in hours (1, 6, 24, 168, 720)
        #[arg(long, default_value = "24")]
        hours: u32,
    },

    /// Start monitoring a new endpoint
    Create {
        #[command(flatten)]
        fields: EndpointFields,
    },

    /// Change an existing endpoint
    Update {
        /// Endpoint ID
        id: String,

        #[command(flatten)]
        fields: EndpointFields,
    },

    /// Resume health checks for an endpoint
    Enable {
        /// Endpoint ID
        id: String,
    },

    /// Pause health checks for an endpoint
    Disable {
        /// Endpoint ID
        id: String,
    },

    /// Stop monitoring an endpoint
    #[command(alias = "rm")]
    Delete {
        /// Endpoint ID
        id: String,
    },
}

/// Endpoint attributes shared by `create` and `update`.
#[derive(Debug, Args)]
pub struct EndpointFields {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// URL to check (http or https)
    #[arg(long)]
    pub url: Option<String>,

    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    #[arg(long, short = 'm')]
    pub method: Option<String>,

    /// Expected HTTP status code
    #[arg(long)]
    pub expected_status: Option<u16>,

    /// Minutes between checks
    #[arg(long, short = 'i')]
    pub interval: Option<u32>,

    /// Request header as NAME=VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME=VALUE")]
    pub headers: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALERTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Only unacknowledged alerts
        #[arg(long, conflicts_with = "acknowledged")]
        open: bool,

        /// Only acknowledged alerts
        #[arg(long)]
        acknowledged: bool,

        /// Only alerts for this endpoint (ignores --offset and ack filters)
        #[arg(long, short = 'e')]
        endpoint: Option<String>,
    },

    /// Acknowledge an alert
    Ack {
        /// Alert ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// List health-check results
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Only logs for this endpoint
        #[arg(long, short = 'e')]
        endpoint: Option<String>,

        /// Keep rows whose error message contains this text
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Uptime analytics for one endpoint
    Analytics {
        /// Endpoint ID
        id: String,

        /// Analytics window in hours (1, 6, 24, 168, 720)
        #[arg(long, default_value = "24")]
        hours: u32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(subcommand)]
    pub command: WatchCommand,

    /// Render the first complete snapshot and exit
    #[arg(long, global = true)]
    pub once: bool,
}

#[derive(Debug, Subcommand)]
pub enum WatchCommand {
    /// Endpoint counts and the latest open alerts
    #[command(alias = "overview")]
    Dashboard,

    /// Alert list with tab filter
    Alerts {
        /// Only unacknowledged alerts
        #[arg(long, conflicts_with = "acknowledged")]
        open: bool,

        /// Only acknowledged alerts
        #[arg(long)]
        acknowledged: bool,
    },

    /// Endpoint list
    Endpoints {
        /// Server-side name search
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Global health logs
    Logs {
        /// Keep rows whose error message contains this text
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// One endpoint with analytics, logs and recent alerts
    Endpoint {
        /// Endpoint ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG & COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init {
        /// Write defaults without prompting
        #[arg(long)]
        defaults: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
