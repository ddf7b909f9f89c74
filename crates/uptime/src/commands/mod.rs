//! Command dispatch: bridges CLI args -> core queries/mutations -> output formatting.

pub mod alerts;
pub mod config_cmd;
pub mod endpoints;
pub mod logs;
pub mod util;
pub mod watch;

use uptime_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Endpoints(args) => endpoints::handle(dashboard, args, global).await,
        Command::Alerts(args) => alerts::handle(dashboard, args, global).await,
        Command::Logs(args) => logs::handle(dashboard, args, global).await,
        Command::Watch(args) => watch::handle(dashboard, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not use the monitoring service".into(),
        )),
    }
}
