//! Health log command handlers.

use tabled::Tabled;
use uptime_core::{Dashboard, HealthLog, PageParams, queries};

use crate::cli::{GlobalOpts, LogsArgs, LogsCommand};
use crate::error::CliError;
use crate::{format, output};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct LogRow {
    #[tabled(rename = "Checked")]
    checked: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Response")]
    response: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl LogRow {
    pub(crate) fn new(l: &HealthLog, color: bool) -> Self {
        Self {
            checked: format::timestamp(&l.checked_at),
            endpoint: l.endpoint_id.clone(),
            result: output::paint_status(if l.success { "UP" } else { "DOWN" }, l.success, color),
            status: l.status_code.map_or_else(|| "-".into(), |s| s.to_string()),
            response: format::response_time(l.response_time_ms),
            error: l.error_message.clone().unwrap_or_default(),
        }
    }
}

fn matches_search(log: &HealthLog, needle: &str) -> bool {
    log.error_message
        .as_deref()
        .is_some_and(|msg| msg.to_lowercase().contains(needle))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: LogsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());

    match args.command {
        LogsCommand::List {
            page,
            endpoint,
            search,
        } => {
            let window = PageParams::new(
                page.limit.unwrap_or(dashboard.config().pagination.default_limit),
                page.offset,
            );
            let query = match endpoint {
                Some(id) => queries::endpoint_health_logs(dashboard.client(), &id, window),
                None => queries::health_logs(dashboard.client(), window),
            };
            let logs = query.fetch(dashboard.cache()).await?;

            let needle = search
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty());
            let visible: Vec<HealthLog> = match needle {
                Some(ref needle) => logs
                    .iter()
                    .filter(|l| matches_search(l, needle))
                    .cloned()
                    .collect(),
                None => logs.to_vec(),
            };

            let out = output::render_list(
                &global.format(),
                &visible,
                |l| LogRow::new(l, color),
                |l| l.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LogsCommand::Analytics { id, hours } => {
            let range = util::time_range(hours)?;
            let analytics = queries::endpoint_analytics(dashboard.client(), &id, range)
                .fetch(dashboard.cache())
                .await?;
            let out = output::render_single(
                &global.format(),
                analytics.as_ref(),
                |a| {
                    [
                        format!("Endpoint:      {id}"),
                        format!("Window:        {}", a.time_range),
                        format!("Uptime:        {}", format::uptime(a.uptime_percentage)),
                        format!("Total checks:  {}", a.total_checks),
                        format!("Successful:    {}", a.successful_checks),
                        format!("Failed:        {}", a.failed_checks),
                        format!(
                            "Avg response:  {}",
                            format::response_time(Some(a.average_response_time))
                        ),
                        format!(
                            "Last check:    {}",
                            a.last_check_status
                                .map_or_else(|| "-".into(), |s| s.to_string())
                        ),
                    ]
                    .join("\n")
                },
                |a| format::uptime(a.uptime_percentage),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
