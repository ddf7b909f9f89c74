//! Alert command handlers.

use tabled::Tabled;
use uptime_core::{Alert, AlertListParams, Dashboard, queries};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::{format, output};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Raised")]
    raised: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Type")]
    alert_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Acked")]
    acknowledged: String,
}

impl AlertRow {
    pub(crate) fn new(a: &Alert, color: bool) -> Self {
        Self {
            id: a.id.clone(),
            raised: format::timestamp(&a.created_at),
            endpoint: a.endpoint_id.clone(),
            alert_type: a.alert_type.to_string(),
            severity: output::paint_severity(a.severity, color),
            message: a.message.clone(),
            acknowledged: format::yes_no(a.is_acknowledged),
        }
    }
}

/// `--open` / `--acknowledged` to the `acknowledged` query parameter.
pub(crate) fn ack_filter(open: bool, acknowledged: bool) -> Option<bool> {
    match (open, acknowledged) {
        (true, _) => Some(false),
        (false, true) => Some(true),
        (false, false) => None,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());

    match args.command {
        AlertsCommand::List {
            page,
            open,
            acknowledged,
            endpoint,
        } => {
            let limit = page.limit.unwrap_or(dashboard.config().pagination.alerts_limit);
            let query = match endpoint {
                Some(id) => queries::endpoint_alerts(dashboard.client(), &id, Some(limit)),
                None => queries::alert_list(
                    dashboard.client(),
                    AlertListParams {
                        acknowledged: ack_filter(open, acknowledged),
                        limit: Some(limit),
                        offset: Some(page.offset),
                    },
                ),
            };
            let alerts = query.fetch(dashboard.cache()).await?;
            let out = output::render_list(
                &global.format(),
                &alerts,
                |a| AlertRow::new(a, color),
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Ack { id } => {
            let alert = dashboard.mutations().acknowledge_alert(&id).await?;
            if !global.quiet {
                eprintln!("Alert {} acknowledged", alert.id);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_filter_maps_flags() {
        assert_eq!(ack_filter(false, false), None);
        assert_eq!(ack_filter(true, false), Some(false));
        assert_eq!(ack_filter(false, true), Some(true));
    }
}
