//! Live views: render a view controller's model, then re-render on every
//! change until Ctrl-C.

use std::io::IsTerminal;

use chrono::Utc;
use serde::Serialize;
use uptime_core::{
    Alert, AlertTab, AlertsModel, AlertsView, CoreError, Dashboard, DashboardModel,
    DashboardView, Endpoint, EndpointDetailModel, EndpointDetailView, EndpointsModel,
    EndpointsView, HealthLog, LogsModel, LogsView, PageInfo, QueryState,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs, WatchCommand};
use crate::error::CliError;
use crate::{format, output};

use super::alerts::{AlertRow, ack_filter};
use super::logs::LogRow;

// ── View abstraction ────────────────────────────────────────────────

/// The slice of a view controller the render loop needs.
trait LiveView {
    type Model;

    async fn ready(&mut self) -> Self::Model;
    async fn changed(&mut self) -> bool;
    fn snapshot(&mut self) -> Self::Model;
}

impl LiveView for DashboardView {
    type Model = DashboardModel;

    async fn ready(&mut self) -> DashboardModel {
        self.wait_ready().await
    }
    async fn changed(&mut self) -> bool {
        DashboardView::changed(self).await
    }
    fn snapshot(&mut self) -> DashboardModel {
        DashboardView::snapshot(self)
    }
}

impl LiveView for EndpointsView {
    type Model = EndpointsModel;

    async fn ready(&mut self) -> EndpointsModel {
        self.wait_ready().await
    }
    async fn changed(&mut self) -> bool {
        EndpointsView::changed(self).await
    }
    fn snapshot(&mut self) -> EndpointsModel {
        EndpointsView::snapshot(self)
    }
}

impl LiveView for AlertsView {
    type Model = AlertsModel;

    async fn ready(&mut self) -> AlertsModel {
        self.wait_ready().await
    }
    async fn changed(&mut self) -> bool {
        AlertsView::changed(self).await
    }
    fn snapshot(&mut self) -> AlertsModel {
        AlertsView::snapshot(self)
    }
}

impl LiveView for LogsView {
    type Model = LogsModel;

    async fn ready(&mut self) -> LogsModel {
        self.wait_ready().await
    }
    async fn changed(&mut self) -> bool {
        LogsView::changed(self).await
    }
    fn snapshot(&mut self) -> LogsModel {
        LogsView::snapshot(self)
    }
}

impl LiveView for EndpointDetailView {
    type Model = EndpointDetailModel;

    async fn ready(&mut self) -> EndpointDetailModel {
        self.wait_ready().await
    }
    async fn changed(&mut self) -> bool {
        EndpointDetailView::changed(self).await
    }
    fn snapshot(&mut self) -> EndpointDetailModel {
        EndpointDetailView::snapshot(self)
    }
}

// ── Render loop ─────────────────────────────────────────────────────

struct Frame {
    format: OutputFormat,
    color: bool,
    clear: bool,
    quiet: bool,
}

impl Frame {
    fn new(global: &GlobalOpts) -> Self {
        let format = global.format();
        let clear = format == OutputFormat::Table && std::io::stdout().is_terminal();
        Self {
            color: output::should_color(&global.color_mode()),
            clear,
            format,
            quiet: global.quiet,
        }
    }

    fn show(&self, body: &str) {
        if self.clear {
            // Clear screen, cursor home.
            print!("\x1b[2J\x1b[H");
        }
        output::print_output(body, self.quiet);
    }
}

async fn run<V: LiveView>(
    mut view: V,
    frame: &Frame,
    once: bool,
    render: impl Fn(&V::Model, &Frame) -> String,
) -> Result<(), CliError> {
    let model = view.ready().await;
    frame.show(&render(&model, frame));
    if once {
        return Ok(());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            biased;
            res = &mut ctrl_c => {
                res?;
                break;
            }
            alive = view.changed() => {
                if !alive {
                    break;
                }
                let model = view.snapshot();
                frame.show(&render(&model, frame));
            }
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let frame = Frame::new(global);
    let once = args.once;

    match args.command {
        WatchCommand::Dashboard => run(dashboard.overview(), &frame, once, render_dashboard).await,

        WatchCommand::Endpoints { search } => {
            let mut view = dashboard.endpoints_view()?;
            if let Some(text) = search {
                view.set_search(&text);
            }
            run(view, &frame, once, render_endpoints).await
        }

        WatchCommand::Alerts { open, acknowledged } => {
            let mut view = dashboard.alerts_view()?;
            let tab = match ack_filter(open, acknowledged) {
                None => AlertTab::All,
                Some(false) => AlertTab::Unacknowledged,
                Some(true) => AlertTab::Acknowledged,
            };
            view.set_tab(tab);
            run(view, &frame, once, render_alerts).await
        }

        WatchCommand::Logs { search } => {
            let mut view = dashboard.logs_view()?;
            if let Some(text) = search {
                view.set_search(&text);
            }
            run(view, &frame, once, render_logs).await
        }

        WatchCommand::Endpoint { id } => {
            let view = dashboard.endpoint_detail_view(&id)?;
            if !view.is_enabled() {
                return Err(CliError::Validation {
                    field: "id".into(),
                    reason: "endpoint ID must not be blank".into(),
                });
            }
            run(view, &frame, once, render_detail).await
        }
    }
}

// ── Renderers ───────────────────────────────────────────────────────

/// One-line freshness banner: last fetch age plus refresh failures.
fn status_line<T>(label: &str, state: &QueryState<T>) -> String {
    let mut line = match state.last_fetched_at {
        Some(at) => format!("{label}: updated {}", format::age(&at, Utc::now())),
        None => format!("{label}: loading"),
    };
    if state.is_fetching {
        line.push_str(" (refreshing)");
    }
    if let Some(ref err) = state.error {
        line.push_str(&format!(" | refresh failed: {err}"));
    }
    line
}

fn page_line(page: &PageInfo) -> String {
    if page.shown == 0 {
        return format!("Page {} (empty)", page.current_page);
    }
    format!(
        "Page {} · showing {}-{}{}",
        page.current_page,
        page.range_start,
        page.range_end,
        if page.has_next_page { " · more available" } else { "" }
    )
}

fn first_error<T>(state: &QueryState<T>) -> Option<&CoreError> {
    state.data.is_none().then_some(state.error.as_ref()).flatten()
}

#[derive(Serialize)]
struct DashboardSummary<'a> {
    total_endpoints: usize,
    active_endpoints: usize,
    inactive_endpoints: usize,
    open_alerts: usize,
    recent_alerts: &'a [Alert],
}

fn render_dashboard(model: &DashboardModel, frame: &Frame) -> String {
    if frame.format != OutputFormat::Table {
        let summary = DashboardSummary {
            total_endpoints: model.total_endpoints,
            active_endpoints: model.active_endpoints,
            inactive_endpoints: model.inactive_endpoints,
            open_alerts: model.open_alerts,
            recent_alerts: model.recent_alerts.items(),
        };
        return output::render_single(&frame.format, &summary, |_| String::new(), |s| {
            s.total_endpoints.to_string()
        });
    }
    if let Some(err) = first_error(&model.endpoints) {
        return format!("Error: {err}");
    }

    let mut out = vec![
        status_line("Endpoints", &model.endpoints),
        format!(
            "Total {}  ·  Active {}  ·  Paused {}  ·  Open alerts {}",
            model.total_endpoints,
            model.active_endpoints,
            model.inactive_endpoints,
            model.open_alerts
        ),
        String::new(),
    ];
    if model.recent_alerts.is_empty() {
        out.push("No open alerts".into());
    } else {
        let rows: Vec<_> = model
            .recent_alerts
            .items()
            .iter()
            .map(|a| AlertRow::new(a, frame.color))
            .collect();
        out.push(output::render_table(&rows));
    }
    out.join("\n")
}

fn render_endpoints(model: &EndpointsModel, frame: &Frame) -> String {
    let items: &[Endpoint] = model.endpoints.items();
    if frame.format != OutputFormat::Table {
        return output::render_single(&frame.format, items, |_| String::new(), |e| {
            e.iter().map(|e| e.id.clone()).collect::<Vec<_>>().join("\n")
        });
    }
    if let Some(err) = first_error(&model.endpoints) {
        return format!("Error: {err}");
    }

    let mut out = vec![status_line("Endpoints", &model.endpoints)];
    if let Some(ref search) = model.search {
        out.push(format!("Search: {search}"));
    }
    out.push(page_line(&model.page));
    let rows: Vec<_> = items
        .iter()
        .map(|e| {
            [
                e.name.clone(),
                e.url.clone(),
                format::check_interval(e.check_interval),
                output::paint_status(
                    if e.is_active { "Active" } else { "Paused" },
                    e.is_active,
                    frame.color,
                ),
            ]
            .join("  ")
        })
        .collect();
    out.extend(rows);
    out.join("\n")
}

fn render_alerts(model: &AlertsModel, frame: &Frame) -> String {
    let items: &[Alert] = model.alerts.items();
    if frame.format != OutputFormat::Table {
        return output::render_list(&frame.format, items, |a| AlertRow::new(a, false), |a| {
            a.id.clone()
        });
    }
    if let Some(err) = first_error(&model.alerts) {
        return format!("Error: {err}");
    }

    let rows: Vec<_> = items.iter().map(|a| AlertRow::new(a, frame.color)).collect();
    [
        status_line("Alerts", &model.alerts),
        format!(
            "Tab: {}  ·  Unacknowledged: {}  ·  {}",
            model.tab,
            model.unacknowledged_count,
            page_line(&model.page)
        ),
        output::render_table(&rows),
    ]
    .join("\n")
}

fn render_logs(model: &LogsModel, frame: &Frame) -> String {
    let visible: &[HealthLog] = &model.visible;
    if frame.format != OutputFormat::Table {
        return output::render_list(&frame.format, visible, |l| LogRow::new(l, false), |l| {
            l.id.clone()
        });
    }
    if let Some(err) = first_error(&model.logs) {
        return format!("Error: {err}");
    }

    let rows: Vec<_> = visible.iter().map(|l| LogRow::new(l, frame.color)).collect();
    let mut out = vec![status_line("Health logs", &model.logs)];
    if let Some(ref search) = model.search {
        out.push(format!(
            "Search: {search} ({} of {} rows)",
            visible.len(),
            model.logs.len()
        ));
    }
    out.push(page_line(&model.page));
    out.push(output::render_table(&rows));
    out.join("\n")
}

#[derive(Serialize)]
struct DetailSummary<'a> {
    endpoint: Option<&'a Endpoint>,
    analytics: Option<&'a uptime_core::Analytics>,
    logs: &'a [HealthLog],
    recent_alerts: &'a [Alert],
}

fn render_detail(model: &EndpointDetailModel, frame: &Frame) -> String {
    if frame.format != OutputFormat::Table {
        let summary = DetailSummary {
            endpoint: model.endpoint.data(),
            analytics: model.analytics.data(),
            logs: model.logs.items(),
            recent_alerts: model.recent_alerts.items(),
        };
        return output::render_single(&frame.format, &summary, |_| String::new(), |s| {
            s.endpoint.map(|e| e.id.clone()).unwrap_or_default()
        });
    }
    let Some(endpoint) = model.endpoint.data() else {
        return first_error(&model.endpoint)
            .map_or_else(|| "Loading endpoint...".into(), |err| format!("Error: {err}"));
    };

    let mut out = vec![
        status_line(&endpoint.name, &model.endpoint),
        format!("{} {}", endpoint.method, endpoint.url),
        format!(
            "{} · every {}",
            output::paint_status(
                if endpoint.is_active { "Active" } else { "Paused" },
                endpoint.is_active,
                frame.color
            ),
            format::check_interval(endpoint.check_interval)
        ),
        String::new(),
    ];
    match model.analytics.data() {
        Some(a) => out.push(format!(
            "{}: uptime {} · {} checks · avg {}",
            model.time_range,
            format::uptime(a.uptime_percentage),
            a.total_checks,
            format::response_time(Some(a.average_response_time))
        )),
        None => out.push(format!("{}: no analytics yet", model.time_range)),
    }

    let alert_rows: Vec<_> = model
        .recent_alerts
        .items()
        .iter()
        .map(|a| AlertRow::new(a, frame.color))
        .collect();
    if !alert_rows.is_empty() {
        out.push(String::new());
        out.push("Recent alerts".into());
        out.push(output::render_table(&alert_rows));
    }

    let log_rows: Vec<_> = model
        .logs
        .items()
        .iter()
        .map(|l| LogRow::new(l, frame.color))
        .collect();
    out.push(String::new());
    out.push(format!("Health logs · {}", page_line(&model.logs_page)));
    out.push(output::render_table(&log_rows));
    out.join("\n")
}
