// ── View controllers ──
//
// One controller per screen. Each owns its paginator and filters, holds
// the subscriptions for the keys it currently shows, and rebuilds them
// when the user changes page, page size or filter. Consumers read a
// plain view model via `snapshot()` and wait for updates with
// `changed().await`.

mod alerts;
mod dashboard;
mod endpoint_detail;
mod endpoints;
mod logs;

pub use alerts::{AlertTab, AlertsModel, AlertsView};
pub use dashboard::{DashboardModel, DashboardView, RECENT_ALERTS_LIMIT};
pub use endpoint_detail::{EndpointDetailModel, EndpointDetailView};
pub use endpoints::{EndpointsModel, EndpointsView};
pub use logs::{LogsModel, LogsView};

/// Trimmed search text, or `None` when there is nothing to search for.
pub(crate) fn normalize_search(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
