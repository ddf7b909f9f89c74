// Alerts: three concurrently polled lists (all, unacknowledged,
// acknowledged) sharing one window. Switching tabs only changes which
// list is shown, so it is instant whenever the window is unchanged.

use strum::{Display, EnumIter};
use uptime_api::{Alert, AlertListParams, PageParams};

use crate::error::CoreError;
use crate::pagination::{PageInfo, PageStatus, Paginator};
use crate::queries;
use crate::query::{QueryOptions, QueryState, Subscription};
use crate::runtime::Dashboard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AlertTab {
    #[default]
    #[strum(to_string = "All Alerts")]
    All,
    #[strum(to_string = "Unacknowledged")]
    Unacknowledged,
    #[strum(to_string = "Acknowledged")]
    Acknowledged,
}

impl AlertTab {
    /// Value of the `acknowledged` filter for this tab.
    pub fn acknowledged(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Unacknowledged => Some(false),
            Self::Acknowledged => Some(true),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertsModel {
    pub tab: AlertTab,
    /// The list for the active tab.
    pub alerts: QueryState<Vec<Alert>>,
    /// Unacknowledged alerts on the current page, shown as a tab badge.
    pub unacknowledged_count: usize,
    pub page: PageInfo,
    pub status: PageStatus,
}

pub struct AlertsView {
    dashboard: Dashboard,
    pager: Paginator<AlertTab>,
    window: PageParams,
    all: Subscription<Vec<Alert>>,
    unacknowledged: Subscription<Vec<Alert>>,
    acknowledged: Subscription<Vec<Alert>>,
}

impl AlertsView {
    pub(crate) fn new(dashboard: &Dashboard) -> Result<Self, CoreError> {
        let pager = Paginator::new(AlertTab::default(), dashboard.config().pagination.alerts_limit)?;
        let window = pager.page();
        Ok(Self {
            all: subscribe(dashboard, AlertTab::All, window),
            unacknowledged: subscribe(dashboard, AlertTab::Unacknowledged, window),
            acknowledged: subscribe(dashboard, AlertTab::Acknowledged, window),
            dashboard: dashboard.clone(),
            pager,
            window,
        })
    }

    pub fn tab(&self) -> AlertTab {
        *self.pager.filter()
    }

    /// Switch tabs and return to the first page.
    pub fn set_tab(&mut self, tab: AlertTab) -> bool {
        let changed = self.pager.set_filter(tab);
        if changed {
            self.resubscribe();
        }
        changed
    }

    pub fn set_limit(&mut self, limit: u32) -> Result<bool, CoreError> {
        let changed = self.pager.set_limit(limit)?;
        if changed {
            self.resubscribe();
        }
        Ok(changed)
    }

    pub fn next_page(&mut self) -> bool {
        self.sync();
        let moved = self.pager.next_page();
        if moved {
            self.resubscribe();
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.pager.prev_page();
        if moved {
            self.resubscribe();
        }
        moved
    }

    pub fn snapshot(&mut self) -> AlertsModel {
        self.sync();
        AlertsModel {
            tab: self.tab(),
            alerts: self.active().current(),
            unacknowledged_count: self.unacknowledged.current().len(),
            page: self.pager.page_info(),
            status: self.pager.status(),
        }
    }

    /// Wait for any of the three lists to change.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            s = self.all.changed() => s.is_some(),
            s = self.unacknowledged.changed() => s.is_some(),
            s = self.acknowledged.changed() => s.is_some(),
        }
    }

    pub async fn wait_ready(&mut self) -> AlertsModel {
        self.all.wait_settled().await;
        self.unacknowledged.wait_settled().await;
        self.acknowledged.wait_settled().await;
        self.snapshot()
    }

    pub async fn acknowledge(&self, id: &str) -> Result<Alert, CoreError> {
        self.dashboard.mutations().acknowledge_alert(id).await
    }

    fn active(&self) -> &Subscription<Vec<Alert>> {
        match self.tab() {
            AlertTab::All => &self.all,
            AlertTab::Unacknowledged => &self.unacknowledged,
            AlertTab::Acknowledged => &self.acknowledged,
        }
    }

    /// The paginator's epoch tracks tab changes too, so the active list
    /// is always observed under the current epoch.
    fn sync(&mut self) {
        let state = self.active().current();
        let epoch = self.pager.epoch();
        self.pager.observe(epoch, &state);
    }

    /// Re-key the three lists, but only when the window moved: equal keys
    /// would just join the same entries.
    fn resubscribe(&mut self) {
        let window = self.pager.page();
        if window == self.window {
            return;
        }
        self.window = window;
        self.all = subscribe(&self.dashboard, AlertTab::All, window);
        self.unacknowledged = subscribe(&self.dashboard, AlertTab::Unacknowledged, window);
        self.acknowledged = subscribe(&self.dashboard, AlertTab::Acknowledged, window);
    }
}

fn subscribe(dashboard: &Dashboard, tab: AlertTab, window: PageParams) -> Subscription<Vec<Alert>> {
    let params = AlertListParams {
        acknowledged: tab.acknowledged(),
        limit: window.limit,
        offset: window.offset,
    };
    queries::alert_list(dashboard.client(), params).subscribe(
        dashboard.cache(),
        QueryOptions::polled(dashboard.config().polling.alerts),
    )
}
