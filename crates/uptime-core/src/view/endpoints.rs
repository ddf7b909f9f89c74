// Endpoints list: name search, pagination, 10 s polling.

use uptime_api::{CreateEndpointRequest, Endpoint, EndpointListParams};

use super::normalize_search;
use crate::error::CoreError;
use crate::pagination::{PageInfo, PageStatus, Paginator};
use crate::queries;
use crate::query::{QueryOptions, QueryState, Subscription};
use crate::runtime::Dashboard;

#[derive(Debug, Clone)]
pub struct EndpointsModel {
    pub search: Option<String>,
    pub endpoints: QueryState<Vec<Endpoint>>,
    pub page: PageInfo,
    pub status: PageStatus,
}

pub struct EndpointsView {
    dashboard: Dashboard,
    pager: Paginator<Option<String>>,
    list: Subscription<Vec<Endpoint>>,
    list_epoch: u64,
}

impl EndpointsView {
    pub(crate) fn new(dashboard: &Dashboard) -> Result<Self, CoreError> {
        let pager = Paginator::new(None, dashboard.config().pagination.default_limit)?;
        let list = subscribe(dashboard, &pager);
        Ok(Self {
            dashboard: dashboard.clone(),
            list_epoch: pager.epoch(),
            pager,
            list,
        })
    }

    /// Filter by name substring. Blank text clears the filter.
    pub fn set_search(&mut self, text: &str) -> bool {
        let changed = self.pager.set_filter(normalize_search(text));
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

    pub fn snapshot(&mut self) -> EndpointsModel {
        self.sync();
        EndpointsModel {
            search: self.pager.filter().clone(),
            endpoints: self.list.current(),
            page: self.pager.page_info(),
            status: self.pager.status(),
        }
    }

    /// Wait for the visible list to change. `false` once it never will.
    pub async fn changed(&mut self) -> bool {
        self.list.changed().await.is_some()
    }

    /// Wait for the current page's fetch to settle.
    pub async fn wait_ready(&mut self) -> EndpointsModel {
        self.list.wait_settled().await;
        self.snapshot()
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(&self, req: CreateEndpointRequest) -> Result<Endpoint, CoreError> {
        self.dashboard.mutations().create_endpoint(req).await
    }

    pub async fn toggle_active(&self, endpoint: &Endpoint) -> Result<Endpoint, CoreError> {
        self.dashboard.mutations().toggle_endpoint(endpoint).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.dashboard.mutations().delete_endpoint(id).await
    }

    fn sync(&mut self) {
        let state = self.list.current();
        self.pager.observe(self.list_epoch, &state);
    }

    fn resubscribe(&mut self) {
        self.list = subscribe(&self.dashboard, &self.pager);
        self.list_epoch = self.pager.epoch();
    }
}

fn subscribe(
    dashboard: &Dashboard,
    pager: &Paginator<Option<String>>,
) -> Subscription<Vec<Endpoint>> {
    let page = pager.page();
    let params = EndpointListParams {
        limit: page.limit,
        offset: page.offset,
        endpoint_name: pager.filter().clone(),
    };
    queries::endpoint_list(dashboard.client(), params).subscribe(
        dashboard.cache(),
        QueryOptions::polled(dashboard.config().polling.endpoints),
    )
}
