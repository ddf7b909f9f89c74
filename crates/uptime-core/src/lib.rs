//! Client-side data synchronization layer for the uptime dashboard.
//!
//! Sits between `uptime-api` and presentation front-ends:
//!
//! - **[`QueryCache`]**: keyed store of remote reads. Concurrent demands
//!   for an equal [`QueryKey`] share one fetch; entries poll on the
//!   shortest interval any enabled subscriber asks for; failed refetches
//!   keep the last good data. Subscribers hold a reactive
//!   [`Subscription<T>`] backed by a `tokio::sync::watch` channel.
//!
//! - **[`MutationCoordinator`]**: executes a [`Mutation`] and, on success,
//!   invalidates every resource kind it declares before resolving, so a
//!   caller that awaits it observes post-mutation data. Responses to
//!   requests issued before the invalidation are discarded.
//!
//! - **[`Paginator`]**: offset/limit state machine that infers "has next
//!   page" from whether the last page came back full.
//!
//! - **View controllers** ([`view`]): one per screen, each owning its
//!   filters, paginator and subscriptions.
//!
//! - **[`Dashboard`]**: composition root that owns client, cache and
//!   coordinator and hands out views.

pub mod config;
pub mod error;
pub mod mutation;
pub mod pagination;
pub mod queries;
pub mod query;
pub mod runtime;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CacheConfig, DashboardConfig, PaginationConfig, PollingConfig, TlsVerification};
pub use error::CoreError;
pub use mutation::{Mutation, MutationCoordinator, MutationResult};
pub use pagination::{PAGE_SIZES, PageInfo, PageStatus, Paginator};
pub use query::{
    Invalidation, ParamValue, QueryCache, QueryKey, QueryOptions, QueryState, QueryStatus,
    ResourceKind, Subscription, SubscriptionStream,
};
pub use runtime::Dashboard;
pub use view::{
    AlertTab, AlertsModel, AlertsView, DashboardModel, DashboardView, EndpointDetailModel,
    EndpointDetailView, EndpointsModel, EndpointsView, LogsModel, LogsView,
};

// Wire types consumers need alongside the views.
pub use uptime_api::{
    Alert, AlertListParams, AlertType, Analytics, CheckStatus, CreateEndpointRequest, Endpoint,
    EndpointListParams, HealthLog, HttpMethod, MonitorClient, PageParams, Severity, TimeRange,
    UpdateEndpointRequest,
};
