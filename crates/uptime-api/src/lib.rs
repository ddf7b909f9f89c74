// uptime-api: Async Rust client for the uptime monitoring service REST API

mod alerts;
pub mod client;
mod endpoints;
pub mod error;
mod health_logs;
pub mod models;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, MonitorClient};
pub use error::Error;
pub use models::{
    Alert, AlertListParams, AlertType, Analytics, CheckStatus, CreateEndpointRequest, Endpoint,
    EndpointListParams, HealthLog, HttpMethod, PageParams, Severity, TimeRange,
    UpdateEndpointRequest,
};
pub use transport::{TlsMode, TransportConfig};
