// ── Mutation API ──
//
// All write operations flow through a unified `Mutation` enum. Each
// variant declares the resource kinds it makes stale; the coordinator
// executes the call and then invalidates those kinds before resolving,
// so a caller that awaits a mutation observes post-mutation data.

mod validate;

use tracing::{info, warn};
use uptime_api::{Alert, CreateEndpointRequest, Endpoint, MonitorClient, UpdateEndpointRequest};

use crate::error::CoreError;
use crate::query::{QueryCache, ResourceKind};

pub use validate::{apply_create_defaults, validate_create, validate_update};

/// All write operations against the monitoring service.
#[derive(Debug, Clone)]
pub enum Mutation {
    // ── Endpoints ────────────────────────────────────────────────────
    CreateEndpoint(CreateEndpointRequest),
    UpdateEndpoint {
        id: String,
        update: UpdateEndpointRequest,
    },
    DeleteEndpoint {
        id: String,
    },

    // ── Alerts ───────────────────────────────────────────────────────
    AcknowledgeAlert {
        id: String,
    },
}

/// Result of a successful mutation.
#[derive(Debug, Clone)]
pub enum MutationResult {
    Endpoint(Endpoint),
    Alert(Alert),
    Deleted,
}

impl Mutation {
    /// Resource kinds whose cached reads this mutation makes stale.
    pub fn invalidates(&self) -> &'static [ResourceKind] {
        match self {
            Self::CreateEndpoint(_) | Self::UpdateEndpoint { .. } | Self::DeleteEndpoint { .. } => {
                &[ResourceKind::Endpoints]
            }
            Self::AcknowledgeAlert { .. } => &[ResourceKind::Alerts],
        }
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateEndpoint(_) => "create-endpoint",
            Self::UpdateEndpoint { .. } => "update-endpoint",
            Self::DeleteEndpoint { .. } => "delete-endpoint",
            Self::AcknowledgeAlert { .. } => "acknowledge-alert",
        }
    }

    /// Client-side checks. A mutation that fails here is never sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::CreateEndpoint(req) => validate_create(req),
            Self::UpdateEndpoint { id, update } => {
                require_id(id)?;
                validate_update(update)
            }
            Self::DeleteEndpoint { id } | Self::AcknowledgeAlert { id } => require_id(id),
        }
    }
}

fn require_id(id: &str) -> Result<(), CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::validation("id", "must not be empty"));
    }
    Ok(())
}

/// Executes mutations and invalidates affected queries.
///
/// Mutations run concurrently; there is no queue. A failed mutation
/// leaves the cache untouched.
#[derive(Clone)]
pub struct MutationCoordinator {
    client: MonitorClient,
    cache: QueryCache,
}

impl MutationCoordinator {
    pub fn new(client: MonitorClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// Validate, execute, then await invalidation of every affected kind.
    pub async fn mutate(&self, mutation: Mutation) -> Result<MutationResult, CoreError> {
        mutation.validate()?;
        let label = mutation.label();
        let kinds = mutation.invalidates();

        let result = match route_mutation(&self.client, mutation).await {
            Ok(result) => result,
            Err(e) => {
                warn!(mutation = label, error = %e, "mutation failed");
                return Err(e);
            }
        };
        info!(mutation = label, "mutation applied");

        let refreshed = self
            .cache
            .invalidate(|key| kinds.contains(&key.kind()))
            .await;
        info!(mutation = label, refreshed, "dependent queries invalidated");

        Ok(result)
    }

    // ── Convenience wrappers ─────────────────────────────────────────

    pub async fn create_endpoint(&self, req: CreateEndpointRequest) -> Result<Endpoint, CoreError> {
        expect_endpoint(self.mutate(Mutation::CreateEndpoint(req)).await?)
    }

    pub async fn update_endpoint(
        &self,
        id: &str,
        update: UpdateEndpointRequest,
    ) -> Result<Endpoint, CoreError> {
        expect_endpoint(
            self.mutate(Mutation::UpdateEndpoint {
                id: id.to_owned(),
                update,
            })
            .await?,
        )
    }

    /// Enable or disable monitoring of an endpoint.
    pub async fn set_endpoint_active(&self, id: &str, active: bool) -> Result<Endpoint, CoreError> {
        self.update_endpoint(
            id,
            UpdateEndpointRequest {
                is_active: Some(active),
                ..UpdateEndpointRequest::default()
            },
        )
        .await
    }

    /// Flip the active flag of an endpoint as last seen.
    pub async fn toggle_endpoint(&self, endpoint: &Endpoint) -> Result<Endpoint, CoreError> {
        self.set_endpoint_active(&endpoint.id, !endpoint.is_active)
            .await
    }

    pub async fn delete_endpoint(&self, id: &str) -> Result<(), CoreError> {
        self.mutate(Mutation::DeleteEndpoint { id: id.to_owned() })
            .await
            .map(|_| ())
    }

    pub async fn acknowledge_alert(&self, id: &str) -> Result<Alert, CoreError> {
        match self
            .mutate(Mutation::AcknowledgeAlert { id: id.to_owned() })
            .await?
        {
            MutationResult::Alert(alert) => Ok(alert),
            other => Err(unexpected(&other)),
        }
    }
}

fn expect_endpoint(result: MutationResult) -> Result<Endpoint, CoreError> {
    match result {
        MutationResult::Endpoint(endpoint) => Ok(endpoint),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(result: &MutationResult) -> CoreError {
    CoreError::Internal(format!("unexpected mutation result: {result:?}"))
}

// ── Mutation routing ─────────────────────────────────────────────────

async fn route_mutation(
    client: &MonitorClient,
    mutation: Mutation,
) -> Result<MutationResult, CoreError> {
    match mutation {
        Mutation::CreateEndpoint(req) => {
            let req = apply_create_defaults(req);
            let endpoint = client.create_endpoint(&req).await?;
            Ok(MutationResult::Endpoint(endpoint))
        }
        Mutation::UpdateEndpoint { id, update } => {
            let endpoint = client.update_endpoint(&id, &update).await?;
            Ok(MutationResult::Endpoint(endpoint))
        }
        Mutation::DeleteEndpoint { id } => {
            client.delete_endpoint(&id).await?;
            Ok(MutationResult::Deleted)
        }
        Mutation::AcknowledgeAlert { id } => {
            let alert = client.acknowledge_alert(&id).await?;
            Ok(MutationResult::Alert(alert))
        }
    }
}
