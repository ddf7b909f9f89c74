// Endpoint resource calls
//
// Listing with name search + offset/limit, single lookup, and the three
// write operations the dashboard exposes.

use tracing::debug;

use crate::client::MonitorClient;
use crate::error::Error;
use crate::models::{CreateEndpointRequest, Endpoint, EndpointListParams, UpdateEndpointRequest};

impl MonitorClient {
    /// List monitored endpoints.
    ///
    /// `GET /endpoints?limit=&offset=&endpointName=`
    pub async fn list_endpoints(&self, params: &EndpointListParams) -> Result<Vec<Endpoint>, Error> {
        let url = self.url(&["endpoints"])?;
        debug!(?params, "listing endpoints");
        self.get(url, Some(params)).await
    }

    /// Fetch a single endpoint.
    ///
    /// `GET /endpoints/{id}`
    pub async fn get_endpoint(&self, id: &str) -> Result<Endpoint, Error> {
        let url = self.url(&["endpoints", id])?;
        self.get(url, None::<&()>).await
    }

    /// Register a new endpoint for monitoring.
    ///
    /// `POST /endpoints`
    pub async fn create_endpoint(&self, req: &CreateEndpointRequest) -> Result<Endpoint, Error> {
        let url = self.url(&["endpoints"])?;
        debug!(name = %req.name, "creating endpoint");
        self.post(url, req).await
    }

    /// Partially update an endpoint.
    ///
    /// `PUT /endpoints/{id}`
    pub async fn update_endpoint(
        &self,
        id: &str,
        req: &UpdateEndpointRequest,
    ) -> Result<Endpoint, Error> {
        let url = self.url(&["endpoints", id])?;
        debug!(id, "updating endpoint");
        self.put(url, Some(req)).await
    }

    /// Stop monitoring and remove an endpoint.
    ///
    /// `DELETE /endpoints/{id}`
    pub async fn delete_endpoint(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&["endpoints", id])?;
        debug!(id, "deleting endpoint");
        self.delete(url).await
    }
}
