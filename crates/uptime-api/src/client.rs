// Monitoring service HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining, query encoding and
// error-body normalization. Resource calls (endpoints, health logs,
// alerts) are inherent methods in sibling modules so this file stays
// focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Default base URL of a locally running monitoring service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Raw HTTP client for the monitoring service REST API.
///
/// Cheap to clone: `reqwest::Client` is reference counted internally.
#[derive(Debug, Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MonitorClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `http://localhost:3001/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The API root every path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append `segments` to the base URL, keeping any path prefix of the
    /// base (`/api` in the default deployment). Each segment is
    /// percent-encoded, so an id containing `/`, `?` or `#` stays one
    /// segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut full = self.base_url.clone();
        full.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(full)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with an optional query string and decode the body.
    pub(crate) async fn get<T, Q>(&self, url: Url, query: Option<&Q>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!("GET {}", url);

        let mut req = self.http.get(url);
        if let Some(query) = query {
            req = req.query(query);
        }
        let resp = req.send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a PUT request, with a JSON body when given, and decode the response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let mut req = self.http.put(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a DELETE request. Any 2xx response counts as success; the body
    /// is ignored.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::check_status(resp).await.map(|_| ())
    }

    // ── Response handling ────────────────────────────────────────────

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Turn a non-2xx response into [`Error::Server`], pulling the message
    /// out of the JSON error body when there is one.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_owned()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            });

        debug!(status = status.as_u16(), %message, "request rejected");
        Err(Error::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_keeps_base_path_prefix() {
        let client =
            MonitorClient::from_reqwest("http://localhost:3001/api", reqwest::Client::new())
                .unwrap();
        assert_eq!(
            client.url(&["alerts", "a1", "acknowledge"]).unwrap().as_str(),
            "http://localhost:3001/api/alerts/a1/acknowledge"
        );

        let trailing =
            MonitorClient::from_reqwest("http://monitor.local/api/", reqwest::Client::new())
                .unwrap();
        assert_eq!(
            trailing.url(&["endpoints"]).unwrap().as_str(),
            "http://monitor.local/api/endpoints"
        );
    }

    #[test]
    fn url_encodes_ids_as_single_segments() {
        let client =
            MonitorClient::from_reqwest("http://localhost:3001/api", reqwest::Client::new())
                .unwrap();
        let url = client.url(&["endpoints", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/endpoints/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }
}
