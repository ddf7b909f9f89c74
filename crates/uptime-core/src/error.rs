// ── Core error types ──
//
// User-facing errors from uptime-core. Consumers never see reqwest
// errors or JSON parse failures directly: the `From<uptime_api::Error>`
// impl folds them into network / server / internal variants.
//
// `Clone` so a failed fetch can be broadcast to every subscriber of a key.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach monitoring service: {message}")]
    Network { message: String },

    #[error("Request to monitoring service timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Server ───────────────────────────────────────────────────────
    #[error("Monitoring service rejected the request (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Client-side ──────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Transport-level failure: the request may never have reached the
    /// service.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// The service answered with a non-2xx status.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::NotFound { .. })
    }

    /// Rejected locally; no request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<uptime_api::Error> for CoreError {
    fn from(err: uptime_api::Error) -> Self {
        match err {
            uptime_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if let Some(status) = e.status() {
                    CoreError::Server {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Network {
                        message: e.to_string(),
                    }
                }
            }
            uptime_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            uptime_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            uptime_api::Error::Tls(msg) => CoreError::Network {
                message: format!("TLS error: {msg}"),
            },
            uptime_api::Error::Server {
                status: 404,
                message,
            } => CoreError::NotFound { message },
            uptime_api::Error::Server { status, message } => CoreError::Server { status, message },
            uptime_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response body: {message}"))
            }
        }
    }
}
