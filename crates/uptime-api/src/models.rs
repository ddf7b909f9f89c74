// Wire models for the monitoring service.
//
// Field names follow the service's camelCase JSON. Request parameter
// structs skip absent fields so they never reach the query string.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ── Enumerations ────────────────────────────────────────────────────

/// HTTP method used by a monitored endpoint's health check.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

/// Why an alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AlertType {
    Down,
    Slow,
    Error,
}

/// Alert severity as assigned by the monitoring service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Outcome of the most recent health check in an analytics window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CheckStatus {
    Up,
    Down,
}

/// Analytics lookback window. The service only accepts these values.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter,
)]
pub enum TimeRange {
    #[strum(to_string = "1 Hour")]
    OneHour,
    #[strum(to_string = "6 Hours")]
    SixHours,
    #[default]
    #[strum(to_string = "24 Hours")]
    OneDay,
    #[strum(to_string = "7 Days")]
    SevenDays,
    #[strum(to_string = "30 Days")]
    ThirtyDays,
}

impl TimeRange {
    /// Window length in hours, as sent in the `hours` query parameter.
    pub fn hours(self) -> u32 {
        match self {
            Self::OneHour => 1,
            Self::SixHours => 6,
            Self::OneDay => 24,
            Self::SevenDays => 168,
            Self::ThirtyDays => 720,
        }
    }

    /// Inverse of [`hours`](Self::hours). Returns `None` for windows the
    /// service does not support.
    pub fn from_hours(hours: u32) -> Option<Self> {
        match hours {
            1 => Some(Self::OneHour),
            6 => Some(Self::SixHours),
            24 => Some(Self::OneDay),
            168 => Some(Self::SevenDays),
            720 => Some(Self::ThirtyDays),
            _ => None,
        }
    }
}

// ── Entities ────────────────────────────────────────────────────────

/// A monitored API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: Option<HashMap<String, String>>,
    pub expected_status: u16,
    /// Minutes between health checks.
    pub check_interval: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recorded health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLog {
    pub id: String,
    pub endpoint_id: String,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<f64>,
    pub success: bool,
    pub error_message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Aggregated check statistics over a [`TimeRange`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_checks: u64,
    pub successful_checks: u64,
    pub failed_checks: u64,
    pub uptime_percentage: f64,
    pub average_response_time: f64,
    pub last_check_status: Option<CheckStatus>,
    pub time_range: String,
}

/// An alert raised by the monitoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub endpoint_id: String,
    pub alert_type: AlertType,
    pub message: String,
    pub severity: Severity,
    pub is_acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

// ── Write payloads ──────────────────────────────────────────────────

/// Body of `POST /endpoints`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEndpointRequest {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<u32>,
}

/// Body of `PUT /endpoints/{id}`. Only present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEndpointRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateEndpointRequest {
    /// `true` when no field would be changed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Query parameters ────────────────────────────────────────────────

/// Offset/limit window shared by every list call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl PageParams {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// Query string for `GET /endpoints`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Case-insensitive name substring filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_name: Option<String>,
}

/// Query string for `GET /alerts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AlertListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Error body returned by the service on non-2xx responses.
///
/// `message` is either a single string or a list of validation messages.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<ErrorMessage>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        match self.message {
            Some(ErrorMessage::One(msg)) => Some(msg),
            Some(ErrorMessage::Many(msgs)) if !msgs.is_empty() => Some(msgs.join("; ")),
            _ => self.error,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alert_deserializes_from_camel_case() {
        let alert: Alert = serde_json::from_value(json!({
            "id": "a1",
            "endpointId": "e1",
            "alertType": "DOWN",
            "message": "Endpoint is down",
            "severity": "HIGH",
            "isAcknowledged": false,
            "createdAt": "2024-06-15T10:30:00Z",
            "acknowledgedAt": null
        }))
        .unwrap();

        assert_eq!(alert.alert_type, AlertType::Down);
        assert_eq!(alert.severity, Severity::High);
        assert!(!alert.is_acknowledged);
        assert!(alert.acknowledged_at.is_none());
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let req = UpdateEndpointRequest {
            is_active: Some(false),
            ..UpdateEndpointRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "isActive": false })
        );
        assert!(!req.is_empty());
        assert!(UpdateEndpointRequest::default().is_empty());
    }

    #[test]
    fn time_range_round_trips_through_hours() {
        use strum::IntoEnumIterator;

        let hours: Vec<u32> = TimeRange::iter().map(TimeRange::hours).collect();
        assert_eq!(hours, vec![1, 6, 24, 168, 720]);
        for range in TimeRange::iter() {
            assert_eq!(TimeRange::from_hours(range.hours()), Some(range));
        }
        assert_eq!(TimeRange::from_hours(12), None);
        assert_eq!(TimeRange::default().to_string(), "24 Hours");
    }

    #[test]
    fn error_body_joins_validation_messages() {
        let body: ErrorBody = serde_json::from_value(json!({
            "statusCode": 400,
            "message": ["name should not be empty", "url must be a URL address"],
            "error": "Bad Request"
        }))
        .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("name should not be empty; url must be a URL address")
        );
    }

    #[test]
    fn http_method_parses_case_insensitively() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
