// ── Endpoint form validation ──
//
// Mirrors the checks the monitoring service applies, so obviously bad
// input fails fast without a round trip.

use std::collections::HashMap;

use url::Url;
use uptime_api::{CreateEndpointRequest, HttpMethod, UpdateEndpointRequest};

use crate::error::CoreError;

const DEFAULT_EXPECTED_STATUS: u16 = 200;
const DEFAULT_CHECK_INTERVAL_MINUTES: u32 = 5;

pub fn validate_create(req: &CreateEndpointRequest) -> Result<(), CoreError> {
    validate_name(&req.name)?;
    validate_url(&req.url)?;
    validate_common(req.expected_status, req.check_interval, req.headers.as_ref())
}

pub fn validate_update(update: &UpdateEndpointRequest) -> Result<(), CoreError> {
    if update.is_empty() {
        return Err(CoreError::validation("update", "no fields to change"));
    }
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    if let Some(url) = &update.url {
        validate_url(url)?;
    }
    validate_common(
        update.expected_status,
        update.check_interval,
        update.headers.as_ref(),
    )
}

/// Fill in method GET, expected status 200 and a 5 minute interval
/// where the request leaves them out.
pub fn apply_create_defaults(mut req: CreateEndpointRequest) -> CreateEndpointRequest {
    req.method.get_or_insert(HttpMethod::Get);
    req.expected_status.get_or_insert(DEFAULT_EXPECTED_STATUS);
    req.check_interval
        .get_or_insert(DEFAULT_CHECK_INTERVAL_MINUTES);
    req
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("name", "must not be empty"));
    }
    Ok(())
}

fn validate_url(raw: &str) -> Result<(), CoreError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CoreError::validation("url", format!("not a valid URL ({e})")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CoreError::validation(
            "url",
            format!("scheme must be http or https, got {other}"),
        )),
    }
}

fn validate_common(
    expected_status: Option<u16>,
    check_interval: Option<u32>,
    headers: Option<&HashMap<String, String>>,
) -> Result<(), CoreError> {
    if let Some(status) = expected_status {
        if !(100..=599).contains(&status) {
            return Err(CoreError::validation(
                "expected_status",
                format!("{status} is not an HTTP status code (100-599)"),
            ));
        }
    }
    if check_interval == Some(0) {
        return Err(CoreError::validation(
            "check_interval",
            "must be at least 1 minute",
        ));
    }
    if let Some(headers) = headers {
        if headers.keys().any(|k| k.trim().is_empty()) {
            return Err(CoreError::validation("headers", "header names must not be empty"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn create(name: &str, url: &str) -> CreateEndpointRequest {
        CreateEndpointRequest {
            name: name.into(),
            url: url.into(),
            ..CreateEndpointRequest::default()
        }
    }

    fn field_of(err: CoreError) -> String {
        match err {
            CoreError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_minimal_create() {
        validate_create(&create("billing", "https://billing.example.com/health")).unwrap();
    }

    #[test]
    fn rejects_blank_name() {
        let err = validate_create(&create("   ", "https://x.example.com")).unwrap_err();
        assert_eq!(field_of(err), "name");
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = validate_create(&create("ftp", "ftp://files.example.com")).unwrap_err();
        assert_eq!(field_of(err), "url");

        let err = validate_create(&create("garbage", "not a url")).unwrap_err();
        assert_eq!(field_of(err), "url");
    }

    #[test]
    fn rejects_out_of_range_status_and_zero_interval() {
        let mut req = create("billing", "https://billing.example.com");
        req.expected_status = Some(42);
        assert_eq!(field_of(validate_create(&req).unwrap_err()), "expected_status");

        req.expected_status = Some(204);
        req.check_interval = Some(0);
        assert_eq!(field_of(validate_create(&req).unwrap_err()), "check_interval");
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = validate_update(&UpdateEndpointRequest::default()).unwrap_err();
        assert_eq!(field_of(err), "update");
    }

    #[test]
    fn defaults_fill_only_missing_fields() {
        let mut req = create("billing", "https://billing.example.com");
        req.expected_status = Some(204);
        let req = apply_create_defaults(req);
        assert_eq!(req.method, Some(HttpMethod::Get));
        assert_eq!(req.expected_status, Some(204));
        assert_eq!(req.check_interval, Some(5));
    }
}
