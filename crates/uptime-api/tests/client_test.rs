#![allow(clippy::unwrap_used)]
// Integration tests for `MonitorClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uptime_api::{
    AlertListParams, CreateEndpointRequest, EndpointListParams, Error, HttpMethod,
    MonitorClient, PageParams, TimeRange, UpdateEndpointRequest,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MonitorClient) {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    let client = MonitorClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    (server, client)
}

fn endpoint_json(id: &str, name: &str, active: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "url": format!("https://{name}.example.com/health"),
        "method": "GET",
        "headers": null,
        "expectedStatus": 200,
        "checkInterval": 5,
        "isActive": active,
        "createdAt": "2024-06-01T08:00:00Z",
        "updatedAt": "2024-06-02T08:00:00Z"
    })
}

fn alert_json(id: &str, acknowledged: bool) -> serde_json::Value {
    json!({
        "id": id,
        "endpointId": "ep-1",
        "alertType": "SLOW",
        "message": "Response time above threshold",
        "severity": "MEDIUM",
        "isAcknowledged": acknowledged,
        "createdAt": "2024-06-15T10:30:00Z",
        "acknowledgedAt": if acknowledged { json!("2024-06-15T11:00:00Z") } else { json!(null) }
    })
}

// ── Endpoints ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_endpoints_sends_filter_and_window() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoints"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "20"))
        .and(query_param("endpointName", "billing"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([endpoint_json("ep-1", "billing", true)])),
        )
        .mount(&server)
        .await;

    let params = EndpointListParams {
        limit: Some(10),
        offset: Some(20),
        endpoint_name: Some("billing".into()),
    };
    let endpoints = client.list_endpoints(&params).await.unwrap();

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].name, "billing");
    assert_eq!(endpoints[0].method, HttpMethod::Get);
    assert!(endpoints[0].is_active);
}

#[tokio::test]
async fn test_list_endpoints_omits_absent_parameters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoints"))
        .and(query_param_is_missing("endpointName"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let params = EndpointListParams {
        limit: Some(10),
        ..EndpointListParams::default()
    };
    let endpoints = client.list_endpoints(&params).await.unwrap();
    assert!(endpoints.is_empty());
}

#[tokio::test]
async fn test_create_endpoint_posts_json() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/endpoints"))
        .and(body_json(json!({
            "name": "payments",
            "url": "https://payments.example.com/health",
            "method": "POST",
            "expectedStatus": 204
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(endpoint_json("ep-9", "payments", true)),
        )
        .mount(&server)
        .await;

    let req = CreateEndpointRequest {
        name: "payments".into(),
        url: "https://payments.example.com/health".into(),
        method: Some(HttpMethod::Post),
        expected_status: Some(204),
        ..CreateEndpointRequest::default()
    };
    let created = client.create_endpoint(&req).await.unwrap();
    assert_eq!(created.id, "ep-9");
}

#[tokio::test]
async fn test_update_endpoint_sends_partial_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/endpoints/ep-1"))
        .and(body_json(json!({ "isActive": false })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(endpoint_json("ep-1", "billing", false)),
        )
        .mount(&server)
        .await;

    let update = UpdateEndpointRequest {
        is_active: Some(false),
        ..UpdateEndpointRequest::default()
    };
    let updated = client.update_endpoint("ep-1", &update).await.unwrap();
    assert!(!updated.is_active);
}

#[tokio::test]
async fn test_delete_endpoint_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/endpoints/ep-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_endpoint("ep-1").await.unwrap();
}

// ── Health logs ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_endpoint_analytics_sends_hours() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health-logs/analytics/ep-1"))
        .and(query_param("hours", "168"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalChecks": 2016,
            "successfulChecks": 2000,
            "failedChecks": 16,
            "uptimePercentage": 99.21,
            "averageResponseTime": 184.5,
            "lastCheckStatus": "UP",
            "timeRange": "168 hours"
        })))
        .mount(&server)
        .await;

    let analytics = client
        .endpoint_analytics("ep-1", TimeRange::SevenDays)
        .await
        .unwrap();
    assert_eq!(analytics.total_checks, 2016);
    assert_eq!(analytics.failed_checks, 16);
}

#[tokio::test]
async fn test_endpoint_health_logs_pages() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health-logs/endpoint/ep-1"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "log-11",
            "endpointId": "ep-1",
            "statusCode": null,
            "responseTimeMs": null,
            "success": false,
            "errorMessage": "connect ECONNREFUSED",
            "checkedAt": "2024-06-15T10:30:00Z"
        }])))
        .mount(&server)
        .await;

    let logs = client
        .list_endpoint_health_logs("ep-1", &PageParams::new(10, 10))
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].success);
    assert_eq!(logs[0].status_code, None);
}

// ── Alerts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_alerts_filters_by_acknowledged() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .and(query_param("acknowledged", "false"))
        .and(query_param("limit", "25"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert_json("a1", false)])))
        .mount(&server)
        .await;

    let params = AlertListParams {
        acknowledged: Some(false),
        limit: Some(25),
        offset: Some(0),
    };
    let alerts = client.list_alerts(&params).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert!(!alerts[0].is_acknowledged);
}

#[tokio::test]
async fn test_acknowledge_alert() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/alerts/a1/acknowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alert_json("a1", true)))
        .mount(&server)
        .await;

    let alert = client.acknowledge_alert("a1").await.unwrap();
    assert!(alert.is_acknowledged);
    assert!(alert.acknowledged_at.is_some());
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_carries_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoints/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": 404,
            "message": "Endpoint with ID missing not found",
            "error": "Not Found"
        })))
        .mount(&server)
        .await;

    let err = client.get_endpoint("missing").await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
    match err {
        Error::Server { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Endpoint with ID missing not found");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client
        .list_alerts(&AlertListParams::default())
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, Error::Server { status: 502, ref message } if message == "Bad Gateway"));
}

#[tokio::test]
async fn test_malformed_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health-logs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let result = client.list_health_logs(&PageParams::new(10, 0)).await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "{not json"),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client =
        MonitorClient::from_reqwest("http://127.0.0.1:1/api", reqwest::Client::new()).unwrap();
    let result = client.list_endpoints(&EndpointListParams::default()).await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}
