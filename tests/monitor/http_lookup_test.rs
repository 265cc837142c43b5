use std::time::Duration;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use helpdesk_policy::services::monitor::{HttpStatusLookup, LookupError, MonitorTarget, StatusLookup};

const API_KEY: &str = "test-api-key";

async fn connection_state(Path(id): Path<String>, headers: HeaderMap) -> Response {
    if headers.get("API-Key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match id.as_str() {
        "inbox-open" => Json(json!({ "status": "open" })).into_response(),
        "inbox-garbled" => (StatusCode::OK, "not json").into_response(),
        "inbox-slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "status": "open" })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serve a stand-in status API on an ephemeral port and return its base URL
async fn spawn_status_api() -> String {
    let app = Router::new().route("/api/connection-state/{id}", get(connection_state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api/", addr)
}

#[tokio::test]
async fn fetches_status_with_api_key() {
    let base = spawn_status_api().await;
    let lookup = HttpStatusLookup::new(base, API_KEY, Duration::from_secs(5));

    let report = lookup.fetch_status(&MonitorTarget::from("inbox-open")).await.unwrap();
    assert_eq!(report.status, "open");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let base = spawn_status_api().await;

    let lookup = HttpStatusLookup::new(base.clone(), API_KEY, Duration::from_secs(5));
    assert_eq!(
        lookup.fetch_status(&MonitorTarget::from("inbox-unknown")).await,
        Err(LookupError::Api { status: 404 })
    );

    let lookup = HttpStatusLookup::new(base, "", Duration::from_secs(5));
    assert_eq!(
        lookup.fetch_status(&MonitorTarget::from("inbox-open")).await,
        Err(LookupError::Api { status: 401 })
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let base = spawn_status_api().await;
    let lookup = HttpStatusLookup::new(base, API_KEY, Duration::from_secs(5));

    let result = lookup.fetch_status(&MonitorTarget::from("inbox-garbled")).await;
    assert!(matches!(result, Err(LookupError::Parse(_))));
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let base = spawn_status_api().await;
    let lookup = HttpStatusLookup::new(base, API_KEY, Duration::from_millis(200));

    let result = lookup.fetch_status(&MonitorTarget::from("inbox-slow")).await;
    assert!(matches!(result, Err(LookupError::Network(_))));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let lookup = HttpStatusLookup::new("http://127.0.0.1:9", API_KEY, Duration::from_secs(1));

    let result = lookup.fetch_status(&MonitorTarget::from("inbox-open")).await;
    assert!(matches!(result, Err(LookupError::Network(_))));
}
