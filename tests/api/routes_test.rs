use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestContext;

// =============================================================================
// ROOT / HEALTH
// =============================================================================

#[tokio::test]
async fn health_reports_owner() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["owner_id"], "desk");
}

// =============================================================================
// POLICY
// =============================================================================

#[tokio::test]
async fn business_hours_without_schedule_is_open() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/policy/business-hours")
        .add_query_param("at", "2025-06-07T15:00:00Z")
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["is_open"], true);
    assert!(body["auto_reply"].is_null());
    assert_eq!(body["evaluated_at"], "2025-06-07T15:00:00Z");
}

#[tokio::test]
async fn saved_schedule_closes_weekends() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .put("/policy/schedule")
        .json(&json!({
            "is_enabled": true,
            "timezone": "UTC",
            "locale": "en",
            "auto_reply_template": "We are back {dia} at {start}"
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["config"]["is_enabled"], true);
    assert_eq!(body["config"]["schedule"].as_array().unwrap().len(), 7);

    let response = ctx
        .server
        .get("/policy/business-hours")
        .add_query_param("at", "2025-06-07T15:00:00Z")
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_open"], false);
    assert_eq!(body["auto_reply"], "We are back Monday at 09:00");

    let response = ctx.server.get("/policy/schedule").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["config"]["timezone"], "UTC");
}

#[tokio::test]
async fn invalid_schedule_is_unprocessable() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .put("/policy/schedule")
        .json(&json!({
            "schedule": [{ "day": 9, "enabled": true, "start": "09:00", "end": "18:00" }]
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid schedule"));
}

#[tokio::test]
async fn sla_verdict_round_trip() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/policy/sla/verdict")
        .json(&json!({
            "created_at": "2025-06-02T10:00:00Z",
            "priority": "high",
            "now": "2025-06-02T10:20:00Z"
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["verdict"].is_null());

    ctx.server
        .put("/policy/sla")
        .json(&json!({ "first_response_minutes": 30 }))
        .await
        .assert_status_ok();

    // high = 0.5 -> 15 minute deadline, breached after 20
    let response = ctx
        .server
        .post("/policy/sla/verdict")
        .json(&json!({
            "created_at": "2025-06-02T10:00:00Z",
            "priority": "high",
            "now": "2025-06-02T10:20:00Z"
        }))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["verdict"]["kind"], "first_response");
    assert_eq!(body["verdict"]["is_breached"], true);
    assert_eq!(body["verdict"]["remaining_minutes"], -5);
}

#[tokio::test]
async fn huge_multiplier_verdict_has_null_due_date() {
    let ctx = TestContext::new().await;

    ctx.server
        .put("/policy/sla")
        .json(&json!({ "priority_multiplier": { "backlog": 1e10 } }))
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .post("/policy/sla/verdict")
        .json(&json!({
            "created_at": "2025-06-02T10:00:00Z",
            "priority": "backlog",
            "now": "2025-06-02T10:20:00Z"
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["verdict"]["is_breached"], false);
    assert!(body["verdict"]["due_at"].is_null());
}

#[tokio::test]
async fn sla_verdict_rejects_empty_priority() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/policy/sla/verdict")
        .json(&json!({
            "created_at": "2025-06-02T10:00:00Z",
            "priority": ""
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_sla_minutes_are_unprocessable() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .put("/policy/sla")
        .json(&json!({ "resolution_minutes": 0 }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn refresh_reports_loaded_records() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/policy/refresh").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["schedule_loaded"], false);
    assert_eq!(body["sla_loaded"], false);
}

// =============================================================================
// MONITOR
// =============================================================================

#[tokio::test]
async fn monitor_start_check_status_stop() {
    let ctx = TestContext::new().await;
    ctx.lookup.set("inbox-1", "open");
    ctx.lookup.set("inbox-2", "connecting");

    let response = ctx
        .server
        .post("/monitor/start")
        .json(&json!({ "targets": ["inbox-1", "inbox-2", "inbox-1", ""] }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["phase"], "active");
    assert_eq!(body["tracked"], 2);

    let response = ctx.server.post("/monitor/check").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["polled"], 2);
    assert_eq!(body["cadence"], "fast");
    assert_eq!(body["next_interval_secs"], 5.0);

    let response = ctx.server.get("/monitor/status").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["phase"], "active");
    assert_eq!(body["targets"][1]["last_known_status"], "connecting");

    let response = ctx.server.post("/monitor/stop").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["phase"], "stopped");

    ctx.server
        .post("/monitor/check")
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn check_without_monitoring_conflicts() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/monitor/check").await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Monitoring is not active");
}

// =============================================================================
// METRICS
// =============================================================================

#[tokio::test]
async fn metrics_endpoint_exposes_request_counters() {
    let ctx = TestContext::new().await;

    ctx.server.get("/health").await.assert_status_ok();

    let response = ctx.server.get("/metrics").await;
    response.assert_status_ok();

    let text = response.text();
    assert!(text.contains("helpdesk_http_requests_total"));
    assert!(text.contains("endpoint=\"/health\""));
}
