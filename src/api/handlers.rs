use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::error;
use utoipa::OpenApi;

use super::{
    dashboard,
    dto::{ReadingDto, SubmitResponse, SummaryDto},
    errors::{AppError, SUBMIT_OK},
    AppState,
};
use crate::readings::{IngestError, SubmitReading, SummaryAggregator};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TimeRangeParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub hours: Option<i64>,
    pub limit: Option<usize>,
}

fn window(hours: Option<i64>, default: i64) -> Duration {
    Duration::hours(
        hours
            .unwrap_or(default)
            .clamp(0, SummaryAggregator::MAX_WINDOW_HOURS),
    )
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Accept one reading from a device.
///
/// The body is parsed by hand rather than through the `Json` extractor so
/// that unparseable bodies get the same acknowledgment shape, a 400, and a
/// log line with the raw body.
#[utoipa::path(
    post,
    path = "/submit",
    request_body = SubmitReading,
    responses(
        (status = 200, description = "Reading stored", body = SubmitResponse),
        (status = 400, description = "Malformed JSON or failed validation", body = SubmitResponse),
        (status = 500, description = "Reading could not be stored", body = SubmitResponse),
    ),
    tag = "ingestion"
)]
pub async fn submit_reading(State(state): State<AppState>, body: Bytes) -> Response {
    let payload = match parse_submission(&body) {
        Ok(p) => p,
        Err(e) => {
            error!(
                error = %e,
                body = %String::from_utf8_lossy(&body),
                "Could not parse submitted reading"
            );
            return IngestError::MalformedPayload(e.to_string()).into_response();
        }
    };

    match state.ingest.ingest(&payload).await {
        Ok(_) => (StatusCode::OK, Json(SubmitResponse::new(true, SUBMIT_OK))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Only a JSON object is a submission; the derived deserializer would also
/// accept a positional array.
fn parse_submission(body: &[u8]) -> serde_json::Result<SubmitReading> {
    let fields = serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(body)?;
    serde_json::from_value(serde_json::Value::Object(fields))
}

// ---------------------------------------------------------------------------
// Read API
// ---------------------------------------------------------------------------

/// Latest reading for every context.
#[utoipa::path(
    get,
    path = "/readings/latest",
    responses(
        (status = 200, description = "Latest reading per context", body = Vec<ReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_latest_readings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let rows = state.aggregator.latest_readings().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Readings from the last `hours` (default from config), newest first.
#[utoipa::path(
    get,
    path = "/readings/recent",
    params(
        ("hours" = Option<i64>, Query, description = "Window length in hours"),
        ("limit" = Option<usize>, Query, description = "Maximum number of readings"),
    ),
    responses(
        (status = 200, description = "Recent readings, newest first", body = Vec<ReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_recent_readings(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let rows = state
        .aggregator
        .recent_readings(
            window(params.hours, state.dashboard.window_hours),
            params.limit.unwrap_or(state.dashboard.readings_limit),
        )
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Readings carrying an alert from the last `hours`, newest first.
#[utoipa::path(
    get,
    path = "/alerts",
    params(
        ("hours" = Option<i64>, Query, description = "Window length in hours"),
        ("limit" = Option<usize>, Query, description = "Maximum number of alerts"),
    ),
    responses(
        (status = 200, description = "Recent alerts, newest first", body = Vec<ReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_recent_alerts(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let rows = state
        .aggregator
        .recent_alerts(
            window(params.hours, state.dashboard.window_hours),
            params.limit.unwrap_or(state.dashboard.alerts_limit),
        )
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// All readings of one context, oldest first. Optionally filter by time
/// range with `?from=<RFC3339>&to=<RFC3339>`.
#[utoipa::path(
    get,
    path = "/readings/{context}",
    params(
        ("context" = String, Path, description = "Context label"),
        ("from" = Option<DateTime<Utc>>, Query, description = "Start of time range (RFC3339)"),
        ("to"   = Option<DateTime<Utc>>, Query, description = "End of time range (RFC3339)"),
    ),
    responses(
        (status = 200, description = "Readings for the context", body = Vec<ReadingDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_context_readings(
    State(state): State<AppState>,
    Path(context): Path<String>,
    Query(params): Query<TimeRangeParams>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let rows = match (params.from, params.to) {
        (None, None) => state.store.find_by_context(&context).await?,
        (from, to) => {
            state
                .store
                .find_by_context_between(
                    &context,
                    from.unwrap_or_default(),
                    to.unwrap_or_else(Utc::now),
                )
                .await?
        }
    };
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Dashboard headline figures. Never fails: store problems yield zeros.
#[utoipa::path(
    get,
    path = "/summary",
    responses(
        (status = 200, description = "Summary counts", body = SummaryDto),
    ),
    tag = "readings"
)]
pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryDto> {
    Json(state.aggregator.summary().await.into())
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        submit_reading,
        get_latest_readings,
        get_recent_readings,
        get_recent_alerts,
        get_context_readings,
        get_summary,
        dashboard::index,
        health,
    ),
    components(schemas(SubmitReading, SubmitResponse, ReadingDto, SummaryDto)),
    tags(
        (name = "ingestion", description = "Device submissions"),
        (name = "readings",  description = "Stored readings and summaries"),
        (name = "dashboard", description = "HTML dashboard"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "Weather Telemetry API",
        version = "0.1.0",
        description = "Ingestion and dashboard API for environmental sensor readings"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    use crate::{
        api::{router, AppState},
        config::DashboardConfig,
        readings::model::fixtures,
        store::{testing::FailingStore, MemoryReadingStore, ReadingStore},
    };

    fn test_server(store: Arc<dyn ReadingStore>) -> TestServer {
        TestServer::new(router(AppState::new(store, DashboardConfig::default()))).unwrap()
    }

    fn memory_server() -> (TestServer, MemoryReadingStore) {
        let store = MemoryReadingStore::new();
        (test_server(Arc::new(store.clone())), store)
    }

    fn garden_payload() -> Value {
        json!({
            "ctx": "garden", "t": 0, "h": 0, "co": 10, "c2": 400, "aq": 50,
            "ldr": 200, "prs": 1013, "sig": -60, "tok": "x"
        })
    }

    // -----------------------------------------------------------------------
    // POST /submit
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn submit_stores_reading_with_fallbacks() {
        let (server, store) = memory_server();

        let resp = server.post("/submit").json(&garden_payload()).await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Weather data received and processed successfully");
        assert!(body["timestamp"].is_string());

        let stored = store.find_latest_by_context("garden").await.unwrap().unwrap();
        assert_eq!(stored.temperature, 20.0);
        assert_eq!(stored.humidity, 65.0);
        assert_eq!(stored.co2_level, 400);
        assert_eq!(stored.token, "x");
    }

    #[tokio::test]
    async fn submit_missing_token_is_validation_failure() {
        let (server, store) = memory_server();
        let mut payload = garden_payload();
        payload.as_object_mut().unwrap().remove("tok");

        let resp = server.post("/submit").json(&payload).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["success"], false);
        let message = body["message"].as_str().unwrap();
        assert!(message.starts_with("Validation failed"));
        assert!(message.contains("token: missing"));

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn submit_lists_every_failing_field() {
        let (server, _) = memory_server();

        let resp = server.post("/submit").json(&json!({ "ctx": "", "t": 21.0 })).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        let message = body["message"].as_str().unwrap();
        for field in ["context: blank", "humidity", "co_level", "signal_strength", "token: missing"] {
            assert!(message.contains(field), "{field} not in {message}");
        }
        assert!(!message.contains("temperature"));
    }

    #[tokio::test]
    async fn submit_malformed_json_is_bad_request() {
        let (server, _) = memory_server();

        let resp = server.post("/submit").text("{\"ctx\": \"garden\", ").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON format or data type mismatch"));
    }

    #[tokio::test]
    async fn submit_wrong_type_is_malformed_not_validation() {
        let (server, _) = memory_server();
        let mut payload = garden_payload();
        payload["co"] = json!("high");

        let resp = server.post("/submit").json(&payload).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON format"));
    }

    #[tokio::test]
    async fn submit_array_body_is_malformed() {
        let (server, store) = memory_server();
        let positional = json!([
            "garden", 21.0, 50.0, 10, 400, 50, 200, 1013.0, -60, null, null, "x", null
        ]);

        let resp = server.post("/submit").json(&positional).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON format or data type mismatch"));

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn submit_scalar_body_is_malformed() {
        let (server, _) = memory_server();

        let resp = server.post("/submit").text("42").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON format"));
    }

    #[tokio::test]
    async fn submit_store_failure_is_internal_error() {
        let server = test_server(Arc::new(FailingStore));

        let resp = server.post("/submit").json(&garden_payload()).await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to process weather data");
    }

    #[tokio::test]
    async fn submit_keeps_alert_and_timestamp() {
        let (server, store) = memory_server();
        let mut payload = garden_payload();
        payload["al"] = json!("Smoke detected");
        payload["lvl"] = json!("HIGH");
        payload["timestamp"] = json!("2024-05-01T12:00:00Z");

        server.post("/submit").json(&payload).await.assert_status_ok();

        let stored = store.find_all().await.unwrap().pop().unwrap();
        assert_eq!(stored.alert, "Smoke detected");
        assert_eq!(stored.level, "HIGH");
        assert_eq!(stored.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    // -----------------------------------------------------------------------
    // Read API
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn latest_returns_newest_per_context() {
        let (server, store) = memory_server();
        let now = Utc::now();
        for h in [1, 2, 3] {
            store.save(fixtures::reading("garden", now - Duration::hours(h))).await.unwrap();
        }
        store.save(fixtures::reading("attic", now)).await.unwrap();

        let resp = server.get("/readings/latest").await;
        resp.assert_status_ok();
        let body: Vec<Value> = resp.json();
        assert_eq!(body.len(), 2);

        let garden = body.iter().find(|r| r["context"] == "garden").unwrap();
        let ts: chrono::DateTime<Utc> = garden["timestamp"].as_str().unwrap().parse().unwrap();
        assert_eq!(ts, now - Duration::hours(1));
        assert!(garden.get("token").is_none());
    }

    #[tokio::test]
    async fn latest_empty_returns_empty_array() {
        let (server, _) = memory_server();
        let resp = server.get("/readings/latest").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn latest_store_failure_is_500() {
        let server = test_server(Arc::new(FailingStore));
        let resp = server.get("/readings/latest").await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json();
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn recent_readings_honours_limit() {
        let (server, store) = memory_server();
        let now = Utc::now();
        for m in 0..5 {
            store.save(fixtures::reading("garden", now - Duration::minutes(m + 1))).await.unwrap();
        }

        let resp = server.get("/readings/recent").add_query_param("limit", 2).await;
        resp.assert_status_ok();
        let body: Vec<Value> = resp.json();
        assert_eq!(body.len(), 2);
    }

    #[tokio::test]
    async fn alerts_only_include_alerts() {
        let (server, store) = memory_server();
        let now = Utc::now();
        store.save(fixtures::reading("garden", now - Duration::minutes(2))).await.unwrap();
        store.save(fixtures::alert("garden", now - Duration::minutes(1), "Gas")).await.unwrap();

        let resp = server.get("/alerts").await;
        resp.assert_status_ok();
        let body: Vec<Value> = resp.json();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["alert"], "Gas");
    }

    #[tokio::test]
    async fn context_readings_filter_by_range() {
        let (server, store) = memory_server();
        let now = Utc::now();
        store.save(fixtures::reading("garden", now - Duration::hours(30))).await.unwrap();
        store.save(fixtures::reading("garden", now - Duration::hours(1))).await.unwrap();
        store.save(fixtures::reading("attic", now - Duration::hours(1))).await.unwrap();

        let all: Vec<Value> = server.get("/readings/garden").await.json();
        assert_eq!(all.len(), 2);

        let from = (now - Duration::hours(24)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let day: Vec<Value> = server
            .get("/readings/garden")
            .add_query_param("from", from)
            .await
            .json();
        assert_eq!(day.len(), 1);
    }

    #[tokio::test]
    async fn summary_of_empty_store() {
        let (server, _) = memory_server();
        let resp = server.get("/summary").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["total_records"], 0);
        assert_eq!(body["has_last_update"], false);
        assert!(body["last_update"].is_null());
    }

    #[tokio::test]
    async fn summary_degrades_when_store_fails() {
        let server = test_server(Arc::new(FailingStore));
        let resp = server.get("/summary").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["total_records"], 0);
    }

    // -----------------------------------------------------------------------
    // GET /health, GET /api-docs/openapi.json
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_returns_ok() {
        let (server, _) = memory_server();
        let resp = server.get("/health").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let (server, _) = memory_server();
        let resp = server.get("/api-docs/openapi.json").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["info"]["title"], "Weather Telemetry API");
        assert!(body["paths"]["/submit"].is_object());
    }
}
