pub mod dashboard;
pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::{get, post}, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{
    config::DashboardConfig,
    readings::{IngestService, SummaryAggregator},
    store::ReadingStore,
};

/// Shared handler state. Cheap to clone: the store sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub ingest: IngestService,
    pub aggregator: SummaryAggregator,
    pub dashboard: DashboardConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, dashboard: DashboardConfig) -> Self {
        Self {
            ingest: IngestService::new(store.clone()),
            aggregator: SummaryAggregator::new(store.clone()),
            store,
            dashboard,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/", get(dashboard::index))
        .route("/submit", post(handlers::submit_reading))
        .route("/readings/latest", get(handlers::get_latest_readings))
        .route("/readings/recent", get(handlers::get_recent_readings))
        .route("/readings/{context}", get(handlers::get_context_readings))
        .route("/alerts", get(handlers::get_recent_alerts))
        .route("/summary", get(handlers::get_summary))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
