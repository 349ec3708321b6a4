//! HTTP API for sensor ingestion and sitting-time queries

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::reading::Reading;
use crate::session::SessionTracker;

/// API application state
#[derive(Clone)]
pub struct ApiState {
    pub tracker: Arc<SessionTracker>,
}

/// Response body of `GET /time_since`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSince {
    pub time_since: f64,
}

/// Build the axum router
pub fn build_router(tracker: Arc<SessionTracker>) -> Router {
    let api_state = ApiState { tracker };

    Router::new()
        .route("/", get(health_handler))
        .route("/pressure", get(latest_handler).post(ingest_handler))
        .route("/time_since", get(time_since_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(api_state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "UP" }))
}

async fn ingest_handler(
    State(api): State<ApiState>,
    Query(params): Query<Vec<(String, String)>>,
) -> crate::Result<Json<Reading>> {
    let reading = api.tracker.ingest(params).await?;
    Ok(Json(reading))
}

async fn latest_handler(State(api): State<ApiState>) -> crate::Result<Json<Reading>> {
    Ok(Json(api.tracker.latest().await?))
}

async fn time_since_handler(State(api): State<ApiState>) -> crate::Result<Json<TimeSince>> {
    let time_since = api.tracker.time_since().await?;
    Ok(Json(TimeSince { time_since }))
}
