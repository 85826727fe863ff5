//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/tables/create", post(handlers::create_table))
        .route("/api/v1/tables/list", get(handlers::list_tables))
        .route("/api/v1/tables/detail", get(handlers::table_detail))
        .route("/api/v1/tables/data", get(handlers::table_data))
        .route("/api/v1/tables/active", get(handlers::active_tables))
        .route(
            "/api/v1/upload/{table}",
            post(handlers::upload).get(handlers::upload_info),
        )
        .route("/api/v1/consume/{table}", get(handlers::consume))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "conveyor-server" }))
}
