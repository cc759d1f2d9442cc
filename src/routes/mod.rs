pub mod analytics;
pub mod chef;
pub mod dashboard;
pub mod orders;

use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/orders", post(orders::create).get(orders::list))
        .route("/api/orders/{id}", get(orders::get_by_id))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route("/api/dashboard/kitchen", get(dashboard::kitchen))
        .route("/api/dashboard/delivery", get(dashboard::delivery))
        .route("/api/chef/recommend", post(chef::recommend))
        .route("/api/analytics", get(analytics::report))
        .route("/api/analytics/snapshot", get(analytics::snapshot))
        .route("/api/analytics/popular-items", get(analytics::popular_items))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Fish Burger Backend is running!"
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
