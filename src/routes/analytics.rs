use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::analytics::{self, Period};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
}

/// Period-scoped dashboard report, recomputed from the full order list.
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Value>, ApiError> {
    let period = Period::parse(query.period.as_deref());
    let orders = state.store.all_in_insertion_order()?;
    let report = analytics::report(&orders, period, Utc::now());
    Ok(Json(json!({
        "success": true,
        "metrics": report.metrics,
        "charts": report.charts,
        "popularItems": report.popular_items
    })))
}

/// The incrementally maintained snapshot document, as stored.
pub async fn snapshot(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let snapshot = state.analytics.snapshot()?;
    Ok(Json(json!({ "success": true, "analytics": snapshot })))
}

pub async fn popular_items(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.analytics.popular_items()?;
    Ok(Json(json!({ "success": true, "popularItems": items })))
}
