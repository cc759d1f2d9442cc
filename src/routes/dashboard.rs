use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

/// Orders the kitchen has to work on next: pending and preparing, oldest
/// first so the queue is worked FIFO.
pub async fn kitchen(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Value>, ApiError> {
    let orders = state.store.list_for_kitchen(query.location.as_deref())?;
    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "orders": orders
    })))
}

/// Orders ready to go or already on the road, oldest first.
pub async fn delivery(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Value>, ApiError> {
    let orders = state.store.list_for_delivery(query.location.as_deref())?;
    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "orders": orders
    })))
}
