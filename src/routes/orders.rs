use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{CreateOrder, OrderFilter};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub location: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let order = state.lifecycle.place(draft)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "order": order,
            "message": "Order created successfully!"
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = OrderFilter {
        location: query.location,
        status: query.status,
        limit: query.limit,
    };
    let orders = state.store.list(&filter)?;
    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "orders": orders
    })))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let order = state.store.get(&id)?;
    Ok(Json(json!({ "success": true, "order": order })))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Value>, ApiError> {
    let raw = body.status.unwrap_or_default();
    let order = state.lifecycle.transition(&id, &raw, "api")?;
    Ok(Json(json!({
        "success": true,
        "order": order,
        "message": "Order status updated successfully!"
    })))
}
