use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chef;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CravingRequest {
    pub craving: Option<String>,
}

pub async fn recommend(Json(body): Json<CravingRequest>) -> Result<Json<Value>, ApiError> {
    let craving = body
        .craving
        .filter(|craving| !craving.is_empty())
        .ok_or_else(|| ApiError::Validation("Craving is required".to_string()))?;

    let recommendation = chef::recommend(&craving);
    Ok(Json(json!({
        "success": true,
        "recommendation": recommendation
    })))
}
