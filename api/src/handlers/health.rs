use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    store, AppState,
};

pub async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    store::health_check(&state.db).await.map_err(|e| {
        tracing::warn!(error = %e, "store health check failed");
        AppError::Unavailable("Store unavailable".to_string())
    })?;
    Ok(Json(json!({ "status": "ok" })))
}
