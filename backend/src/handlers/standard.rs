//! HTTP handlers for quality standard endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::StandardService;
use crate::AppState;
use shared::{CreateStandardInput, Standard};

/// List all quality standards
pub async fn list_standards(State(state): State<AppState>) -> AppResult<Json<Vec<Standard>>> {
    let service = StandardService::new(state.db);
    let standards = service.list_standards().await?;
    Ok(Json(standards))
}

/// Get a standard with its ordered sub-standards
pub async fn get_standard(
    State(state): State<AppState>,
    Path(standard_id): Path<Uuid>,
) -> AppResult<Json<Standard>> {
    let service = StandardService::new(state.db);
    let standard = service.get_standard(standard_id).await?;
    Ok(Json(standard))
}

/// Create a quality standard (administrative flow)
pub async fn create_standard(
    State(state): State<AppState>,
    Json(input): Json<CreateStandardInput>,
) -> AppResult<Json<Standard>> {
    let service = StandardService::new(state.db);
    let standard = service.create_standard(input).await?;
    Ok(Json(standard))
}
