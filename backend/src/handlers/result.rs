//! HTTP handlers for classification results

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::result::{InspectionResultResponse, ResultService};
use crate::AppState;

/// Classify an inspection's stored batch against its standard
///
/// The summary is computed fresh on every call.
pub async fn get_result(
    State(state): State<AppState>,
    Path(inspection_id): Path<Uuid>,
) -> AppResult<Json<InspectionResultResponse>> {
    let service = ResultService::new(state.db);
    let response = service.get_result(inspection_id).await?;
    Ok(Json(response))
}
