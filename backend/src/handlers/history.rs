//! HTTP handlers for the inspection history

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inspection::HistoryEntry;
use crate::services::{GrainFileStore, InspectionService};
use crate::AppState;
use shared::{DateRange, Inspection, PaginatedResponse, Pagination};

/// Query parameters for the history listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Paginated inspection history, optionally filtered by sampling date
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<PaginatedResponse<HistoryEntry>>> {
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page).max(1),
        limit: query.limit.unwrap_or(defaults.limit).clamp(1, 100),
    };

    let range = match (query.from_date, query.to_date) {
        (Some(from), Some(to)) => {
            if from > to {
                return Err(AppError::ValidationError(
                    "fromDate must not be after toDate".to_string(),
                ));
            }
            Some(DateRange { from, to })
        }
        (None, None) => None,
        _ => {
            return Err(AppError::ValidationError(
                "fromDate and toDate must be given together".to_string(),
            ))
        }
    };

    let service = InspectionService::new(state.db);
    let page = service.list_history(pagination, range).await?;
    Ok(Json(page))
}

/// Get one inspection from the history
pub async fn get_history_entry(
    State(state): State<AppState>,
    Path(inspection_id): Path<Uuid>,
) -> AppResult<Json<Inspection>> {
    let service = InspectionService::new(state.db);
    let inspection = service.get_inspection(inspection_id).await?;
    Ok(Json(inspection))
}

/// Bulk delete inspections; the path segment is a comma-separated id list
pub async fn delete_inspections(
    State(state): State<AppState>,
    Path(inspection_ids): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let ids: Vec<Uuid> = inspection_ids
        .split(',')
        .map(|part| {
            part.trim().parse::<Uuid>().map_err(|_| {
                AppError::ValidationError(format!("Invalid inspection id: {}", part))
            })
        })
        .collect::<Result<_, _>>()?;

    let service = InspectionService::new(state.db.clone());
    let raw_paths = service.delete_inspections(&ids).await?;

    // Remove stored grain files after the rows are gone
    let store = GrainFileStore::new(&state.config.storage.upload_dir);
    for path in &raw_paths {
        if let Err(err) = store.delete(path).await {
            tracing::warn!("Failed to remove grain file {}: {}", path, err);
        }
    }

    Ok(Json(serde_json::json!({ "deleted": ids.len() })))
}
