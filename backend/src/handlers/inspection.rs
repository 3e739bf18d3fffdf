//! HTTP handlers for inspection ingestion and editing
//!
//! Creation is a multipart form: descriptive fields from the inspection
//! form plus the JSON measurement file exported by the imaging process.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inspection::{CreateInspectionData, UpdateInspectionInput};
use crate::services::{GrainFileStore, InspectionService};
use crate::AppState;
use shared::{validate_sampling_point, Inspection, InspectionPayload, SamplingPoint};

/// Create an inspection from the upload form
pub async fn create_inspection(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Inspection>> {
    let mut name: Option<String> = None;
    let mut standard_id: Option<Uuid> = None;
    let mut note: Option<String> = None;
    let mut price: Option<Decimal> = None;
    let mut sampling_datetime: Option<DateTime<Utc>> = None;
    let mut sampling_points: Vec<SamplingPoint> = Vec::new();
    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart form: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(read_text(field).await?),
            "standard" | "standardID" => {
                let text = read_text(field).await?;
                let id = text.parse::<Uuid>().map_err(|_| AppError::Validation {
                    field: "standard".to_string(),
                    message: "Standard id must be a UUID".to_string(),
                    message_th: "รหัสมาตรฐานต้องเป็น UUID".to_string(),
                })?;
                standard_id = Some(id);
            }
            "note" => {
                let text = read_text(field).await?;
                if !text.is_empty() {
                    note = Some(text);
                }
            }
            "price" => {
                let text = read_text(field).await?;
                if !text.is_empty() {
                    let value = text.parse::<Decimal>().map_err(|_| AppError::Validation {
                        field: "price".to_string(),
                        message: "Price must be a number".to_string(),
                        message_th: "ราคาต้องเป็นตัวเลข".to_string(),
                    })?;
                    price = Some(value);
                }
            }
            "samplingDateTime" => {
                let text = read_text(field).await?;
                if !text.is_empty() {
                    sampling_datetime = Some(parse_sampling_datetime(&text)?);
                }
            }
            "samplingPoints" => {
                let text = read_text(field).await?;
                if !text.is_empty() {
                    sampling_points = parse_sampling_points(&text)?;
                }
            }
            "uploadFile" => {
                file_name = field.file_name().map(|n| n.to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::ValidationError(format!("Failed to read grain file: {}", e))
                })?;
                file_bytes = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| required("name", "ต้องระบุชื่อการตรวจสอบ"))?;
    let standard_id = standard_id.ok_or_else(|| required("standard", "ต้องระบุมาตรฐาน"))?;
    let file_bytes =
        file_bytes.ok_or_else(|| required("uploadFile", "ต้องแนบไฟล์ข้อมูลเมล็ดข้าว"))?;

    let payload: InspectionPayload = serde_json::from_slice(&file_bytes)
        .map_err(|e| AppError::InvalidGrainFile(e.to_string()))?;

    tracing::info!(
        "Received grain file for request {} ({} grains)",
        payload.request_id,
        payload.grains.len()
    );

    // Keep the raw export on disk so the batch can be re-examined
    let store = GrainFileStore::new(&state.config.storage.upload_dir);
    let raw_file_path = store
        .save(
            file_name.as_deref().unwrap_or("grains.json"),
            &file_bytes,
        )
        .await?;

    let service = InspectionService::new(state.db);
    let inspection = service
        .create_inspection(CreateInspectionData {
            name,
            standard_id,
            note,
            price,
            sampling_datetime,
            sampling_points,
            image_url: Some(payload.image_url.clone()),
            raw_file_path: Some(raw_file_path),
            grains: payload.grains,
        })
        .await?;

    Ok(Json(inspection))
}

/// Edit an inspection's descriptive fields
pub async fn update_inspection(
    State(state): State<AppState>,
    Path(inspection_id): Path<Uuid>,
    Json(input): Json<UpdateInspectionInput>,
) -> AppResult<Json<Inspection>> {
    let service = InspectionService::new(state.db);
    let inspection = service.update_inspection(inspection_id, input).await?;
    Ok(Json(inspection))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart field: {}", e)))
}

fn required(field: &str, message_th: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: format!("{} is required", field),
        message_th: message_th.to_string(),
    }
}

/// Accept RFC 3339 or the datetime-local format the form posts
fn parse_sampling_datetime(text: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::Validation {
        field: "samplingDateTime".to_string(),
        message: "Sampling date-time is not a valid timestamp".to_string(),
        message_th: "วันเวลาสุ่มตัวอย่างไม่ถูกต้อง".to_string(),
    })
}

/// The form posts sampling points as a JSON array of codes
fn parse_sampling_points(text: &str) -> AppResult<Vec<SamplingPoint>> {
    let codes: Vec<String> = serde_json::from_str(text).map_err(|_| AppError::Validation {
        field: "samplingPoints".to_string(),
        message: "Sampling points must be a JSON array of codes".to_string(),
        message_th: "จุดสุ่มตัวอย่างต้องเป็นรายการรหัส".to_string(),
    })?;

    codes
        .iter()
        .map(|code| {
            validate_sampling_point(code).map_err(|msg| AppError::Validation {
                field: "samplingPoints".to_string(),
                message: msg.to_string(),
                message_th: format!("ไม่รู้จักจุดสุ่มตัวอย่าง: {}", code),
            })
        })
        .collect()
}
