//! Inspection ingestion and history service
//!
//! Owns the write path for measured grain batches: the inspection row, the
//! shape/type lookup codes and the grain rows are inserted in one
//! transaction so the classification engine always reads a consistent
//! snapshot. Transient serialization failures are retried with capped
//! exponential backoff; the engine itself never retries anything.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{
    validate_grain_batch, validate_price, DateRange, GrainRecord, Inspection, PaginatedResponse,
    Pagination, SamplingPoint,
};

const MAX_WRITE_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 50;

/// Service for creating, listing and deleting inspections
#[derive(Clone)]
pub struct InspectionService {
    db: PgPool,
}

/// Database row for an inspection joined with its standard name
#[derive(Debug, sqlx::FromRow)]
struct InspectionRow {
    id: Uuid,
    name: String,
    standard_id: Uuid,
    standard_name: String,
    note: Option<String>,
    price: Option<Decimal>,
    sampling_datetime: Option<DateTime<Utc>>,
    sampling_points: Vec<String>,
    total_samples: i64,
    image_url: Option<String>,
    raw_file_path: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InspectionRow> for Inspection {
    fn from(row: InspectionRow) -> Self {
        Inspection {
            id: row.id,
            name: row.name,
            standard_id: row.standard_id,
            standard_name: row.standard_name,
            note: row.note,
            price: row.price,
            sampling_datetime: row.sampling_datetime,
            sampling_points: row
                .sampling_points
                .iter()
                .filter_map(|code| SamplingPoint::from_code(code))
                .collect(),
            total_samples: row.total_samples,
            image_url: row.image_url,
            raw_file_path: row.raw_file_path,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Data for creating an inspection, assembled from the upload form
#[derive(Debug, Clone)]
pub struct CreateInspectionData {
    pub name: String,
    pub standard_id: Uuid,
    pub note: Option<String>,
    pub price: Option<Decimal>,
    pub sampling_datetime: Option<DateTime<Utc>>,
    pub sampling_points: Vec<SamplingPoint>,
    pub image_url: Option<String>,
    pub raw_file_path: Option<String>,
    pub grains: Vec<GrainRecord>,
}

/// Input for editing an inspection's descriptive fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInspectionInput {
    pub name: Option<String>,
    pub note: Option<String>,
    pub price: Option<Decimal>,
    pub sampling_datetime: Option<DateTime<Utc>>,
    pub sampling_points: Option<Vec<SamplingPoint>>,
}

/// One row of the paginated history listing
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub standard_name: String,
    pub note: Option<String>,
    pub total_samples: i64,
}

impl InspectionService {
    /// Create a new InspectionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Ingest a measured grain batch as a new inspection
    pub async fn create_inspection(&self, data: CreateInspectionData) -> AppResult<Inspection> {
        if data.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Inspection name is required".to_string(),
                message_th: "ต้องระบุชื่อการตรวจสอบ".to_string(),
            });
        }

        if let Some(price) = data.price {
            validate_price(price).map_err(|msg| AppError::Validation {
                field: "price".to_string(),
                message: msg.to_string(),
                message_th: "ราคาต้องอยู่ระหว่าง 0 ถึง 100,000".to_string(),
            })?;
        }

        validate_grain_batch(&data.grains)
            .map_err(|msg| AppError::InvalidGrainFile(msg.to_string()))?;

        // Reject unknown standards before touching the write path
        let standard_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM standards WHERE id = $1")
                .bind(data.standard_id)
                .fetch_one(&self.db)
                .await?;
        if standard_exists == 0 {
            return Err(AppError::NotFound("Standard".to_string()));
        }

        let mut attempt = 0;
        loop {
            match self.insert_inspection(&data).await {
                Ok(inspection_id) => {
                    tracing::info!(
                        "Ingested inspection {} with {} grains",
                        inspection_id,
                        data.grains.len()
                    );
                    return self.get_inspection(inspection_id).await;
                }
                Err(err) if attempt + 1 < MAX_WRITE_ATTEMPTS && is_transient(&err) => {
                    attempt += 1;
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS << attempt);
                    tracing::warn!(
                        "Transient database error while ingesting inspection (attempt {}), retrying in {:?}: {}",
                        attempt,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One transactional attempt at the ingestion write sequence
    async fn insert_inspection(&self, data: &CreateInspectionData) -> AppResult<Uuid> {
        let mut tx = self.db.begin().await?;

        let sampling_points: Vec<String> = data
            .sampling_points
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();

        let inspection_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inspections (
                name, standard_id, note, price, sampling_datetime,
                sampling_points, total_samples, image_url, raw_file_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&data.name)
        .bind(data.standard_id)
        .bind(&data.note)
        .bind(data.price)
        .bind(data.sampling_datetime)
        .bind(&sampling_points)
        .bind(data.grains.len() as i64)
        .bind(&data.image_url)
        .bind(&data.raw_file_path)
        .fetch_one(&mut *tx)
        .await?;

        self.ensure_rice_codes(&mut tx, &data.grains).await?;

        for grain in &data.grains {
            sqlx::query(
                r#"
                INSERT INTO grain_details (inspection_id, length, weight, shape_id, rice_type_id)
                VALUES ($1, $2, $3,
                    (SELECT id FROM rice_shapes WHERE code = $4),
                    (SELECT id FROM rice_types WHERE code = $5))
                "#,
            )
            .bind(inspection_id)
            .bind(grain.length)
            .bind(grain.weight)
            .bind(&grain.shape)
            .bind(&grain.grain_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(inspection_id)
    }

    /// Insert lookup rows for any shape/type codes seen for the first time
    async fn ensure_rice_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        grains: &[GrainRecord],
    ) -> AppResult<()> {
        let mut shapes: Vec<&str> = grains.iter().map(|g| g.shape.as_str()).collect();
        shapes.sort_unstable();
        shapes.dedup();

        let mut types: Vec<&str> = grains.iter().map(|g| g.grain_type.as_str()).collect();
        types.sort_unstable();
        types.dedup();

        for shape in shapes {
            sqlx::query("INSERT INTO rice_shapes (code) VALUES ($1) ON CONFLICT (code) DO NOTHING")
                .bind(shape)
                .execute(&mut **tx)
                .await?;
        }

        for rice_type in types {
            sqlx::query("INSERT INTO rice_types (code) VALUES ($1) ON CONFLICT (code) DO NOTHING")
                .bind(rice_type)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Get one inspection with its standard name
    pub async fn get_inspection(&self, inspection_id: Uuid) -> AppResult<Inspection> {
        let row = sqlx::query_as::<_, InspectionRow>(
            r#"
            SELECT i.id, i.name, i.standard_id, s.name AS standard_name,
                   i.note, i.price, i.sampling_datetime, i.sampling_points,
                   i.total_samples, i.image_url, i.raw_file_path,
                   i.created_at, i.updated_at
            FROM inspections i
            JOIN standards s ON s.id = i.standard_id
            WHERE i.id = $1
            "#,
        )
        .bind(inspection_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inspection".to_string()))?;

        Ok(row.into())
    }

    /// Paginated history listing, newest first, optionally date-filtered
    pub async fn list_history(
        &self,
        pagination: Pagination,
        range: Option<DateRange>,
    ) -> AppResult<PaginatedResponse<HistoryEntry>> {
        let limit = pagination.limit as i64;
        let offset = pagination.offset() as i64;

        let (entries, total) = match range {
            Some(range) => {
                let entries = sqlx::query_as::<_, HistoryEntry>(
                    r#"
                    SELECT i.id, i.name, i.created_at, s.name AS standard_name,
                           i.note, i.total_samples
                    FROM inspections i
                    JOIN standards s ON s.id = i.standard_id
                    WHERE i.created_at::date BETWEEN $1 AND $2
                    ORDER BY i.created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(range.from)
                .bind(range.to)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.db)
                .await?;

                let total = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM inspections WHERE created_at::date BETWEEN $1 AND $2",
                )
                .bind(range.from)
                .bind(range.to)
                .fetch_one(&self.db)
                .await?;

                (entries, total)
            }
            None => {
                let entries = sqlx::query_as::<_, HistoryEntry>(
                    r#"
                    SELECT i.id, i.name, i.created_at, s.name AS standard_name,
                           i.note, i.total_samples
                    FROM inspections i
                    JOIN standards s ON s.id = i.standard_id
                    ORDER BY i.created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.db)
                .await?;

                let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inspections")
                    .fetch_one(&self.db)
                    .await?;

                (entries, total)
            }
        };

        Ok(PaginatedResponse {
            data: entries,
            total: total as u64,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    /// Edit an inspection's descriptive fields
    pub async fn update_inspection(
        &self,
        inspection_id: Uuid,
        input: UpdateInspectionInput,
    ) -> AppResult<Inspection> {
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Inspection name cannot be empty".to_string(),
                    message_th: "ชื่อการตรวจสอบต้องไม่ว่าง".to_string(),
                });
            }
        }

        if let Some(price) = input.price {
            validate_price(price).map_err(|msg| AppError::Validation {
                field: "price".to_string(),
                message: msg.to_string(),
                message_th: "ราคาต้องอยู่ระหว่าง 0 ถึง 100,000".to_string(),
            })?;
        }

        let sampling_points: Option<Vec<String>> = input
            .sampling_points
            .map(|points| points.iter().map(|p| p.as_str().to_string()).collect());

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE inspections
            SET name = COALESCE($2, name),
                note = COALESCE($3, note),
                price = COALESCE($4, price),
                sampling_datetime = COALESCE($5, sampling_datetime),
                sampling_points = COALESCE($6, sampling_points),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(inspection_id)
        .bind(&input.name)
        .bind(&input.note)
        .bind(input.price)
        .bind(input.sampling_datetime)
        .bind(&sampling_points)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inspection".to_string()))?;

        self.get_inspection(updated).await
    }

    /// Delete inspections and their grain rows, returning the stored
    /// raw-file paths so the caller can remove them from disk
    pub async fn delete_inspections(&self, ids: &[Uuid]) -> AppResult<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.begin().await?;

        let raw_paths = sqlx::query_scalar::<_, Option<String>>(
            "SELECT raw_file_path FROM inspections WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM grain_details WHERE inspection_id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM inspections WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Deleted {} inspections", deleted.rows_affected());

        Ok(raw_paths.into_iter().flatten().collect())
    }
}

/// Serialization failures and deadlocks are worth one more try
fn is_transient(err: &AppError) -> bool {
    match err {
        AppError::DatabaseError(sqlx::Error::Database(db_err)) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}
