//! Classification result service
//!
//! Results are computed on read: the stored grains and the owning standard
//! are fetched as one consistent snapshot and handed to the pure engine in
//! the shared crate. Nothing is cached; identical inputs give identical
//! summaries.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::{InspectionService, StandardService};
use shared::{classify, GrainRecord, Inspection, InspectionSummary};

/// Service for computing inspection results
#[derive(Clone)]
pub struct ResultService {
    db: PgPool,
}

/// Database row for one grain joined with its lookup codes
#[derive(Debug, sqlx::FromRow)]
struct GrainRow {
    length: f64,
    weight: f64,
    shape: String,
    grain_type: String,
}

impl From<GrainRow> for GrainRecord {
    fn from(row: GrainRow) -> Self {
        GrainRecord {
            length: row.length,
            weight: row.weight,
            shape: row.shape,
            grain_type: row.grain_type,
        }
    }
}

/// Inspection metadata together with its freshly computed summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResultResponse {
    pub inspection: Inspection,
    pub results: InspectionSummary,
}

impl ResultService {
    /// Create a new ResultService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch an inspection's snapshot and classify it against its standard
    pub async fn get_result(&self, inspection_id: Uuid) -> AppResult<InspectionResultResponse> {
        let inspection = InspectionService::new(self.db.clone())
            .get_inspection(inspection_id)
            .await?;

        let standard = StandardService::new(self.db.clone())
            .get_standard(inspection.standard_id)
            .await?;

        let grains = self.get_grains(inspection_id).await?;

        tracing::debug!(
            "Classifying {} grains of inspection {} against standard {}",
            grains.len(),
            inspection_id,
            standard.name
        );

        let results = classify(&grains, &standard);

        Ok(InspectionResultResponse {
            inspection,
            results,
        })
    }

    /// Load the stored grain batch for an inspection
    async fn get_grains(&self, inspection_id: Uuid) -> AppResult<Vec<GrainRecord>> {
        let rows = sqlx::query_as::<_, GrainRow>(
            r#"
            SELECT gd.length, gd.weight,
                   rs.code AS shape, rt.code AS grain_type
            FROM grain_details gd
            JOIN rice_shapes rs ON rs.id = gd.shape_id
            JOIN rice_types rt ON rt.id = gd.rice_type_id
            WHERE gd.inspection_id = $1
            ORDER BY gd.id
            "#,
        )
        .bind(inspection_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}
