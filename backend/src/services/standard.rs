//! Quality standard service

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_sub_standards, CreateStandardInput, Standard, SubStandard};

/// Service for managing quality standards
#[derive(Clone)]
pub struct StandardService {
    db: PgPool,
}

/// Database row for a standard; rules are stored as JSONB
#[derive(Debug, sqlx::FromRow)]
struct StandardRow {
    id: Uuid,
    name: String,
    standard_data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<StandardRow> for Standard {
    fn from(row: StandardRow) -> Self {
        let sub_standards: Vec<SubStandard> =
            serde_json::from_value(row.standard_data).unwrap_or_default();

        Standard {
            id: row.id,
            name: row.name,
            create_date: row.created_at,
            sub_standards,
        }
    }
}

impl StandardService {
    /// Create a new StandardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all standards, newest first
    pub async fn list_standards(&self) -> AppResult<Vec<Standard>> {
        let rows = sqlx::query_as::<_, StandardRow>(
            r#"
            SELECT id, name, standard_data, created_at
            FROM standards
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Get a standard by ID
    pub async fn get_standard(&self, standard_id: Uuid) -> AppResult<Standard> {
        let row = sqlx::query_as::<_, StandardRow>(
            r#"
            SELECT id, name, standard_data, created_at
            FROM standards
            WHERE id = $1
            "#,
        )
        .bind(standard_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Standard".to_string()))?;

        Ok(row.into())
    }

    /// Create a standard (administrative flow); rules are validated first
    pub async fn create_standard(&self, input: CreateStandardInput) -> AppResult<Standard> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Standard name is required".to_string(),
                message_th: "ต้องระบุชื่อมาตรฐาน".to_string(),
            });
        }

        validate_sub_standards(&input.sub_standards)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        let standard_data = serde_json::to_value(&input.sub_standards)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, StandardRow>(
            r#"
            INSERT INTO standards (name, standard_data)
            VALUES ($1, $2)
            RETURNING id, name, standard_data, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&standard_data)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created standard {} ({})", row.name, row.id);

        Ok(row.into())
    }
}
