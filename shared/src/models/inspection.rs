//! Inspection models and classification output types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the sample was drawn in the milling line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPoint {
    FrontEnd,
    BackEnd,
    Other,
}

impl SamplingPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplingPoint::FrontEnd => "front_end",
            SamplingPoint::BackEnd => "back_end",
            SamplingPoint::Other => "other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "front_end" => Some(SamplingPoint::FrontEnd),
            "back_end" => Some(SamplingPoint::BackEnd),
            "other" => Some(SamplingPoint::Other),
            _ => None,
        }
    }
}

/// One stored inspection (a measured batch graded against a standard)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "standardID")]
    pub standard_id: Uuid,
    pub standard_name: String,
    pub note: Option<String>,
    pub price: Option<Decimal>,
    pub sampling_datetime: Option<DateTime<Utc>>,
    pub sampling_points: Vec<SamplingPoint>,
    pub total_samples: i64,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub raw_file_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One composition class that matched at least one grain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub name: String,
    pub percentage: f64,
    /// Display string for the rule's length bounds, e.g. "≥7 - <9"
    pub length_range: String,
    pub grains: Vec<super::GrainRecord>,
}

/// Grains that matched no rule of the standard
///
/// Always present in a summary, even at 0%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclassifiedResult {
    pub percentage: f64,
    pub grains: Vec<super::GrainRecord>,
}

/// Share of the batch bearing one type code, independent of composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectResult {
    #[serde(rename = "type")]
    pub grain_type: String,
    pub percentage: f64,
}

/// Aggregated classification of one grain batch against one standard
///
/// Computed fresh on every read; nothing here is cached or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionSummary {
    pub standard_name: String,
    pub total_samples: usize,
    pub classifications: Vec<ClassificationResult>,
    pub unclassified: UnclassifiedResult,
    pub defects: Vec<DefectResult>,
}
