//! Quality standard models
//!
//! A standard is an ordered set of named composition rules. Each rule gates
//! on kernel shape and bounds kernel length with inequality conditions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length comparison operator used by sub-standard bounds
///
/// The set is closed: unknown codes fail at deserialization time instead of
/// silently matching nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    /// value < threshold
    Lt,
    /// value <= threshold
    Le,
    /// value > threshold
    Gt,
    /// value >= threshold
    Ge,
}

/// One composition rule within a standard
///
/// A missing bound is always satisfied. Rules are not mutually exclusive;
/// a grain may match several rules of the same standard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubStandard {
    /// Identifier unique within the owning standard
    pub key: String,
    /// Display name, e.g. "ข้าวเต็มเมล็ด" / "Full grain"
    pub name: String,
    /// Shape codes this rule accepts; shape is a hard gate
    pub shapes: Vec<String>,
    pub min_length: Option<f64>,
    pub condition_min: Condition,
    pub max_length: Option<f64>,
    pub condition_max: Condition,
}

/// A named quality standard with its ordered rules
///
/// Declared rule order drives iteration and rendering order only; it is not
/// a precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    pub id: Uuid,
    pub name: String,
    pub create_date: DateTime<Utc>,
    pub sub_standards: Vec<SubStandard>,
}

/// Input for creating a standard (administrative flow)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStandardInput {
    pub name: String,
    pub sub_standards: Vec<SubStandard>,
}
