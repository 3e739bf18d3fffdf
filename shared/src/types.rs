//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters for the history listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    /// Row offset for the requested page (pages are 1-based)
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.limit
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Inclusive date range filter for history queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRange {
    pub from: chrono::NaiveDate,
    pub to: chrono::NaiveDate,
}
