//! Database models for the Rice Quality Inspection Platform
//!
//! Re-exports models from the shared crate; row structs live next to the
//! services that decode them.

pub use shared::models::*;
