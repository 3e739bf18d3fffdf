//! Shared types and models for the Rice Quality Inspection Platform
//!
//! This crate contains the grain classification engine and the types shared
//! between the backend, the browser client (via WASM), and other components
//! of the system.

pub mod classify;
pub mod models;
pub mod types;
pub mod validation;

pub use classify::*;
pub use models::*;
pub use types::*;
pub use validation::*;
