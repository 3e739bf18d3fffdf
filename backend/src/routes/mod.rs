//! Route definitions for the Rice Quality Inspection Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Quality standards
        .nest("/standards", standard_routes())
        // Inspection ingestion and editing
        .nest("/inspections", inspection_routes())
        // Inspection history
        .nest("/history", history_routes())
        // Classification results
        .nest("/results", result_routes())
}

/// Quality standard routes
fn standard_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_standards).post(handlers::create_standard),
        )
        .route("/:standard_id", get(handlers::get_standard))
}

/// Inspection ingestion routes
fn inspection_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_inspection))
        .route("/:inspection_id", put(handlers::update_inspection))
}

/// Inspection history routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_history))
        // Delete takes a comma-separated id list, matching the client
        .route(
            "/:inspection_ids",
            get(handlers::get_history_entry).delete(handlers::delete_inspections),
        )
}

/// Classification result routes
fn result_routes() -> Router<AppState> {
    Router::new().route("/:inspection_id", get(handlers::get_result))
}
