//! API module
//!
//! Contains the HTTP request handlers and the route table.

pub mod clients;
pub mod config;
pub mod drive;
pub mod email;
pub mod signatures;
pub mod streaming;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
    /// Human-readable message
    pub message: String,
}

/// GET /api/health - Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}

/// All routes, bound to `state`
///
/// Middleware is layered by the binary.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // Client records
        .route("/api/clients", post(clients::create_client))
        .route("/api/clients/update", post(clients::update_client))
        .route("/api/clients/delete", post(clients::delete_client))
        .route("/api/clients/search", get(clients::search_clients))
        // Drive and Sheets
        .route("/api/drive/folders", post(drive::create_folder))
        .route("/api/drive/sync-sheet", post(drive::sync_sheet))
        .route("/api/drive/fix-permissions", post(drive::fix_permissions))
        .route("/api/drive/sort-files", post(drive::sort_files))
        // Onboarding workflow
        .route("/api/workflow/onboard", post(workflow::onboard))
        .route("/api/workflow/onboard/stream", post(workflow::onboard_stream))
        // Zoho Sign
        .route("/api/signatures/send", post(signatures::send_signature))
        .route("/api/signatures/:id", get(signatures::signature_status))
        .route("/api/signatures/:id/cancel", post(signatures::cancel_signature))
        .route("/api/signatures/:id/remind", post(signatures::remind_signature))
        // Email
        .route("/api/email/send", post(email::send_email))
        // apiConfig.json
        .route("/api/config", get(config::get_config))
        .route("/api/config/save", post(config::save_config))
        .with_state(state)
}
