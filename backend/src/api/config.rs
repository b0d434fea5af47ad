//! apiConfig.json API handlers

use crate::error::AppError;
use crate::state::SharedState;
use axum::{extract::State, response::Json};
use serde::Serialize;
use serde_json::Value;

/// Save response
#[derive(Debug, Serialize)]
pub struct SaveConfigResponse {
    /// Status indicator
    pub status: String,
    /// File written
    pub path: String,
    /// The document as now stored
    pub config: Value,
}

/// GET /api/config - Load apiConfig.json
///
/// Reads the file on every call so hand edits are picked up.
pub async fn get_config(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    let mut state = state.write().await;
    let document = state.config_store.load()?;
    state.set_api_config(document.clone());
    Ok(Json(document))
}

/// POST /api/config/save - Replace apiConfig.json with the request body
///
/// The body is written pretty-printed with its key order intact, and its
/// overrides apply to subsequent requests.
pub async fn save_config(
    State(state): State<SharedState>,
    Json(document): Json<Value>,
) -> Result<Json<SaveConfigResponse>, AppError> {
    let mut state = state.write().await;
    state.config_store.save(&document)?;
    state.set_api_config(document.clone());

    Ok(Json(SaveConfigResponse {
        status: "ok".to_string(),
        path: state.config_store.path().display().to_string(),
        config: document,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let (state, _) = test_state(&dir, false);
        let document: Value = serde_json::from_str(
            r#"{"sheetId": "s-1", "filePrefix": "[VIP] ", "extra": {"z": 1, "a": [1, 2]}}"#,
        )
        .unwrap();

        let saved = save_config(State(state.clone()), Json(document.clone()))
            .await
            .unwrap();
        assert_eq!(saved.config, document);

        let on_disk = std::fs::read_to_string(dir.path().join("apiConfig.json")).unwrap();
        assert_eq!(on_disk, serde_json::to_string_pretty(&document).unwrap());

        let loaded = get_config(State(state.clone())).await.unwrap();
        assert_eq!(loaded.0, document);
        assert_eq!(state.read().await.file_prefix(), "[VIP] ");
    }

    #[tokio::test]
    async fn test_load_without_file() {
        let dir = TempDir::new().unwrap();
        let (state, _) = test_state(&dir, false);
        let loaded = get_config(State(state)).await.unwrap();
        assert_eq!(loaded.0, serde_json::json!({}));
    }
}
