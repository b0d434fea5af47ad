//! Client record API handlers
//!
//! Create, update, delete and search client records. Create and update are both
//! merge upserts; update and delete additionally require the record to exist.

use crate::api::utils::{require_email, require_field, MessageResponse};
use crate::error::AppError;
use crate::services::ClientRecord;
use crate::state::SharedState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client write request: `id` plus any number of record fields
#[derive(Debug, Deserialize)]
pub struct ClientPayload {
    /// Client id (record key)
    #[serde(default)]
    pub id: String,
    /// Fields merged into the record
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ClientPayload {
    fn validate(&self) -> Result<&str, AppError> {
        let id = require_field(&self.id, "Client id")?;
        if self.fields.is_empty() {
            return Err(AppError::Validation(
                "At least one client field is required".to_string(),
            ));
        }
        if let Some(email) = self.fields.get("email") {
            let email = email.as_str().ok_or_else(|| {
                AppError::Validation("Client email must be a string".to_string())
            })?;
            require_email(email, "Client email")?;
        }
        Ok(id)
    }
}

/// Delete request
#[derive(Debug, Deserialize)]
pub struct DeleteClientRequest {
    /// Client id
    #[serde(default)]
    pub id: String,
}

/// Search query string
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Name prefix; empty matches everything
    #[serde(default)]
    pub q: String,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct ClientSearchResponse {
    /// Matching records
    pub clients: Vec<ClientRecord>,
    /// Number of matches
    pub count: usize,
}

/// POST /api/clients - Create a client (merge upsert)
pub async fn create_client(
    State(state): State<SharedState>,
    Json(request): Json<ClientPayload>,
) -> Result<(StatusCode, Json<ClientRecord>), AppError> {
    let id = request.validate()?;
    let records = state.read().await.services.records.clone();

    let record = records.upsert(id, &request.fields).await?;
    tracing::info!(client_id = %record.id, "Client record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/clients/update - Merge fields into an existing client
pub async fn update_client(
    State(state): State<SharedState>,
    Json(request): Json<ClientPayload>,
) -> Result<Json<ClientRecord>, AppError> {
    let id = request.validate()?;
    let records = state.read().await.services.records.clone();

    if records.get(id).await?.is_none() {
        return Err(AppError::ClientNotFound(id.to_string()));
    }

    let record = records.upsert(id, &request.fields).await?;
    tracing::info!(client_id = %record.id, fields = request.fields.len(), "Client record updated");
    Ok(Json(record))
}

/// POST /api/clients/delete - Delete a client record
pub async fn delete_client(
    State(state): State<SharedState>,
    Json(request): Json<DeleteClientRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = require_field(&request.id, "Client id")?;
    let records = state.read().await.services.records.clone();

    if records.get(id).await?.is_none() {
        return Err(AppError::ClientNotFound(id.to_string()));
    }

    records.delete(id).await?;
    tracing::info!(client_id = %id, "Client record deleted");
    Ok(Json(MessageResponse::ok(format!("Client {} deleted", id))))
}

/// GET /api/clients/search?q= - Search clients by name prefix
pub async fn search_clients(
    State(state): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ClientSearchResponse>, AppError> {
    let records = state.read().await.services.records.clone();
    let clients = records.search(query.q.trim()).await?;

    Ok(Json(ClientSearchResponse {
        count: clients.len(),
        clients,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use serde_json::json;
    use tempfile::TempDir;

    fn payload(value: Value) -> ClientPayload {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_update_merges() {
        let dir = TempDir::new().unwrap();
        let (state, _) = test_state(&dir, false);

        let (status, created) = create_client(
            State(state.clone()),
            Json(payload(json!({"id": "c-1", "name": "Ana", "phone": "555"}))),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id, "c-1");

        let updated = update_client(
            State(state),
            Json(payload(json!({"id": "c-1", "email": "ana@example.com"}))),
        )
        .await
        .unwrap();
        assert_eq!(updated.fields["name"], json!("Ana"));
        assert_eq!(updated.fields["phone"], json!("555"));
        assert_eq!(updated.fields["email"], json!("ana@example.com"));
    }

    #[tokio::test]
    async fn test_update_missing_client() {
        let dir = TempDir::new().unwrap();
        let (state, _) = test_state(&dir, false);

        let result = update_client(
            State(state),
            Json(payload(json!({"id": "ghost", "name": "Nobody"}))),
        )
        .await;
        assert!(matches!(result, Err(AppError::ClientNotFound(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let dir = TempDir::new().unwrap();
        let (state, _) = test_state(&dir, false);

        let missing_id =
            create_client(State(state.clone()), Json(payload(json!({"name": "Ana"})))).await;
        assert!(matches!(missing_id, Err(AppError::Validation(_))));

        let no_fields = create_client(State(state.clone()), Json(payload(json!({"id": "c-1"})))).await;
        assert!(matches!(no_fields, Err(AppError::Validation(_))));

        let bad_email = create_client(
            State(state),
            Json(payload(json!({"id": "c-1", "email": "nope"}))),
        )
        .await;
        assert!(matches!(bad_email, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_and_delete() {
        let dir = TempDir::new().unwrap();
        let (state, _) = test_state(&dir, false);

        for (id, name) in [("c-1", "Ana Ruiz"), ("c-2", "Andrés Gil"), ("c-3", "Bea Sol")] {
            let (status, _) = create_client(
                State(state.clone()),
                Json(payload(json!({"id": id, "name": name}))),
            )
            .await
            .unwrap();
            assert_eq!(status, StatusCode::CREATED);
        }

        let found = search_clients(
            State(state.clone()),
            Query(SearchQuery { q: "An".to_string() }),
        )
        .await
        .unwrap();
        assert_eq!(found.count, 2);

        let deleted = delete_client(
            State(state.clone()),
            Json(DeleteClientRequest { id: "c-1".to_string() }),
        )
        .await
        .unwrap();
        assert_eq!(deleted.status, "ok");

        let again = delete_client(
            State(state.clone()),
            Json(DeleteClientRequest { id: "c-1".to_string() }),
        )
        .await;
        assert!(matches!(again, Err(AppError::ClientNotFound(_))));

        let all = search_clients(State(state), Query(SearchQuery { q: String::new() }))
            .await
            .unwrap();
        assert_eq!(all.count, 2);
    }
}
