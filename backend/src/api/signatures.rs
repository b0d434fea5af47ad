//! Zoho Sign API handlers

use crate::api::utils::{require_email, require_field, MessageResponse};
use crate::error::AppError;
use crate::services::{SignatureDispatch, SignatureRequest};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

/// POST /api/signatures/send - Send a document for signature
pub async fn send_signature(
    State(state): State<SharedState>,
    Json(dispatch): Json<SignatureDispatch>,
) -> Result<(StatusCode, Json<SignatureRequest>), AppError> {
    require_field(&dispatch.signer_name, "Signer name")?;
    require_email(&dispatch.signer_email, "Signer email")?;
    require_field(&dispatch.document_name, "Document name")?;
    let signatures = state.read().await.services.signatures.clone();

    let request = signatures.send_for_signature(&dispatch).await?;
    tracing::info!(request_id = %request.request_id, signer = %dispatch.signer_email, "Signature request sent");
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/signatures/:id - Current state of a request
pub async fn signature_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SignatureRequest>, AppError> {
    let id = require_field(&id, "Request id")?;
    let signatures = state.read().await.services.signatures.clone();
    Ok(Json(signatures.status(id).await?))
}

/// POST /api/signatures/:id/cancel - Recall a request
pub async fn cancel_signature(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = require_field(&id, "Request id")?;
    let signatures = state.read().await.services.signatures.clone();

    signatures.cancel(id).await?;
    tracing::info!(request_id = %id, "Signature request recalled");
    Ok(Json(MessageResponse::ok(format!("Signature request {} recalled", id))))
}

/// POST /api/signatures/:id/remind - Remind the signer
pub async fn remind_signature(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = require_field(&id, "Request id")?;
    let signatures = state.read().await.services.signatures.clone();

    signatures.remind(id).await?;
    Ok(Json(MessageResponse::ok(format!("Reminder sent for {}", id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_send_and_follow_up() {
        let dir = TempDir::new().unwrap();
        let (state, host) = test_state(&dir, false);

        let (status, request) = send_signature(
            State(state.clone()),
            Json(SignatureDispatch {
                signer_name: "Ana".to_string(),
                signer_email: "ana@example.com".to_string(),
                document_name: "Engagement letter - Ana".to_string(),
                share_link: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let id = request.request_id.clone();
        let current = signature_status(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(current.status, "completed");
        let cancelled = cancel_signature(State(state.clone()), Path(id.clone()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, "ok");
        let reminded = remind_signature(State(state), Path(id)).await.unwrap();
        assert_eq!(reminded.status, "ok");

        assert_eq!(
            host.calls(),
            vec![
                "send_for_signature:ana@example.com",
                "status:sig-1",
                "cancel:sig-1",
                "remind:sig-1",
            ]
        );
    }

    #[tokio::test]
    async fn test_send_rejects_bad_signer() {
        let dir = TempDir::new().unwrap();
        let (state, host) = test_state(&dir, false);

        let result = send_signature(
            State(state),
            Json(SignatureDispatch {
                signer_name: "Ana".to_string(),
                signer_email: "ana".to_string(),
                document_name: "Letter".to_string(),
                share_link: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(host.calls().is_empty());
    }
}
