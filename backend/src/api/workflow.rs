//! Onboarding workflow API handlers
//!
//! `POST /api/workflow/onboard` returns the aggregate outcome as JSON.
//! `POST /api/workflow/onboard/stream` runs the same workflow and streams one
//! SSE event per step state change, then the outcome, then `[DONE]`.

use crate::api::streaming::{sse_response, SSE_DONE_SIGNAL, SSE_ERROR_PREFIX};
use crate::error::AppError;
use crate::state::SharedState;
use crate::workflow::{OnboardingOutcome, OnboardingRequest};
use axum::{extract::State, response::Json, response::Response};
use futures_util::stream::Stream;
use tokio::sync::mpsc;

/// POST /api/workflow/onboard - Provision a new client
///
/// # Flow
/// 1. Merge-upsert the client record
/// 2. Create the client folder and share it with the client
/// 3. Send the engagement letter for signature
/// 4. Prefix the folder's files and report the renames
pub async fn onboard(
    State(state): State<SharedState>,
    Json(request): Json<OnboardingRequest>,
) -> Result<Json<OnboardingOutcome>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let workflow = state.read().await.onboarding_workflow();

    let outcome = workflow.run(&request).await?;
    tracing::info!(
        client_id = %outcome.client_id,
        folder_id = %outcome.folder_id,
        signature_request_id = %outcome.signature_request_id,
        renamed = outcome.renamed_files,
        "Client onboarded"
    );
    Ok(Json(outcome))
}

/// POST /api/workflow/onboard/stream - Provision a new client with SSE progress
///
/// Validation failures are returned as a plain 400 before the stream starts.
pub async fn onboard_stream(
    State(state): State<SharedState>,
    Json(request): Json<OnboardingRequest>,
) -> Result<Response, AppError> {
    request.validate().map_err(AppError::Validation)?;
    sse_response(create_onboarding_stream(state, request))
}

fn create_onboarding_stream(
    state: SharedState,
    request: OnboardingRequest,
) -> impl Stream<Item = Result<String, axum::Error>> {
    use async_stream::stream;

    stream! {
        let workflow = state.read().await.onboarding_workflow();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            workflow.run_with_progress(&request, Some(&tx)).await
        });

        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => yield Ok(json),
                Err(e) => tracing::warn!("Failed to serialize step event: {}", e),
            }
        }

        match handle.await {
            Ok(Ok(outcome)) => {
                match serde_json::to_string(&serde_json::json!({ "outcome": outcome })) {
                    Ok(json) => yield Ok(json),
                    Err(e) => yield Ok(format!("{} {}", SSE_ERROR_PREFIX, e)),
                }
            }
            Ok(Err(e)) => {
                yield Ok(format!("{} {}", SSE_ERROR_PREFIX, AppError::from(e)));
            }
            Err(e) => {
                tracing::error!("Onboarding task panicked: {}", e);
                yield Ok(format!("{} Onboarding task failed: {}", SSE_ERROR_PREFIX, e));
            }
        }

        yield Ok(SSE_DONE_SIGNAL.to_string());
    }
}
