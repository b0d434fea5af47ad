//! Email API handler

use crate::api::utils::{require_email, require_field, MessageResponse};
use crate::error::AppError;
use crate::services::OutgoingMail;
use crate::state::SharedState;
use axum::{extract::State, response::Json};

/// POST /api/email/send - Send a plain-text email over SMTP
pub async fn send_email(
    State(state): State<SharedState>,
    Json(mail): Json<OutgoingMail>,
) -> Result<Json<MessageResponse>, AppError> {
    let to = require_email(&mail.to, "Recipient")?;
    require_field(&mail.subject, "Subject")?;

    let mailer = state
        .read()
        .await
        .services
        .mailer
        .clone()
        .ok_or_else(|| AppError::Config("SMTP is not configured".to_string()))?;

    mailer.send(&mail).await?;
    Ok(Json(MessageResponse::ok(format!("Email sent to {}", to))))
}
