//! Response helpers shared by the REST adapters

use crate::services::ServiceError;
use serde::de::DeserializeOwned;

/// Fail with [`ServiceError::Http`] unless the response status is 2xx
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());

    tracing::error!(
        service = service,
        status_code = status.as_u16(),
        error_body = %body,
        "Upstream service returned error status"
    );

    Err(ServiceError::Http {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Check the status and decode a JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let response = ensure_success(service, response).await?;
    let body = response
        .text()
        .await
        .map_err(ServiceError::transport(service))?;

    serde_json::from_str(&body).map_err(|e| ServiceError::Decode {
        service,
        message: format!("{} - Response body: {}", e, body),
    })
}

/// Reject blank required inputs before any request is issued
pub(crate) fn require(value: &str, what: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} is required", what)));
    }
    Ok(())
}
