//! OAuth2 access tokens
//!
//! Google and Zoho both issue short-lived access tokens from a long-lived
//! refresh token. [`TokenProvider`] performs the `refresh_token` grant and
//! keeps the result until shortly before it expires.

use crate::config::OAuthCredentials;
use crate::services::http::read_json;
use crate::services::ServiceError;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tokens are refreshed this long before the advertised expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Supplies bearer tokens for one upstream service
#[derive(Debug)]
pub struct TokenProvider {
    service: &'static str,
    http: reqwest::Client,
    credentials: OAuthCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider for `service` from its credentials
    pub fn new(service: &'static str, http: reqwest::Client, credentials: OAuthCredentials) -> Self {
        Self {
            service,
            http,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// True when a static token or a complete refresh grant is configured
    pub fn is_configured(&self) -> bool {
        self.credentials.access_token.is_some() || self.refresh_grant().is_some()
    }

    fn refresh_grant(&self) -> Option<(&str, &str, &str)> {
        match (
            self.credentials.client_id.as_deref(),
            self.credentials.client_secret.as_deref(),
            self.credentials.refresh_token.as_deref(),
        ) {
            (Some(id), Some(secret), Some(refresh)) => Some((id, secret, refresh)),
            _ => None,
        }
    }

    /// Return a valid access token, refreshing it if needed
    ///
    /// The lock is held across the refresh so concurrent callers share a
    /// single grant request.
    pub async fn access_token(&self) -> Result<String, ServiceError> {
        if let Some(token) = &self.credentials.access_token {
            return Ok(token.clone());
        }

        let (client_id, client_secret, refresh_token) = self
            .refresh_grant()
            .ok_or(ServiceError::NotConfigured(self.service))?;

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!(service = self.service, token_url = %self.credentials.token_url, "Refreshing access token");

        let response = self
            .http
            .post(&self.credentials.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(ServiceError::transport(self.service))?;

        let token: TokenResponse = read_json(self.service, response).await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }
}
