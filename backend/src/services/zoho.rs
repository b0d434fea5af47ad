//! Zoho Sign adapter
//!
//! With a template configured, requests are created from it and sent
//! immediately with `is_quicksend`. Without one, a bare request naming the
//! single signer is created and then submitted in a second call. Zoho wraps
//! every payload in a `requests` object and reports failures with
//! `"status": "failure"` even on some 200 responses, so both are checked.

use crate::services::http::{read_json, require};
use crate::services::{ServiceError, SignatureProvider, TokenProvider};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const SERVICE: &str = "zoho";

/// What to send for signature
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureDispatch {
    /// Sole signer's display name
    pub signer_name: String,
    /// Sole signer's email
    pub signer_email: String,
    /// Name given to the request
    pub document_name: String,
    /// Link included in the request notes (the client's folder)
    #[serde(default)]
    pub share_link: Option<String>,
}

/// A signature request as reported by Zoho
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    /// Zoho request id
    pub request_id: String,
    /// `inprogress`, `completed`, `declined`, `recalled`, `expired`, ...
    pub status: String,
    /// Request name
    pub document_name: String,
}

#[derive(Debug, Deserialize)]
struct RequestEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    requests: Option<RequestBody>,
}

#[derive(Debug, Deserialize)]
struct RequestBody {
    request_id: String,
    #[serde(default)]
    request_status: String,
    #[serde(default)]
    request_name: String,
    #[serde(default)]
    actions: Vec<RequestAction>,
}

#[derive(Debug, Deserialize)]
struct RequestAction {
    #[serde(default)]
    action_id: String,
    #[serde(default)]
    action_type: Option<String>,
    #[serde(default)]
    recipient_email: Option<String>,
    #[serde(default)]
    recipient_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

fn check_envelope(status: &str, message: Option<String>) -> Result<(), ServiceError> {
    if status == "success" {
        return Ok(());
    }
    Err(ServiceError::Http {
        service: SERVICE,
        status: 200,
        body: message.unwrap_or_else(|| format!("status {}", status)),
    })
}

impl TryFrom<RequestEnvelope> for SignatureRequest {
    type Error = ServiceError;

    fn try_from(envelope: RequestEnvelope) -> Result<Self, Self::Error> {
        check_envelope(&envelope.status, envelope.message)?;
        let body = envelope.requests.ok_or_else(|| ServiceError::Decode {
            service: SERVICE,
            message: "response has no `requests` object".to_string(),
        })?;
        Ok(SignatureRequest {
            request_id: body.request_id,
            status: body.request_status,
            document_name: body.request_name,
        })
    }
}

/// Zoho Sign REST client
#[derive(Debug)]
pub struct ZohoSignClient {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: Url,
    template_id: Option<String>,
    template_action_id: Option<String>,
}

impl ZohoSignClient {
    /// Create a client against `base_url` (normally `https://sign.zoho.com`)
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidInput` if `base_url` is not a valid URL.
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<TokenProvider>,
        base_url: &str,
        template_id: Option<String>,
        template_action_id: Option<String>,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid Zoho URL: {}", e)))?;
        Ok(Self {
            http,
            tokens,
            base_url,
            template_id,
            template_action_id,
        })
    }

    fn url(&self, tail: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidInput("Zoho URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(tail);
        Ok(url)
    }

    async fn auth_header(&self) -> Result<String, ServiceError> {
        Ok(format!("Zoho-oauthtoken {}", self.tokens.access_token().await?))
    }

    fn signer_action(dispatch: &SignatureDispatch) -> Value {
        json!({
            "recipient_name": dispatch.signer_name,
            "recipient_email": dispatch.signer_email,
            "action_type": "SIGN",
            "verify_recipient": false,
        })
    }

    async fn post_form(
        &self,
        url: Url,
        form: &[(&str, String)],
    ) -> Result<RequestEnvelope, ServiceError> {
        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header().await?)
            .form(form)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;
        read_json(SERVICE, response).await
    }

    async fn send_from_template(
        &self,
        template_id: &str,
        dispatch: &SignatureDispatch,
    ) -> Result<SignatureRequest, ServiceError> {
        let mut action = Self::signer_action(dispatch);
        if let Some(action_id) = &self.template_action_id {
            action["action_id"] = json!(action_id);
        }

        let data = json!({
            "templates": {
                "request_name": dispatch.document_name,
                "notes": dispatch.share_link.clone().unwrap_or_default(),
                "actions": [action],
            }
        });

        let envelope = self
            .post_form(
                self.url(&["templates", template_id, "createdocument"])?,
                &[("data", data.to_string()), ("is_quicksend", "true".to_string())],
            )
            .await?;
        SignatureRequest::try_from(envelope)
    }

    /// Create a draft request for the single signer, then submit it
    async fn create_and_submit(
        &self,
        dispatch: &SignatureDispatch,
    ) -> Result<SignatureRequest, ServiceError> {
        let mut action = Self::signer_action(dispatch);
        action["signing_order"] = json!(0);

        let data = json!({
            "requests": {
                "request_name": dispatch.document_name,
                "notes": dispatch.share_link.clone().unwrap_or_default(),
                "is_sequential": true,
                "actions": [action],
            }
        });

        let envelope = self
            .post_form(self.url(&["requests"])?, &[("data", data.to_string())])
            .await?;
        check_envelope(&envelope.status, envelope.message.clone())?;
        let draft = envelope.requests.ok_or_else(|| ServiceError::Decode {
            service: SERVICE,
            message: "response has no `requests` object".to_string(),
        })?;

        let actions: Vec<Value> = draft
            .actions
            .iter()
            .map(|a| {
                json!({
                    "action_id": a.action_id,
                    "action_type": a.action_type.as_deref().unwrap_or("SIGN"),
                    "recipient_email": a
                        .recipient_email
                        .as_deref()
                        .unwrap_or(dispatch.signer_email.as_str()),
                    "recipient_name": a
                        .recipient_name
                        .as_deref()
                        .unwrap_or(dispatch.signer_name.as_str()),
                    "verify_recipient": false,
                })
            })
            .collect();
        let submit = json!({ "requests": { "actions": actions } });

        let envelope = self
            .post_form(
                self.url(&["requests", draft.request_id.as_str(), "submit"])?,
                &[("data", submit.to_string())],
            )
            .await?;
        SignatureRequest::try_from(envelope)
    }

    async fn post_action(&self, request_id: &str, action: &str) -> Result<(), ServiceError> {
        require(request_id, "request id")?;
        let response = self
            .http
            .post(self.url(&["requests", request_id, action])?)
            .header(reqwest::header::AUTHORIZATION, self.auth_header().await?)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        let envelope: StatusEnvelope = read_json(SERVICE, response).await?;
        check_envelope(&envelope.status, envelope.message)
    }
}

#[async_trait]
impl SignatureProvider for ZohoSignClient {
    async fn send_for_signature(
        &self,
        dispatch: &SignatureDispatch,
    ) -> Result<SignatureRequest, ServiceError> {
        require(&dispatch.signer_name, "signer name")?;
        require(&dispatch.signer_email, "signer email")?;
        require(&dispatch.document_name, "document name")?;

        tracing::debug!(
            signer = %dispatch.signer_email,
            document = %dispatch.document_name,
            template = self.template_id.is_some(),
            "Sending Zoho Sign request"
        );

        match self.template_id.as_deref() {
            Some(template_id) => self.send_from_template(template_id, dispatch).await,
            None => self.create_and_submit(dispatch).await,
        }
    }

    async fn status(&self, request_id: &str) -> Result<SignatureRequest, ServiceError> {
        require(request_id, "request id")?;
        let response = self
            .http
            .get(self.url(&["requests", request_id])?)
            .header(reqwest::header::AUTHORIZATION, self.auth_header().await?)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        let envelope: RequestEnvelope = read_json(SERVICE, response).await?;
        SignatureRequest::try_from(envelope)
    }

    async fn cancel(&self, request_id: &str) -> Result<(), ServiceError> {
        self.post_action(request_id, "recall").await
    }

    async fn remind(&self, request_id: &str) -> Result<(), ServiceError> {
        self.post_action(request_id, "remind").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthCredentials;
    use mockito::{Matcher, Server};

    fn client(base_url: &str, template: Option<&str>) -> ZohoSignClient {
        let http = reqwest::Client::new();
        let tokens = Arc::new(TokenProvider::new(
            SERVICE,
            http.clone(),
            OAuthCredentials {
                access_token: Some("zoho-token".to_string()),
                ..Default::default()
            },
        ));
        ZohoSignClient::new(http, tokens, base_url, template.map(str::to_string), None).unwrap()
    }

    fn dispatch() -> SignatureDispatch {
        SignatureDispatch {
            signer_name: "Ana".to_string(),
            signer_email: "ana@example.com".to_string(),
            document_name: "Engagement letter - Ana".to_string(),
            share_link: Some("https://drive/f-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_send_from_template() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/templates/tpl-1/createdocument")
            .match_header("authorization", "Zoho-oauthtoken zoho-token")
            .match_body(Matcher::UrlEncoded("is_quicksend".into(), "true".into()))
            .with_status(200)
            .with_body(
                r#"{"status": "success", "requests": {
                    "request_id": "r-9", "request_status": "inprogress",
                    "request_name": "Engagement letter - Ana"}}"#,
            )
            .create_async()
            .await;

        let request = client(&server.url(), Some("tpl-1"))
            .send_for_signature(&dispatch())
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(request.request_id, "r-9");
        assert_eq!(request.status, "inprogress");
    }

    #[tokio::test]
    async fn test_send_without_template_creates_then_submits() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/v1/requests")
            .match_header("authorization", "Zoho-oauthtoken zoho-token")
            .match_body(Matcher::Regex("ana%40example.com".into()))
            .with_status(200)
            .with_body(
                r#"{"status": "success", "requests": {
                    "request_id": "r-7", "request_status": "draft",
                    "request_name": "Engagement letter - Ana",
                    "actions": [{"action_id": "a-1", "action_type": "SIGN",
                                 "recipient_email": "ana@example.com", "recipient_name": "Ana"}]}}"#,
            )
            .create_async()
            .await;
        let submit = server
            .mock("POST", "/api/v1/requests/r-7/submit")
            .match_body(Matcher::Regex("a-1".into()))
            .with_status(200)
            .with_body(
                r#"{"status": "success", "requests": {
                    "request_id": "r-7", "request_status": "inprogress",
                    "request_name": "Engagement letter - Ana"}}"#,
            )
            .create_async()
            .await;

        let request = client(&server.url(), None)
            .send_for_signature(&dispatch())
            .await
            .unwrap();
        create.assert_async().await;
        submit.assert_async().await;
        assert_eq!(request.request_id, "r-7");
        assert_eq!(request.status, "inprogress");
    }

    #[tokio::test]
    async fn test_failed_draft_is_not_submitted() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/api/v1/requests")
            .with_status(200)
            .with_body(r#"{"status": "failure", "message": "Invalid recipient"}"#)
            .create_async()
            .await;
        let submit = server
            .mock("POST", Matcher::Regex("/submit$".into()))
            .expect(0)
            .create_async()
            .await;

        let err = client(&server.url(), None)
            .send_for_signature(&dispatch())
            .await
            .unwrap_err();
        submit.assert_async().await;
        assert!(err.to_string().contains("Invalid recipient"));
    }

    #[tokio::test]
    async fn test_failure_envelope() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/requests/r-9/recall")
            .with_status(200)
            .with_body(r#"{"status": "failure", "message": "Request already completed"}"#)
            .create_async()
            .await;

        let err = client(&server.url(), None).cancel("r-9").await.unwrap_err();
        assert!(err.to_string().contains("Request already completed"));
    }

    #[tokio::test]
    async fn test_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/requests/r-9")
            .with_status(200)
            .with_body(
                r#"{"status": "success", "requests": {
                    "request_id": "r-9", "request_status": "completed", "request_name": "Letter"}}"#,
            )
            .create_async()
            .await;

        let request = client(&server.url(), None).status("r-9").await.unwrap();
        assert_eq!(request.status, "completed");
    }
}
