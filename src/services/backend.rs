// Backend HTTP client
// Posts the onboarding form to the backend from a worker thread

use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Default backend address
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";

/// Error types for backend calls
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the response not read
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with an error status
    #[error("Backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

/// The three onboarding fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OnboardingForm {
    /// Client id
    pub id: String,
    /// Client name
    pub name: String,
    /// Client email
    pub email: String,
}

impl OnboardingForm {
    /// Check the fields before submitting
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Client id is required".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Client name is required".to_string());
        }
        if !self.email.contains('@') {
            return Err("A valid email is required".to_string());
        }
        Ok(())
    }
}

/// Blocking client for the backend API
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl BackendClient {
    /// Client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Client for `LEDGERLINE_API_URL`, or the default address
    pub fn from_env() -> Self {
        let url = std::env::var("LEDGERLINE_API_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::new(url)
    }

    /// Backend address
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run the onboarding workflow and return the raw response
    ///
    /// JSON bodies are pretty-printed for display; anything else is returned
    /// as received.
    pub fn onboard(&self, form: &OnboardingForm) -> Result<String, BackendError> {
        let response = self
            .http
            .post(format!("{}/api/workflow/onboard", self.base_url))
            .json(form)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| serde_json::to_string_pretty(&json).ok())
            .unwrap_or(body))
    }
}

/// Finished onboarding request
#[derive(Debug)]
pub struct OnboardingResult {
    /// Submitted form
    pub form: OnboardingForm,
    /// Raw response text, or the error
    pub result: Result<String, String>,
}

/// Runs onboarding requests off the UI thread
pub struct OnboardingRunner {
    client: BackendClient,
    tx: Sender<OnboardingResult>,
    rx: Receiver<OnboardingResult>,
    in_flight: bool,
}

impl OnboardingRunner {
    /// Runner posting to `client`
    pub fn new(client: BackendClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            tx,
            rx,
            in_flight: false,
        }
    }

    /// Backend address
    pub fn backend_url(&self) -> &str {
        self.client.base_url()
    }

    /// Whether a request is running
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a request; ignored while another one is running
    /// Returns true if the request was started
    pub fn submit(&mut self, form: OnboardingForm) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;

        let client = self.client.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = client.onboard(&form).map_err(|e| e.to_string());
            let _ = tx.send(OnboardingResult { form, result });
        });
        true
    }

    /// The finished request, if any
    pub fn poll(&mut self) -> Option<OnboardingResult> {
        let result = self.rx.try_recv().ok();
        if result.is_some() {
            self.in_flight = false;
        }
        result
    }
}
