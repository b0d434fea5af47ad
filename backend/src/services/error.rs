//! Adapter error types
//!
//! Errors raised by the external service adapters. Adapters never retry; every
//! variant is terminal for the request that triggered it.

use thiserror::Error;

/// Errors that can occur while talking to an external service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service answered with a non-success HTTP status
    #[error("{service} returned HTTP {status}: {body}")]
    Http {
        /// Short service name (e.g. "drive")
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("{service} request failed: {source}")]
    Transport {
        /// Short service name
        service: &'static str,
        /// Underlying client error
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape
    #[error("Failed to decode {service} response: {message}")]
    Decode {
        /// Short service name
        service: &'static str,
        /// Parser message
        message: String,
    },

    /// Credentials or ids needed for the call are missing
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Caller-supplied input was rejected before any call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SMTP delivery failed
    #[error("Mail delivery failed: {0}")]
    Mail(String),
}

impl ServiceError {
    /// Build a transport error for `service`
    pub fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ServiceError::Transport { service, source }
    }

    /// True when the service reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Http { status: 404, .. })
    }
}
