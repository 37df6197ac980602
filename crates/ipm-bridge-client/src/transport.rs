// crates/ipm-bridge-client/src/transport.rs
// ============================================================================
// Module: HTTP Transport
// Description: Blocking JSON transport behind a seam trait.
// Purpose: Isolate wire I/O so catalog, adapter, and runner stay testable.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! All outbound HTTP in this crate flows through the [`Transport`] trait:
//! JSON GET, JSON POST, and form POST. The production implementation wraps
//! a blocking [`reqwest`] client with a request timeout and a fixed user
//! agent; tests substitute local servers or canned transports. Errors are
//! classified into a small closed set so callers can decide whether a
//! retry could help without parsing message strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why an HTTP exchange failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The HTTP client itself could not be constructed.
    #[error("http client construction failed: {detail}")]
    Build {
        /// Builder failure detail.
        detail: String,
    },
    /// The server answered with a non-success status code.
    #[error("`{url}` answered with status {status}")]
    Status {
        /// HTTP status code received.
        status: u16,
        /// Requested URL.
        url: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to `{url}` timed out")]
    Timeout {
        /// Requested URL.
        url: String,
    },
    /// The request failed before a response arrived.
    #[error("request to `{url}` failed: {detail}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying failure detail.
        detail: String,
    },
    /// The response body was not the JSON the caller asked for.
    #[error("response from `{url}` is not valid JSON: {detail}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decode failure detail.
        detail: String,
    },
}

impl TransportError {
    /// Returns true when retrying the same exchange could plausibly
    /// succeed: timeouts and server-side (5xx) failures.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Build { .. } | Self::Request { .. } | Self::Decode { .. } => false,
        }
    }
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Blocking JSON transport seam.
pub trait Transport {
    /// Issues a GET request and decodes the JSON response body.
    ///
    /// # Errors
    /// Returns [`TransportError`] on connection failure, timeout,
    /// non-success status, or an undecodable body.
    fn get_json(&self, url: &Url) -> Result<Value, TransportError>;

    /// Issues a POST request with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    /// Returns [`TransportError`] on connection failure, timeout,
    /// non-success status, or an undecodable body.
    fn post_json(&self, url: &Url, body: &Value) -> Result<Value, TransportError>;

    /// Issues a form-encoded POST request and decodes the JSON response.
    ///
    /// # Errors
    /// Returns [`TransportError`] on connection failure, timeout,
    /// non-success status, or an undecodable body.
    fn post_form(&self, url: &Url, form: &[(String, String)]) -> Result<Value, TransportError>;
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the production transport.
///
/// # Invariants
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: "ipm-bridge/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Reqwest Implementation
// ============================================================================

/// Production transport backed by a blocking [`reqwest`] client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// HTTP client used for outbound requests.
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given configuration.
    ///
    /// # Errors
    /// Returns [`TransportError::Build`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| TransportError::Build { detail: err.to_string() })?;
        Ok(Self { client })
    }

    /// Sends a prepared request and decodes the JSON response body.
    fn dispatch(&self, request: RequestBuilder, url: &Url) -> Result<Value, TransportError> {
        let response = request.send().map_err(|err| classify_send_error(url, &err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.json().map_err(|err| TransportError::Decode {
            url: url.to_string(),
            detail: err.to_string(),
        })
    }
}

impl Transport for ReqwestTransport {
    fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        self.dispatch(self.client.get(url.as_str()), url)
    }

    fn post_json(&self, url: &Url, body: &Value) -> Result<Value, TransportError> {
        self.dispatch(self.client.post(url.as_str()).json(body), url)
    }

    fn post_form(&self, url: &Url, form: &[(String, String)]) -> Result<Value, TransportError> {
        self.dispatch(self.client.post(url.as_str()).form(form), url)
    }
}

/// Classifies a send failure as a timeout or a generic request error.
fn classify_send_error(url: &Url, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout { url: url.to_string() };
    }
    TransportError::Request {
        url: url.to_string(),
        detail: err.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_and_server_errors_are_retryable() {
        let timeout = TransportError::Timeout { url: "https://a.test/".to_string() };
        let unavailable = TransportError::Status { status: 503, url: "https://a.test/".to_string() };
        assert!(timeout.is_retryable());
        assert!(unavailable.is_retryable());
    }

    #[test]
    fn client_errors_and_decode_failures_are_not_retryable() {
        let not_found = TransportError::Status { status: 404, url: "https://a.test/".to_string() };
        let decode = TransportError::Decode {
            url: "https://a.test/".to_string(),
            detail: "expected value".to_string(),
        };
        assert!(!not_found.is_retryable());
        assert!(!decode.is_retryable());
    }
}
