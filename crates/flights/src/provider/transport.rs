//! HTTP plumbing shared by the provider implementations.
//!
//! Maps reqwest transport failures to `NetworkFailure` and non-success
//! responses to `ProviderError`, keeping the upstream message when the body
//! carries one.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::FlightSearchError;

/// Longest raw body excerpt kept in an error message.
const MAX_BODY_EXCERPT: usize = 200;

/// Error body shapes seen from the fare API (`detail` is FastAPI's).
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: Option<Value>,
    error: Option<String>,
    message: Option<String>,
}

/// Build a client whose every request is bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Join a base URL and an absolute path without doubling the slash.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Classify a failed `send()` or body read.
pub(crate) fn network_failure(provider: &str, error: reqwest::Error) -> FlightSearchError {
    let message = if error.is_timeout() {
        format!("Request timed out: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        format!("Request failed: {}", error)
    };

    FlightSearchError::NetworkFailure {
        provider: provider.to_string(),
        message,
    }
}

/// Read a response body, turning non-success statuses into `ProviderError`.
pub(crate) async fn read_body(
    provider: &str,
    response: Response,
) -> Result<String, FlightSearchError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FlightSearchError::ProviderError {
            provider: provider.to_string(),
            status: Some(status.as_u16()),
            message: upstream_message(&body).unwrap_or_else(|| format!("HTTP {}", status)),
        });
    }

    response
        .text()
        .await
        .map_err(|e| network_failure(provider, e))
}

/// Decode a JSON body, reporting malformed payloads as `ProviderError`.
pub(crate) fn parse_json<T: DeserializeOwned>(
    provider: &str,
    body: &str,
) -> Result<T, FlightSearchError> {
    serde_json::from_str(body).map_err(|e| FlightSearchError::ProviderError {
        provider: provider.to_string(),
        status: None,
        message: format!("Failed to parse response: {}", e),
    })
}

/// Best-effort extraction of a human-readable message from an error body.
pub(crate) fn upstream_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(trimmed) {
        let detail = parsed.detail.map(|d| match d {
            Value::String(s) => s,
            other => other.to_string(),
        });
        if let Some(message) = detail.or(parsed.error).or(parsed.message) {
            return Some(message);
        }
    }

    Some(trimmed.chars().take(MAX_BODY_EXCERPT).collect())
}
