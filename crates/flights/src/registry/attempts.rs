//! Per-provider failure records for fallback diagnostics.

use std::fmt;

use serde::Serialize;

use crate::errors::FlightSearchError;
use crate::models::ProviderId;

/// Why a provider did not supply the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Connection error or timeout.
    NetworkFailure,

    /// Non-success status or unusable payload.
    ProviderError,

    /// Successful call with zero offers.
    EmptyResult,

    /// Not called, because the query lacks something the provider needs.
    Skipped,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkFailure => "NETWORK_FAILURE",
            Self::ProviderError => "PROVIDER_ERROR",
            Self::EmptyResult => "EMPTY_RESULT",
            Self::Skipped => "SKIPPED",
        }
    }
}

/// Record of a single provider that failed to supply offers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProviderFailure {
    pub provider_id: ProviderId,
    pub kind: FailureKind,
    /// HTTP status for `ProviderError`s raised by a non-success response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProviderFailure {
    pub fn skipped(provider_id: ProviderId, reason: impl Into<String>) -> Self {
        Self {
            provider_id,
            kind: FailureKind::Skipped,
            status: None,
            message: Some(reason.into()),
        }
    }

    pub fn empty(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            kind: FailureKind::EmptyResult,
            status: None,
            message: None,
        }
    }

    /// Record a fallback-class error. Returns `None` for errors that are
    /// not per-provider failures (malformed query, cancellation, ...).
    pub fn from_error(provider_id: ProviderId, error: &FlightSearchError) -> Option<Self> {
        let (kind, status, message) = match error {
            FlightSearchError::NetworkFailure { message, .. } => {
                (FailureKind::NetworkFailure, None, Some(message.clone()))
            }
            FlightSearchError::ProviderError {
                status, message, ..
            } => (FailureKind::ProviderError, *status, Some(message.clone())),
            FlightSearchError::EmptyResult { .. } => (FailureKind::EmptyResult, None, None),
            FlightSearchError::MalformedQuery(_)
            | FlightSearchError::AggregateFailure(_)
            | FlightSearchError::Cancelled => return None,
        };

        Some(Self {
            provider_id,
            kind,
            status,
            message,
        })
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider_id, self.kind.as_str())?;
        match (&self.status, &self.message) {
            (Some(status), Some(message)) => write!(f, " ({} {})", status, message),
            (None, Some(message)) => write!(f, " ({})", message),
            (Some(status), None) => write!(f, " ({})", status),
            (None, None) => Ok(()),
        }
    }
}

/// Every provider was exhausted without a non-empty result.
///
/// Failures are kept in the order providers were tried, so callers can
/// tell "no flights on this route" from "every provider was unreachable".
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AggregateFailure {
    pub failures: Vec<ProviderFailure>,
}

impl AggregateFailure {
    pub fn new(failures: Vec<ProviderFailure>) -> Self {
        Self { failures }
    }

    /// True when at least one provider answered and every provider that
    /// answered had zero offers. Skipped providers don't count either way.
    pub fn is_no_offers(&self) -> bool {
        let mut answered = false;
        for failure in &self.failures {
            match failure.kind {
                FailureKind::EmptyResult => answered = true,
                FailureKind::Skipped => {}
                FailureKind::NetworkFailure | FailureKind::ProviderError => return false,
            }
        }
        answered
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            return "no providers configured".to_string();
        }

        self.failures
            .iter()
            .map(ProviderFailure::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn kinds(&self) -> Vec<FailureKind> {
        self.failures.iter().map(|f| f.kind).collect()
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
