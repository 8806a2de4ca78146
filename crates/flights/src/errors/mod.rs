//! Error types and fallback classification for the flight aggregator.
//!
//! This module provides:
//! - [`FlightSearchError`]: The main error enum for all search and link operations
//! - [`FallbackClass`]: Classification for determining fallback behavior

mod fallback;

pub use fallback::FallbackClass;

use thiserror::Error;

use crate::registry::AggregateFailure;

/// Errors that can occur while searching for flight offers.
///
/// Each variant is classified into a [`FallbackClass`] via the
/// [`fallback_class`](Self::fallback_class) method, which determines how the
/// provider registry reacts when a provider returns it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlightSearchError {
    /// The query (or a booking-link input) is invalid.
    /// This is the caller's fault and is never retried.
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// The provider could not be reached: connection refused, DNS failure,
    /// or the call exceeded its timeout.
    #[error("Network failure: {provider} - {message}")]
    NetworkFailure {
        /// The provider that could not be reached
        provider: String,
        /// Transport-level description of the failure
        message: String,
    },

    /// The provider answered, but not with usable data: a non-success
    /// status, an explicit failure flag, or a payload that failed validation.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// HTTP status, when the failure came from a non-success response
        status: Option<u16>,
        /// Upstream message if one was present
        message: String,
    },

    /// The provider answered successfully with zero offers.
    #[error("Empty result: {provider}")]
    EmptyResult {
        /// The provider that had no offers
        provider: String,
    },

    /// Every provider was tried and none produced offers.
    #[error("All providers failed: {0}")]
    AggregateFailure(AggregateFailure),

    /// The caller abandoned the request before it completed.
    #[error("Search cancelled")]
    Cancelled,
}

impl FlightSearchError {
    /// Create a new malformed-query error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedQuery(message.into())
    }

    /// Returns the fallback classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use farescout_flights::errors::{FallbackClass, FlightSearchError};
    ///
    /// let error = FlightSearchError::EmptyResult { provider: "AMADEUS".to_string() };
    /// assert_eq!(error.fallback_class(), FallbackClass::NextProvider);
    ///
    /// let error = FlightSearchError::malformed("origin must be 3 letters");
    /// assert_eq!(error.fallback_class(), FallbackClass::Never);
    /// ```
    pub fn fallback_class(&self) -> FallbackClass {
        match self {
            Self::NetworkFailure { .. } | Self::ProviderError { .. } | Self::EmptyResult { .. } => {
                FallbackClass::NextProvider
            }
            Self::MalformedQuery(_) | Self::AggregateFailure(_) | Self::Cancelled => {
                FallbackClass::Never
            }
        }
    }
}
