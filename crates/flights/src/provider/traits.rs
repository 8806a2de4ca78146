//! Fare provider trait definitions.
//!
//! This module defines the core `FareProvider` trait that all
//! flight price providers must implement.

use async_trait::async_trait;

use crate::errors::FlightSearchError;
use crate::models::{Offer, SearchQuery};

use super::spec::ProviderSpec;

/// Trait for flight price providers.
///
/// Implement this trait to add support for a new price source. Each
/// implementation owns its request shape and its response normalization;
/// the registry only ever sees canonical [`Offer`]s or a typed failure.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use farescout_flights::provider::{FareProvider, ProviderSpec};
///
/// struct MyProvider {
///     client: reqwest::Client,
/// }
///
/// #[async_trait]
/// impl FareProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn spec(&self) -> ProviderSpec {
///         ProviderSpec::default()
///     }
///
///     // ... implement search
/// }
/// ```
#[async_trait]
pub trait FareProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "AMADEUS" or "TRAVELPAYOUTS".
    /// Used for logging, failure reports and `Offer::provider_id`.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = tried earlier. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Static call requirements for this provider.
    fn spec(&self) -> ProviderSpec;

    /// Search for offers matching the query.
    ///
    /// # Returns
    ///
    /// A non-empty list of offers in the provider's own order, all in one
    /// currency. Zero offers is reported as `EmptyResult`, not `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// - `MalformedQuery` if a request cannot be built from the query
    /// - `NetworkFailure` on connection errors or timeouts
    /// - `ProviderError` on non-success responses or unusable payloads
    /// - `EmptyResult` when the call succeeded but found nothing
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Offer>, FlightSearchError>;
}
