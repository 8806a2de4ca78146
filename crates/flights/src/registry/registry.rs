//! Provider registry: the fallback orchestrator.
//!
//! The registry owns the ordered provider list and runs the fallback policy:
//! - Providers are tried one at a time in priority order
//! - The first non-empty, valid offer list wins; nothing is merged
//! - Network failures, provider errors and empty results move on to the
//!   next provider; each provider is called at most once
//! - Exhausting the list yields an `AggregateFailure` listing every failure

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::{AggregateFailure, OfferValidator, ProviderFailure};
use crate::errors::{FallbackClass, FlightSearchError};
use crate::models::{Offer, ProviderId, SearchQuery, SearchResult};
use crate::provider::FareProvider;

/// Default bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider registry for orchestrating fare searches.
///
/// Immutable after construction; safe to share across concurrent requests.
pub struct ProviderRegistry {
    /// Sorted by effective priority at construction time.
    providers: Vec<Arc<dyn FareProvider>>,
    validator: OfferValidator,
    provider_timeout: Duration,
}

impl ProviderRegistry {
    /// Create a registry ordered by each provider's own priority.
    pub fn new(providers: Vec<Arc<dyn FareProvider>>) -> Self {
        Self::with_priorities(providers, HashMap::new())
    }

    /// Create a registry with custom priorities.
    ///
    /// # Arguments
    ///
    /// * `providers` - List of fare providers
    /// * `custom_priorities` - Configured priorities (provider_id -> priority).
    ///   Lower values = higher priority. Providers not listed keep their default.
    pub fn with_priorities(
        mut providers: Vec<Arc<dyn FareProvider>>,
        custom_priorities: HashMap<String, u8>,
    ) -> Self {
        // Stable sort: equal priorities keep registration order.
        providers.sort_by_key(|p| {
            custom_priorities
                .get(p.id())
                .copied()
                .unwrap_or_else(|| p.priority())
        });

        Self {
            providers,
            validator: OfferValidator::new(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Bound each provider call; an elapsed call counts as a network failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_validator(mut self, validator: OfferValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Providers in the order they will be tried.
    pub fn providers(&self) -> &[Arc<dyn FareProvider>] {
        &self.providers
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Search providers in priority order, stopping at the first that
    /// returns offers.
    ///
    /// Steps per provider:
    /// 1. Skip it if the query lacks a date the provider requires
    /// 2. Call it under the provider timeout
    /// 3. Validate the batch (positive prices, one currency)
    /// 4. Return on a non-empty batch; otherwise record the failure and move on
    ///
    /// # Errors
    ///
    /// `AggregateFailure` with one entry per provider, in priority order, when
    /// none produced offers. A `FallbackClass::Never` error from a provider
    /// (e.g. `MalformedQuery`) is returned immediately.
    pub async fn search_with_fallback(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResult, FlightSearchError> {
        let mut failures: Vec<ProviderFailure> = Vec::new();

        for provider in &self.providers {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());

            if provider.spec().requires_date && query.date.is_none() {
                debug!("Provider '{}' requires a date, skipping", provider_id);
                failures.push(ProviderFailure::skipped(
                    provider_id,
                    "provider requires a departure date",
                ));
                continue;
            }

            debug!(
                "Searching provider '{}' for {} -> {}",
                provider_id, query.origin, query.destination
            );

            match self.attempt(provider.as_ref(), query).await {
                Ok(offers) if !offers.is_empty() => {
                    info!(
                        "Provider '{}' returned {} offers for {} -> {}",
                        provider_id,
                        offers.len(),
                        query.origin,
                        query.destination
                    );
                    return Ok(SearchResult::new(
                        query.clone(),
                        provider_id,
                        offers,
                        failures,
                    ));
                }
                Ok(_) => {
                    debug!("Provider '{}' returned no offers, trying next", provider_id);
                    failures.push(ProviderFailure::empty(provider_id));
                }
                Err(e) => match e.fallback_class() {
                    FallbackClass::Never => {
                        debug!(
                            "Terminal error from '{}': {:?}, not falling back",
                            provider_id, e
                        );
                        return Err(e);
                    }
                    FallbackClass::NextProvider => {
                        debug!(
                            "Provider '{}' failed with {:?}, trying next provider",
                            provider_id, e
                        );
                        if let Some(failure) = ProviderFailure::from_error(provider_id, &e) {
                            failures.push(failure);
                        }
                    }
                },
            }
        }

        let failure = AggregateFailure::new(failures);
        warn!(
            "No provider had offers for {} -> {}: {}",
            query.origin,
            query.destination,
            failure.summary()
        );
        Err(FlightSearchError::AggregateFailure(failure))
    }

    /// One bounded, validated provider call.
    async fn attempt(
        &self,
        provider: &dyn FareProvider,
        query: &SearchQuery,
    ) -> Result<Vec<Offer>, FlightSearchError> {
        let offers = tokio::time::timeout(self.provider_timeout, provider.search(query))
            .await
            .map_err(|_| FlightSearchError::NetworkFailure {
                provider: provider.id().to_string(),
                message: format!(
                    "Request timed out after {}ms",
                    self.provider_timeout.as_millis()
                ),
            })??;

        self.validator.validate(provider.id(), offers)
    }
}
