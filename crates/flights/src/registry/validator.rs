//! Offer batch validation.
//!
//! Validates the offers one provider returned before they become a result:
//! - Prices must be positive and below a sanity ceiling (soft: offer dropped)
//! - Every offer must carry the same currency (hard: batch rejected)
//!
//! The single-currency check is what makes `lowest_price` meaningful; no
//! currency conversion happens anywhere in the crate.

use log::warn;
use rust_decimal::Decimal;

use crate::errors::FlightSearchError;
use crate::models::Offer;

/// Offer validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Maximum believable fare (for sanity check).
    pub max_price: Option<Decimal>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_price: Some(Decimal::from(1_000_000i64)),
        }
    }
}

/// Offer batch validator.
#[derive(Clone, Debug, Default)]
pub struct OfferValidator {
    config: ValidatorConfig,
}

impl OfferValidator {
    /// Create a new validator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate one provider's batch.
    ///
    /// Returns the surviving offers in their original order. An empty input
    /// stays empty; a non-empty input that loses every offer, or one that
    /// mixes currencies, is a `ProviderError`.
    pub fn validate(
        &self,
        provider: &str,
        offers: Vec<Offer>,
    ) -> Result<Vec<Offer>, FlightSearchError> {
        let original_count = offers.len();

        let valid: Vec<Offer> = offers
            .into_iter()
            .filter(|offer| match self.price_issue(offer) {
                Some(issue) => {
                    warn!("Dropping {} offer priced {}: {}", provider, offer.price, issue);
                    false
                }
                None => true,
            })
            .collect();

        if valid.is_empty() && original_count > 0 {
            return Err(FlightSearchError::ProviderError {
                provider: provider.to_string(),
                status: None,
                message: format!("all {} offers failed validation", original_count),
            });
        }

        if let Some(first) = valid.first() {
            if let Some(other) = valid.iter().find(|o| o.currency != first.currency) {
                return Err(FlightSearchError::ProviderError {
                    provider: provider.to_string(),
                    status: None,
                    message: format!(
                        "offers mix currencies ({} and {})",
                        first.currency, other.currency
                    ),
                });
            }
        }

        Ok(valid)
    }

    fn price_issue(&self, offer: &Offer) -> Option<&'static str> {
        if offer.price <= Decimal::ZERO {
            return Some("price must be positive");
        }

        match self.config.max_price {
            Some(max) if offer.price > max => Some("price exceeds sanity ceiling"),
            _ => None,
        }
    }
}
