use rust_decimal::Decimal;
use serde::Serialize;

use super::offer::Offer;
use super::query::SearchQuery;
use super::types::{Currency, ProviderId};
use crate::registry::ProviderFailure;

/// The offers one provider supplied for one query.
///
/// Built once per request and never mutated afterwards. Offers keep the
/// provider's original order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub query: SearchQuery,

    /// Provider whose offers these are
    pub provider_used: ProviderId,

    pub offers: Vec<Offer>,

    /// Minimum offer price, `None` when `offers` is empty
    pub lowest_price: Option<Decimal>,

    /// Currency shared by every offer
    pub currency: Option<Currency>,

    /// Providers tried and failed before `provider_used`, in priority order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_attempts: Vec<ProviderFailure>,
}

impl SearchResult {
    /// Build a result and compute its lowest price.
    ///
    /// All offers must share one currency; the registry's validator rejects
    /// mixed batches before they get here. No conversion happens.
    pub fn new(
        query: SearchQuery,
        provider_used: ProviderId,
        offers: Vec<Offer>,
        failed_attempts: Vec<ProviderFailure>,
    ) -> Self {
        debug_assert!(
            offers.windows(2).all(|w| w[0].currency == w[1].currency),
            "offers must share a single currency"
        );

        let lowest_price = lowest_price(&offers);
        let currency = offers.first().map(|o| o.currency.clone());

        Self {
            query,
            provider_used,
            offers,
            lowest_price,
            currency,
            failed_attempts,
        }
    }

    /// Offer carrying the lowest price (the first one on ties).
    pub fn cheapest(&self) -> Option<&Offer> {
        self.offers
            .iter()
            .reduce(|best, o| if o.price < best.price { o } else { best })
    }
}

/// Numeric minimum over offer prices.
pub fn lowest_price(offers: &[Offer]) -> Option<Decimal> {
    offers.iter().map(|o| o.price).min()
}
