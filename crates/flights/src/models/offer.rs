use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{Currency, ProviderId};

/// A single bookable fare, normalized from a provider payload.
///
/// Optional fields stay `None` when the provider did not say; a missing
/// stop count is unknown, not zero.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Offer {
    /// Fare amount (always positive once validated)
    pub price: Decimal,

    /// Fare currency (ISO 4217)
    pub currency: Currency,

    /// Marketing or validating airline name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,

    /// Number of stops; `None` when the provider omitted it
    pub stops: Option<u32>,

    /// Local departure time of the first segment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_at: Option<NaiveDateTime>,

    /// Total travel time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,

    /// Provider-supplied deep link, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_link: Option<String>,

    /// Provider that produced the offer (AMADEUS, TRAVELPAYOUTS, etc.)
    pub provider_id: ProviderId,
}

impl Offer {
    /// Create an offer with only the required fields set
    pub fn new(price: Decimal, currency: Currency, provider_id: ProviderId) -> Self {
        Self {
            price,
            currency,
            airline: None,
            stops: None,
            departure_at: None,
            duration_minutes: None,
            deep_link: None,
            provider_id,
        }
    }
}
