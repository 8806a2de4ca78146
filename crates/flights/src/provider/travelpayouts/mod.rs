//! Travelpayouts cached fare provider implementation.
//!
//! Cached fares come from the fare API's Travelpayouts proxy:
//! - `GET /travelpayouts/prices/{ORIGIN}/{DESTINATION}` with an optional
//!   `date` query parameter
//!
//! Prices are cached from recent user searches, so they can be stale, but
//! the endpoint answers without a date and costs no live-search quota.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::FlightSearchError;
use crate::models::{Offer, SearchQuery};
use crate::provider::normalize::{
    decimal_from_value, parse_departure, parse_duration_minutes, u32_from_value,
};
use crate::provider::transport::{build_client, join_url, network_failure, parse_json, read_body};
use crate::provider::{FareProvider, ProviderSpec};

pub const PROVIDER_ID: &str = "TRAVELPAYOUTS";
const PRICES_PATH: &str = "/travelpayouts/prices";
const SEARCH_DATE_FORMAT: &str = "%Y-%m-%d";
const STOP_KEYS: &[&str] = &["stops", "transfers"];

/// Currency assumed when a flight entry does not name one.
pub const DEFAULT_CURRENCY: &str = "EUR";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /travelpayouts/prices
///
/// Flights stay raw JSON: a single odd field must only blank that field
/// on that flight, never fail the whole response.
#[derive(Debug, Deserialize)]
struct CachedPriceResponse {
    success: bool,
    #[serde(default)]
    flights: Vec<Value>,
    error: Option<String>,
}

// ============================================================================
// TravelpayoutsProvider
// ============================================================================

/// Travelpayouts cached fare provider.
///
/// Fallback provider: works with or without a date.
pub struct TravelpayoutsProvider {
    client: Client,
    base_url: String,
    default_currency: String,
}

impl TravelpayoutsProvider {
    /// Create a provider against the fare API at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.into(),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    fn request_url(&self, query: &SearchQuery) -> String {
        join_url(
            &self.base_url,
            &format!("{}/{}/{}", PRICES_PATH, query.origin, query.destination),
        )
    }

    fn date_param(&self, query: &SearchQuery) -> Option<(&'static str, String)> {
        query
            .date
            .map(|date| ("date", self.spec().format_search_date(date)))
    }

    fn normalize(&self, response: CachedPriceResponse) -> Result<Vec<Offer>, FlightSearchError> {
        if !response.success {
            return Err(FlightSearchError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                status: None,
                message: response
                    .error
                    .unwrap_or_else(|| "search unsuccessful".to_string()),
            });
        }

        if response.flights.is_empty() {
            return Err(FlightSearchError::EmptyResult {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let total = response.flights.len();
        let offers: Vec<Offer> = response
            .flights
            .iter()
            .filter_map(|flight| self.to_offer(flight))
            .collect();

        if offers.is_empty() {
            return Err(FlightSearchError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                status: None,
                message: format!("none of {} flights carried a readable price", total),
            });
        }

        if offers.len() < total {
            warn!(
                "Travelpayouts: dropped {} of {} flights without a readable price",
                total - offers.len(),
                total
            );
        }

        Ok(offers)
    }

    /// Map one cached flight. Flights without a readable price are dropped.
    fn to_offer(&self, flight: &Value) -> Option<Offer> {
        let flight = flight.as_object()?;
        let price = flight.get("price").and_then(decimal_from_value)?;
        let currency = text_field(flight, "currency")
            .unwrap_or_else(|| self.default_currency.clone())
            .to_ascii_uppercase();

        let mut offer = Offer::new(price, Cow::Owned(currency), Cow::Borrowed(PROVIDER_ID));
        offer.airline = text_field(flight, "airline");
        offer.stops = STOP_KEYS
            .iter()
            .filter_map(|key| flight.get(*key))
            .find_map(u32_from_value);
        offer.departure_at = flight
            .get("departure_at")
            .and_then(Value::as_str)
            .and_then(parse_departure);
        offer.duration_minutes = flight.get("duration").and_then(parse_duration_minutes);
        offer.deep_link = text_field(flight, "link");
        Some(offer)
    }
}

/// Trimmed, non-empty string field.
fn text_field(flight: &Map<String, Value>, key: &str) -> Option<String> {
    flight
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl FareProvider for TravelpayoutsProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn spec(&self) -> ProviderSpec {
        ProviderSpec {
            search_date_format: SEARCH_DATE_FORMAT,
            requires_date: false,
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Offer>, FlightSearchError> {
        let url = self.request_url(query);
        let mut request = self.client.get(&url);

        if let Some(param) = self.date_param(query) {
            request = request.query(&[param]);
        }

        debug!("Travelpayouts request: {}", url);

        let response = request
            .send()
            .await
            .map_err(|e| network_failure(PROVIDER_ID, e))?;

        let body = read_body(PROVIDER_ID, response).await?;
        let parsed: CachedPriceResponse = parse_json(PROVIDER_ID, &body)?;
        let offers = self.normalize(parsed)?;

        debug!("Travelpayouts returned {} offers", offers.len());
        Ok(offers)
    }
}

// ============================================================================
// Tests
// ============================================================================
