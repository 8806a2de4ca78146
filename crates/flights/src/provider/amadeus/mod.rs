//! Amadeus live fare provider implementation.
//!
//! Live fares are fetched through the fare API's Amadeus proxy:
//! - `POST /amadeus/search` with origin, destination, departure date,
//!   passenger count and a result cap
//!
//! The proxy passes Amadeus fare objects through with little reshaping, so
//! field names vary between responses; see [`fares`] for the lookup rules.
//! Live search is date-specific and cannot run without a departure date.

mod fares;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::FlightSearchError;
use crate::models::{Offer, SearchQuery};
use crate::provider::transport::{build_client, join_url, network_failure, parse_json, read_body};
use crate::provider::{FareProvider, ProviderSpec};

pub const PROVIDER_ID: &str = "AMADEUS";
const SEARCH_PATH: &str = "/amadeus/search";
const SEARCH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default number of adult passengers priced.
pub const DEFAULT_ADULTS: u8 = 1;

/// Default cap on fares returned per search.
pub const DEFAULT_MAX_RESULTS: u8 = 10;

/// Currency assumed when neither the fare nor the envelope names one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Request body for `POST /amadeus/search`
#[derive(Debug, Serialize, PartialEq)]
struct LiveFareRequest<'a> {
    origin: &'a str,
    destination: &'a str,
    departure_date: String,
    adults: u8,
    max_results: u8,
}

/// Amadeus live fare provider.
///
/// Highest-priority provider: quotes are live and bookable, but every
/// call costs quota, so it only runs when a date is known.
pub struct AmadeusProvider {
    client: Client,
    base_url: String,
    adults: u8,
    max_results: u8,
    default_currency: String,
}

impl AmadeusProvider {
    /// Create a provider against the fare API at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.into(),
            adults: DEFAULT_ADULTS,
            max_results: DEFAULT_MAX_RESULTS,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_max_results(mut self, max_results: u8) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    fn build_request<'q>(
        &self,
        query: &'q SearchQuery,
    ) -> Result<LiveFareRequest<'q>, FlightSearchError> {
        let date = query.date.ok_or_else(|| {
            FlightSearchError::malformed("live fare search requires a departure date")
        })?;

        Ok(LiveFareRequest {
            origin: query.origin.as_str(),
            destination: query.destination.as_str(),
            departure_date: self.spec().format_search_date(date),
            adults: self.adults,
            max_results: self.max_results,
        })
    }

    /// Map a decoded response body into offers.
    fn normalize(&self, body: Value) -> Result<Vec<Offer>, FlightSearchError> {
        let page = fares::extract_fares(body)?;

        if page.fares.is_empty() {
            return Err(FlightSearchError::EmptyResult {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let fallback_currency = page.currency.as_deref().unwrap_or(&self.default_currency);
        let total = page.fares.len();
        let offers: Vec<Offer> = page
            .fares
            .iter()
            .filter_map(|fare| fares::normalize_fare(fare, fallback_currency))
            .collect();

        if offers.is_empty() {
            return Err(FlightSearchError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                status: None,
                message: format!("none of {} fares carried a readable price", total),
            });
        }

        if offers.len() < total {
            warn!(
                "Amadeus: dropped {} of {} fares without a readable price",
                total - offers.len(),
                total
            );
        }

        Ok(offers)
    }
}

#[async_trait]
impl FareProvider for AmadeusProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn spec(&self) -> ProviderSpec {
        ProviderSpec {
            search_date_format: SEARCH_DATE_FORMAT,
            requires_date: true,
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Offer>, FlightSearchError> {
        let request = self.build_request(query)?;
        let url = join_url(&self.base_url, SEARCH_PATH);

        debug!(
            "Amadeus request: {} -> {} on {}",
            request.origin, request.destination, request.departure_date
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| network_failure(PROVIDER_ID, e))?;

        let body = read_body(PROVIDER_ID, response).await?;
        let value: Value = parse_json(PROVIDER_ID, &body)?;
        let offers = self.normalize(value)?;

        debug!("Amadeus returned {} offers", offers.len());
        Ok(offers)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::stub_server::StubServer;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn provider() -> AmadeusProvider {
        AmadeusProvider::new("http://localhost:8000", Duration::from_secs(5))
    }

    #[test]
    fn test_provider_id() {
        assert_eq!(provider().id(), "AMADEUS");
    }

    #[test]
    fn test_provider_priority() {
        assert_eq!(provider().priority(), 1);
    }

    #[test]
    fn test_provider_spec() {
        let spec = provider().spec();
        assert!(spec.requires_date);
        assert_eq!(spec.search_date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_build_request() {
        let query = SearchQuery::parse("FRA", "KUL", Some("2025-03-05")).unwrap();
        let request = provider().build_request(&query).unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "origin": "FRA",
                "destination": "KUL",
                "departure_date": "2025-03-05",
                "adults": 1,
                "max_results": 10
            })
        );
    }

    #[test]
    fn test_build_request_honours_max_results() {
        let query = SearchQuery::parse("FRA", "KUL", Some("2025-03-05")).unwrap();
        let provider = provider().with_max_results(25);
        assert_eq!(provider.build_request(&query).unwrap().max_results, 25);
    }

    #[test]
    fn test_build_request_without_date_fails_fast() {
        let query = SearchQuery::parse("FRA", "KUL", None).unwrap();
        let err = provider().build_request(&query).unwrap_err();
        assert!(matches!(err, FlightSearchError::MalformedQuery(_)));
    }

    #[tokio::test]
    async fn test_search_without_date_makes_no_request() {
        // Port 9 would refuse the connection; a MalformedQuery proves we never got that far.
        let provider = AmadeusProvider::new("http://127.0.0.1:9", Duration::from_secs(1));
        let query = SearchQuery::parse("FRA", "KUL", None).unwrap();
        let err = provider.search(&query).await.unwrap_err();
        assert!(matches!(err, FlightSearchError::MalformedQuery(_)));
    }

    #[test]
    fn test_normalize_empty_list_is_empty_result() {
        let err = provider().normalize(json!({"data": []})).unwrap_err();
        assert!(matches!(err, FlightSearchError::EmptyResult { .. }));
    }

    #[test]
    fn test_normalize_keeps_provider_order() {
        let offers = provider()
            .normalize(json!([
                {"price": 240, "airline": "LH"},
                {"price": 310, "airline": "QR"},
                {"price": 199, "airline": "MH"}
            ]))
            .unwrap();

        let prices: Vec<_> = offers.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![dec!(240), dec!(310), dec!(199)]);
        assert!(offers.iter().all(|o| o.currency == "EUR"));
    }

    #[test]
    fn test_normalize_uses_envelope_currency() {
        let offers = provider()
            .normalize(json!({"currency": "USD", "flights": [{"price": 240}]}))
            .unwrap();
        assert_eq!(offers[0].currency, "USD");
    }

    #[test]
    fn test_normalize_all_unpriced_is_provider_error() {
        let err = provider()
            .normalize(json!([{"airline": "LH"}, {"airline": "QR"}]))
            .unwrap_err();
        assert!(matches!(err, FlightSearchError::ProviderError { .. }));
    }

    #[test]
    fn test_custom_default_currency() {
        let offers = provider()
            .with_default_currency("CHF")
            .normalize(json!([{"price": 240}]))
            .unwrap();
        assert_eq!(offers[0].currency, "CHF");
    }

    #[tokio::test]
    async fn test_search_posts_request_body() {
        let server = StubServer::respond(
            "200 OK",
            r#"{"data": [{"price": {"total": "240.00", "currency": "EUR"}, "airline": "LH"}]}"#,
        )
        .await;
        let provider = AmadeusProvider::new(&server.base_url, Duration::from_secs(5));
        let query = SearchQuery::parse("FRA", "KUL", Some("2025-03-05")).unwrap();

        let offers = provider.search(&query).await.unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price, dec!(240));
        assert_eq!(offers[0].airline.as_deref(), Some("LH"));

        let request = server.received().await;
        assert!(
            request.starts_with("POST /amadeus/search HTTP/1.1"),
            "unexpected request: {}",
            request
        );
        let body = request.split("\r\n\r\n").nth(1).unwrap_or_default();
        assert_eq!(
            serde_json::from_str::<Value>(body).unwrap(),
            json!({
                "origin": "FRA",
                "destination": "KUL",
                "departure_date": "2025-03-05",
                "adults": 1,
                "max_results": 10
            })
        );
    }

    #[tokio::test]
    async fn test_search_maps_error_status() {
        let server = StubServer::respond(
            "503 Service Unavailable",
            r#"{"detail": "Amadeus quota exhausted"}"#,
        )
        .await;
        let provider = AmadeusProvider::new(&server.base_url, Duration::from_secs(5));
        let query = SearchQuery::parse("FRA", "KUL", Some("2025-03-05")).unwrap();

        match provider.search(&query).await.unwrap_err() {
            FlightSearchError::ProviderError {
                status, message, ..
            } => {
                assert_eq!(status, Some(503));
                assert_eq!(message, "Amadeus quota exhausted");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        server.received().await;
    }
}
