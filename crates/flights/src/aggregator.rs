//! Aggregator facade: the single entry point for callers.
//!
//! Validates the request, runs the provider fallback and attaches a booking
//! link for every configured partner. Links are produced even when every
//! provider failed, so a caller can always send the user to a partner's own
//! search page.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::FlightSearchError;
use crate::links::{BookingPartner, LinkConfig, LinkEncoder};
use crate::models::{SearchQuery, SearchResult};
use crate::provider::{amadeus, AmadeusProvider, FareProvider, TravelpayoutsProvider};
use crate::registry::{AggregateFailure, ProviderFailure, ProviderRegistry, DEFAULT_PROVIDER_TIMEOUT};

/// Root of the fare API both providers proxy through.
pub const DEFAULT_API_BASE_URL: &str = "https://api.texttoaction.de";

/// Facade configuration. Passed in at construction; nothing is read from
/// the process environment.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    pub api_base_url: String,
    /// Bound on each single provider call
    pub provider_timeout: Duration,
    /// Provider ids to try first, in this order. Unlisted providers follow
    /// in their default order. Empty keeps the defaults.
    pub provider_order: Vec<String>,
    /// Partners to build booking links for
    pub partners: Vec<BookingPartner>,
    /// Currency assumed when a provider payload names none
    pub default_currency: String,
    /// Cap on live fares requested per search
    pub max_results: u8,
    pub links: LinkConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            provider_order: Vec::new(),
            partners: BookingPartner::ALL.to_vec(),
            default_currency: amadeus::DEFAULT_CURRENCY.to_string(),
            max_results: amadeus::DEFAULT_MAX_RESULTS,
            links: LinkConfig::default(),
        }
    }
}

impl AggregatorConfig {
    /// Registry priorities derived from `provider_order`.
    fn priority_overrides(&self, providers: &[Arc<dyn FareProvider>]) -> HashMap<String, u8> {
        let listed = self.provider_order.len();
        let mut overrides: HashMap<String, u8> = providers
            .iter()
            .map(|p| {
                let after_listed = u8::try_from(listed).unwrap_or(u8::MAX);
                (p.id().to_string(), after_listed.saturating_add(p.priority()))
            })
            .collect();

        for (rank, id) in self.provider_order.iter().enumerate() {
            let id = id.trim().to_ascii_uppercase();
            if let Some(priority) = overrides.get_mut(&id) {
                *priority = u8::try_from(rank).unwrap_or(u8::MAX);
            } else {
                debug!("Ignoring unknown provider '{}' in provider order", id);
            }
        }

        overrides
    }
}

/// Raw search input as it arrives from a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl SearchRequest {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date,
        }
    }

    pub fn to_query(&self) -> Result<SearchQuery, FlightSearchError> {
        SearchQuery::parse(&self.origin, &self.destination, self.date.as_deref())
    }
}

/// What the provider search produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A provider supplied offers
    Offers(SearchResult),

    /// Every provider that answered had zero offers: the route has no fares,
    /// as opposed to the providers being unreachable
    NoOffers { attempts: Vec<ProviderFailure> },

    /// Providers were exhausted and at least one of them failed
    Failed(AggregateFailure),
}

impl SearchOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Offers(_) => "offers",
            Self::NoOffers { .. } => "no_offers",
            Self::Failed(_) => "failed",
        }
    }

    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            Self::Offers(result) => Some(result),
            _ => None,
        }
    }

    fn from_search(search: Result<SearchResult, FlightSearchError>) -> Result<Self, FlightSearchError> {
        match search {
            Ok(result) => Ok(Self::Offers(result)),
            Err(FlightSearchError::AggregateFailure(failure)) if failure.is_no_offers() => {
                Ok(Self::NoOffers {
                    attempts: failure.failures,
                })
            }
            Err(FlightSearchError::AggregateFailure(failure)) => Ok(Self::Failed(failure)),
            Err(other) => Err(other),
        }
    }
}

/// Facade response: the search outcome plus booking links.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateResponse {
    pub query: SearchQuery,
    pub outcome: SearchOutcome,
    pub links: BTreeMap<BookingPartner, String>,
}

/// Flight offer aggregator.
///
/// Stateless across requests; share one instance behind an `Arc`.
pub struct FlightAggregator {
    registry: ProviderRegistry,
    encoder: LinkEncoder,
    partners: Vec<BookingPartner>,
}

impl FlightAggregator {
    /// Build the HTTP providers and registry from `config`.
    pub fn new(config: AggregatorConfig) -> Self {
        let providers: Vec<Arc<dyn FareProvider>> = vec![
            Arc::new(
                AmadeusProvider::new(&config.api_base_url, config.provider_timeout)
                    .with_max_results(config.max_results)
                    .with_default_currency(&config.default_currency),
            ),
            Arc::new(
                TravelpayoutsProvider::new(&config.api_base_url, config.provider_timeout)
                    .with_default_currency(&config.default_currency),
            ),
        ];

        let overrides = config.priority_overrides(&providers);
        let registry = ProviderRegistry::with_priorities(providers, overrides)
            .with_timeout(config.provider_timeout);

        info!(
            "Flight aggregator using {} with providers {:?}",
            config.api_base_url,
            registry.provider_ids()
        );

        Self::from_parts(registry, LinkEncoder::new(config.links), config.partners)
    }

    /// Assemble a facade from prepared parts.
    pub fn from_parts(
        registry: ProviderRegistry,
        encoder: LinkEncoder,
        partners: Vec<BookingPartner>,
    ) -> Self {
        Self {
            registry,
            encoder,
            partners,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn partners(&self) -> &[BookingPartner] {
        &self.partners
    }

    /// Search for offers and build booking links.
    ///
    /// # Errors
    ///
    /// `MalformedQuery` for invalid input, before any provider is called.
    /// Provider failures are not errors here; they come back as
    /// [`SearchOutcome::Failed`] or [`SearchOutcome::NoOffers`] alongside the links.
    pub async fn aggregate(
        &self,
        request: &SearchRequest,
    ) -> Result<AggregateResponse, FlightSearchError> {
        let query = request.to_query()?;
        let links = self.links_for_query(&query);

        debug!(
            "Aggregating {} -> {} ({})",
            query.origin,
            query.destination,
            query
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "any date".to_string())
        );

        let outcome = SearchOutcome::from_search(self.registry.search_with_fallback(&query).await)?;

        info!(
            "Search {} -> {} finished with status {}",
            query.origin,
            query.destination,
            outcome.status()
        );

        Ok(AggregateResponse {
            query,
            outcome,
            links,
        })
    }

    /// Like [`aggregate`](Self::aggregate), but gives up as soon as `cancel`
    /// completes. The in-flight provider call is dropped, no further provider
    /// is tried and nothing partial is returned.
    pub async fn aggregate_until<F>(
        &self,
        request: &SearchRequest,
        cancel: F,
    ) -> Result<AggregateResponse, FlightSearchError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                info!("Search {} -> {} cancelled by caller", request.origin, request.destination);
                Err(FlightSearchError::Cancelled)
            }
            response = self.aggregate(request) => response,
        }
    }

    /// Booking links only. Never calls a provider.
    pub fn booking_links(
        &self,
        request: &SearchRequest,
    ) -> Result<BTreeMap<BookingPartner, String>, FlightSearchError> {
        let query = request.to_query()?;
        Ok(self.links_for_query(&query))
    }

    fn links_for_query(&self, query: &SearchQuery) -> BTreeMap<BookingPartner, String> {
        let date = query.date.unwrap_or_else(today);
        self.encoder
            .links_for(&self.partners, &query.origin, &query.destination, date)
    }
}

/// Link date for queries without one.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::travelpayouts;
    use crate::registry::mock::{MockBehavior, MockProvider};
    use crate::registry::FailureKind;
    use rust_decimal_macros::dec;

    fn facade(providers: &[&Arc<MockProvider>]) -> FlightAggregator {
        let registry = ProviderRegistry::new(
            providers
                .iter()
                .map(|p| Arc::clone(*p) as Arc<dyn FareProvider>)
                .collect(),
        );
        FlightAggregator::from_parts(registry, LinkEncoder::default(), BookingPartner::ALL.to_vec())
    }

    fn request() -> SearchRequest {
        SearchRequest::new("FRA", "KUL", Some("2025-03-05".to_string()))
    }

    #[tokio::test]
    async fn test_malformed_origin_rejected_before_any_provider_call() {
        let primary = Arc::new(MockProvider::new("A", 1, MockBehavior::Offers(vec![dec!(100)])));
        let secondary = Arc::new(MockProvider::new("B", 2, MockBehavior::Offers(vec![dec!(100)])));

        let err = facade(&[&primary, &secondary])
            .aggregate(&SearchRequest::new("FRAN", "KUL", None))
            .await
            .unwrap_err();

        assert!(matches!(err, FlightSearchError::MalformedQuery(_)));
        assert_eq!(primary.calls(), 0);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_offers_outcome_carries_result_and_links() {
        let primary = Arc::new(MockProvider::new(
            "A",
            1,
            MockBehavior::Offers(vec![dec!(240), dec!(310), dec!(199)]),
        ));

        let response = facade(&[&primary]).aggregate(&request()).await.unwrap();

        assert_eq!(response.outcome.status(), "offers");
        let result = response.outcome.result().unwrap();
        assert_eq!(result.lowest_price, Some(dec!(199)));
        assert_eq!(
            response.links[&BookingPartner::Aviasales],
            "https://www.aviasales.com/search/FRA0503KUL1?marker=485199"
        );
        assert_eq!(
            response.links[&BookingPartner::Skyscanner],
            "https://www.skyscanner.de/transport/fluge/fra/kul/250305/?adultsv2=1&cabinclass=economy&rtn=0"
        );
    }

    #[tokio::test]
    async fn test_links_survive_total_failure() {
        let primary = Arc::new(MockProvider::new("A", 1, MockBehavior::NetworkFailure));
        let secondary = Arc::new(MockProvider::new("B", 2, MockBehavior::ProviderError(503)));

        let response = facade(&[&primary, &secondary]).aggregate(&request()).await.unwrap();

        match &response.outcome {
            SearchOutcome::Failed(failure) => {
                assert_eq!(
                    failure.kinds(),
                    vec![FailureKind::NetworkFailure, FailureKind::ProviderError]
                );
            }
            other => panic!("expected failed outcome, got {:?}", other),
        }
        assert_eq!(response.links.len(), 2);
    }

    #[tokio::test]
    async fn test_all_empty_is_no_offers() {
        let primary = Arc::new(MockProvider::new("A", 1, MockBehavior::Empty));
        let secondary = Arc::new(MockProvider::new("B", 2, MockBehavior::Empty));

        let response = facade(&[&primary, &secondary]).aggregate(&request()).await.unwrap();

        assert_eq!(response.outcome.status(), "no_offers");
        match response.outcome {
            SearchOutcome::NoOffers { attempts } => assert_eq!(attempts.len(), 2),
            other => panic!("expected no_offers outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_search_without_partial_result() {
        let slow = Arc::new(MockProvider::new(
            "SLOW",
            1,
            MockBehavior::Hang(Duration::from_secs(30)),
        ));
        let backup = Arc::new(MockProvider::new("BACKUP", 2, MockBehavior::Offers(vec![dec!(1)])));

        let err = facade(&[&slow, &backup])
            .aggregate_until(&request(), tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap_err();

        assert_eq!(err, FlightSearchError::Cancelled);
        assert_eq!(slow.calls(), 1);
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test]
    async fn test_uncancelled_search_completes() {
        let primary = Arc::new(MockProvider::new("A", 1, MockBehavior::Offers(vec![dec!(99)])));

        let response = facade(&[&primary])
            .aggregate_until(&request(), std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(response.outcome.status(), "offers");
    }

    #[test]
    fn test_booking_links_default_to_today_without_date() {
        let links = facade(&[])
            .booking_links(&SearchRequest::new("FRA", "KUL", None))
            .unwrap();

        let expected = format!("/search/FRA{}KUL1?", today().format("%d%m"));
        assert!(links[&BookingPartner::Aviasales].contains(&expected));
    }

    #[test]
    fn test_booking_links_respect_partner_selection() {
        let facade = FlightAggregator::from_parts(
            ProviderRegistry::new(vec![]),
            LinkEncoder::default(),
            vec![BookingPartner::Skyscanner],
        );

        let links = facade.booking_links(&request()).unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.contains_key(&BookingPartner::Skyscanner));
    }

    #[tokio::test]
    async fn test_response_serializes_status_tag() {
        let primary = Arc::new(MockProvider::new("A", 1, MockBehavior::NetworkFailure));
        let response = facade(&[&primary]).aggregate(&request()).await.unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["failures"][0]["kind"], "NETWORK_FAILURE");
        assert_eq!(json["query"]["origin"], "FRA");
        assert!(json["links"]["aviasales"].is_string());
    }

    #[test]
    fn test_default_provider_order() {
        let facade = FlightAggregator::new(AggregatorConfig::default());
        assert_eq!(
            facade.registry().provider_ids(),
            vec![amadeus::PROVIDER_ID, travelpayouts::PROVIDER_ID]
        );
        assert_eq!(facade.partners(), &BookingPartner::ALL);
    }

    #[test]
    fn test_configured_provider_order() {
        let facade = FlightAggregator::new(AggregatorConfig {
            provider_order: vec!["travelpayouts".to_string(), "unknown".to_string()],
            ..AggregatorConfig::default()
        });
        assert_eq!(
            facade.registry().provider_ids(),
            vec![travelpayouts::PROVIDER_ID, amadeus::PROVIDER_ID]
        );
    }
}
