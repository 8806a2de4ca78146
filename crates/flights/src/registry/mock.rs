//! Scripted provider for registry and facade tests.

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::FlightSearchError;
use crate::models::{Offer, SearchQuery};
use crate::provider::{FareProvider, ProviderSpec};

#[derive(Clone, Debug)]
pub(crate) enum MockBehavior {
    /// Succeed with these EUR prices.
    Offers(Vec<Decimal>),
    /// Succeed with offers in the given (price, currency) pairs.
    OffersIn(Vec<(Decimal, &'static str)>),
    Empty,
    NetworkFailure,
    ProviderError(u16),
    /// Sleep before succeeding with a single offer.
    Hang(Duration),
}

pub(crate) struct MockProvider {
    id: &'static str,
    priority: u8,
    requires_date: bool,
    behavior: MockBehavior,
    call_count: AtomicUsize,
}

impl MockProvider {
    pub(crate) fn new(id: &'static str, priority: u8, behavior: MockBehavior) -> Self {
        Self {
            id,
            priority,
            requires_date: false,
            behavior,
            call_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn requiring_date(mut self) -> Self {
        self.requires_date = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn offer(&self, price: Decimal, currency: &'static str) -> Offer {
        Offer::new(price, Cow::Borrowed(currency), Cow::Borrowed(self.id))
    }
}

#[async_trait]
impl FareProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn spec(&self) -> ProviderSpec {
        ProviderSpec {
            requires_date: self.requires_date,
            ..ProviderSpec::default()
        }
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<Offer>, FlightSearchError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Offers(prices) => {
                Ok(prices.iter().map(|p| self.offer(*p, "EUR")).collect())
            }
            MockBehavior::OffersIn(priced) => Ok(priced
                .iter()
                .map(|(p, currency)| self.offer(*p, currency))
                .collect()),
            MockBehavior::Empty => Err(FlightSearchError::EmptyResult {
                provider: self.id.to_string(),
            }),
            MockBehavior::NetworkFailure => Err(FlightSearchError::NetworkFailure {
                provider: self.id.to_string(),
                message: "Connection failed".to_string(),
            }),
            MockBehavior::ProviderError(status) => Err(FlightSearchError::ProviderError {
                provider: self.id.to_string(),
                status: Some(*status),
                message: "Mock failure".to_string(),
            }),
            MockBehavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(vec![self.offer(Decimal::ONE_HUNDRED, "EUR")])
            }
        }
    }
}
