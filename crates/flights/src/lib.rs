//! Farescout Flights Crate
//!
//! This crate provides the flight offer aggregator behind the Farescout
//! search service.
//!
//! # Overview
//!
//! The flights crate supports:
//! - Multiple fare providers: Amadeus live fares, Travelpayouts cached fares
//! - Sequential provider fallback (first provider with offers wins)
//! - Normalization of divergent provider payloads into one offer schema
//! - Deterministic booking deep links for partner sites
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | FlightAggregator |  (facade: validation, outcome, links)
//! +------------------+
//!          |                         \
//!          v                          v
//! +------------------+     +------------------+
//! | ProviderRegistry |     |   LinkEncoder    |  (pure, per-partner formats)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  FareProvider    |  (Amadeus, Travelpayouts, ...)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |     Offer        |  (normalized fare)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`SearchQuery`] - Validated origin, destination and optional date
//! - [`Offer`] - A normalized fare from one provider
//! - [`SearchResult`] - The offers of the provider that answered, with the lowest price
//! - [`AggregateResponse`] - Search outcome plus booking links
//!
//! # Type Aliases
//!
//! - [`ProviderId`] - Provider identifier (e.g., "AMADEUS", "TRAVELPAYOUTS")
//! - [`Currency`] - Currency code (ISO 4217)

pub mod aggregator;
pub mod errors;
pub mod links;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{Currency, IataCode, Offer, ProviderId, SearchQuery, SearchResult};

// Re-export facade types
pub use aggregator::{
    AggregateResponse, AggregatorConfig, FlightAggregator, SearchOutcome, SearchRequest,
    DEFAULT_API_BASE_URL,
};

// Re-export link types
pub use links::{BookingPartner, LinkConfig, LinkEncoder};

// Re-export provider types
pub use provider::{AmadeusProvider, FareProvider, ProviderSpec, TravelpayoutsProvider};

// Re-export registry types
pub use registry::{
    AggregateFailure, FailureKind, OfferValidator, ProviderFailure, ProviderRegistry,
    ValidatorConfig,
};

// Re-export error types
pub use errors::{FallbackClass, FlightSearchError};
