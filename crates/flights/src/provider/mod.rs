//! Fare provider abstractions and implementations.
//!
//! This module contains:
//! - The `FareProvider` trait that all providers implement
//! - `ProviderSpec`, the static call requirements of a provider
//! - Concrete provider implementations (Amadeus, Travelpayouts)
//!
//! # Architecture
//!
//! The provider system is designed to be:
//! - **Provider-agnostic**: The registry doesn't know about specific providers
//! - **Extensible**: New providers can be added by implementing `FareProvider`
//! - **Self-normalizing**: Each provider maps its own payload to `Offer`s,
//!   so schema differences never leak into the registry

mod spec;
mod traits;

pub(crate) mod normalize;
pub(crate) mod transport;

#[cfg(test)]
pub(crate) mod stub_server;

pub mod amadeus;
pub mod travelpayouts;

// Re-exports
pub use spec::ProviderSpec;
pub use traits::FareProvider;
pub use amadeus::AmadeusProvider;
pub use travelpayouts::TravelpayoutsProvider;
