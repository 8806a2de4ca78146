//! Provider registry module.
//!
//! This module provides orchestration for fare providers, including:
//! - Provider registration and priority ordering
//! - Sequential fallback with per-call timeouts
//! - Offer batch validation
//! - Per-provider failure records for diagnostics

mod attempts;
#[allow(clippy::module_inception)]
mod registry;
mod validator;

#[cfg(test)]
pub(crate) mod mock;

pub use attempts::{AggregateFailure, FailureKind, ProviderFailure};
pub use registry::{ProviderRegistry, DEFAULT_PROVIDER_TIMEOUT};
pub use validator::{OfferValidator, ValidatorConfig};
