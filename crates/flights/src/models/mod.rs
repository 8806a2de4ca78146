//! Flight search models
//!
//! This module contains the core data types for flight searches:
//! - `types` - Type aliases for common identifiers (ProviderId, Currency)
//! - `query` - Validated search input (IataCode, SearchQuery)
//! - `offer` - A normalized fare (Offer)
//! - `result` - The per-request search result (SearchResult)

mod offer;
mod query;
mod result;
mod types;

pub use offer::Offer;
pub use query::{parse_query_date, IataCode, SearchQuery, QUERY_DATE_FORMAT};
pub use result::{lowest_price, SearchResult};
pub use types::{Currency, ProviderId};
