//! Static provider configuration.
//!
//! This module defines what a fare provider needs from a query before it
//! can be called, and how it wants dates rendered in its own search API.

use chrono::NaiveDate;

/// Describes how a fare provider must be called.
///
/// Created once per provider and never changed afterwards. The date format
/// here is the provider's search-API format, unrelated to booking links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderSpec {
    /// chrono format string for dates sent to the provider's search API.
    pub search_date_format: &'static str,

    /// Whether the provider can only search a specific departure date.
    /// The registry skips such providers for date-less queries.
    pub requires_date: bool,
}

impl ProviderSpec {
    /// Render a date the way this provider's search API expects it.
    pub fn format_search_date(&self, date: NaiveDate) -> String {
        date.format(self.search_date_format).to_string()
    }
}

impl Default for ProviderSpec {
    fn default() -> Self {
        Self {
            search_date_format: "%Y-%m-%d",
            requires_date: false,
        }
    }
}
