//! Booking deep-link encoder.
//!
//! Maps (origin, destination, date) to a partner's search page URL. Each
//! partner embeds the date in its own format, and the partner site shows the
//! wrong flights (or none) if a single digit is off, so every format here is
//! fixed and covered by exact-string tests:
//!
//! | Partner      | Codes     | Date     | Example path                      |
//! |--------------|-----------|----------|-----------------------------------|
//! | `Aviasales`  | uppercase | `DDMM`   | `/search/FRA0503KUL1`             |
//! | `Skyscanner` | lowercase | `YYMMDD` | `/transport/fluge/fra/kul/250305/`|
//!
//! Encoding never touches the network and never depends on a search result.

mod partner;

pub use partner::BookingPartner;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::errors::FlightSearchError;
use crate::models::{parse_query_date, IataCode};

pub const DEFAULT_AVIASALES_BASE_URL: &str = "https://www.aviasales.com";
pub const DEFAULT_AVIASALES_MARKER: &str = "485199";
pub const DEFAULT_SKYSCANNER_BASE_URL: &str = "https://www.skyscanner.de";

/// Partner hosts and affiliate parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    pub aviasales_base_url: String,
    /// Affiliate marker appended to every Aviasales link
    pub aviasales_marker: String,
    pub skyscanner_base_url: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            aviasales_base_url: DEFAULT_AVIASALES_BASE_URL.to_string(),
            aviasales_marker: DEFAULT_AVIASALES_MARKER.to_string(),
            skyscanner_base_url: DEFAULT_SKYSCANNER_BASE_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LinkEncoder {
    config: LinkConfig,
}

impl LinkEncoder {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Encode a link from already-validated inputs. Pure and total.
    pub fn encode(
        &self,
        partner: BookingPartner,
        origin: &IataCode,
        destination: &IataCode,
        date: NaiveDate,
    ) -> String {
        match partner {
            BookingPartner::Aviasales => self.aviasales(origin, destination, date),
            BookingPartner::Skyscanner => self.skyscanner(origin, destination, date),
        }
    }

    /// Encode a link from raw caller input.
    ///
    /// # Errors
    ///
    /// `MalformedQuery` if either code is not `[A-Z]{3}` or the date is not
    /// `YYYY-MM-DD`.
    pub fn booking_link(
        &self,
        partner: BookingPartner,
        origin: &str,
        destination: &str,
        date: &str,
    ) -> Result<String, FlightSearchError> {
        let origin = IataCode::parse(origin)?;
        let destination = IataCode::parse(destination)?;
        let date = parse_query_date(date)?;
        Ok(self.encode(partner, &origin, &destination, date))
    }

    /// One link per requested partner.
    pub fn links_for(
        &self,
        partners: &[BookingPartner],
        origin: &IataCode,
        destination: &IataCode,
        date: NaiveDate,
    ) -> BTreeMap<BookingPartner, String> {
        partners
            .iter()
            .map(|&p| (p, self.encode(p, origin, destination, date)))
            .collect()
    }

    fn aviasales(&self, origin: &IataCode, destination: &IataCode, date: NaiveDate) -> String {
        format!(
            "{}/search/{}{}{}1?marker={}",
            self.config.aviasales_base_url.trim_end_matches('/'),
            origin,
            date.format("%d%m"),
            destination,
            self.config.aviasales_marker
        )
    }

    fn skyscanner(&self, origin: &IataCode, destination: &IataCode, date: NaiveDate) -> String {
        format!(
            "{}/transport/fluge/{}/{}/{}/?adultsv2=1&cabinclass=economy&rtn=0",
            self.config.skyscanner_base_url.trim_end_matches('/'),
            origin.to_lowercase(),
            destination.to_lowercase(),
            date.format("%y%m%d")
        )
    }
}
