use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::FlightSearchError;

/// ISO calendar date format used for query input (`YYYY-MM-DD`).
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// A 3-letter IATA airport or city code, always uppercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IataCode(String);

impl IataCode {
    /// Parse a code, accepting exactly three ASCII uppercase letters.
    pub fn parse(code: &str) -> Result<Self, FlightSearchError> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(FlightSearchError::malformed(format!(
                "'{}' is not a 3-letter uppercase IATA code",
                code
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form, for partners whose URLs expect it.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for IataCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_query_date(date: &str) -> Result<NaiveDate, FlightSearchError> {
    NaiveDate::parse_from_str(date, QUERY_DATE_FORMAT).map_err(|_| {
        FlightSearchError::malformed(format!("'{}' is not a YYYY-MM-DD date", date))
    })
}

/// A validated flight search query.
///
/// Construction guarantees both codes are well-formed and differ, so
/// everything downstream of the facade can rely on it without re-checking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub origin: IataCode,
    pub destination: IataCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl SearchQuery {
    pub fn new(
        origin: IataCode,
        destination: IataCode,
        date: Option<NaiveDate>,
    ) -> Result<Self, FlightSearchError> {
        if origin == destination {
            return Err(FlightSearchError::malformed(format!(
                "origin and destination are both {}",
                origin
            )));
        }

        Ok(Self {
            origin,
            destination,
            date,
        })
    }

    /// Build a query from raw caller input. An empty date counts as absent.
    pub fn parse(
        origin: &str,
        destination: &str,
        date: Option<&str>,
    ) -> Result<Self, FlightSearchError> {
        let origin = IataCode::parse(origin)
            .map_err(|e| FlightSearchError::malformed(format!("origin: {}", inner(&e))))?;
        let destination = IataCode::parse(destination)
            .map_err(|e| FlightSearchError::malformed(format!("destination: {}", inner(&e))))?;
        let date = match date.map(str::trim) {
            Some(d) if !d.is_empty() => Some(parse_query_date(d)?),
            _ => None,
        };

        Self::new(origin, destination, date)
    }
}

fn inner(error: &FlightSearchError) -> String {
    match error {
        FlightSearchError::MalformedQuery(message) => message.clone(),
        other => other.to_string(),
    }
}
