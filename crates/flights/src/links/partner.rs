use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FlightSearchError;

/// Booking partners the link encoder can target.
///
/// Each variant owns one URL scheme; adding a partner means adding a variant
/// and its formatting routine in [`LinkEncoder`](super::LinkEncoder).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingPartner {
    Aviasales,
    Skyscanner,
}

impl BookingPartner {
    /// Every supported partner, in display order.
    pub const ALL: [BookingPartner; 2] = [BookingPartner::Aviasales, BookingPartner::Skyscanner];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Aviasales => "aviasales",
            Self::Skyscanner => "skyscanner",
        }
    }
}

impl fmt::Display for BookingPartner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BookingPartner {
    type Err = FlightSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| FlightSearchError::malformed(format!("unknown booking partner '{}'", s)))
    }
}
