//! Live fare payload field lookup.
//!
//! The live fare endpoint passes through fare objects whose field names
//! vary with the upstream source. Each lookup walks a fixed chain of field
//! names in precedence order and takes the first non-null match.

use std::borrow::Cow;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::PROVIDER_ID;
use crate::errors::FlightSearchError;
use crate::models::Offer;
use crate::provider::normalize::{
    decimal_from_value, parse_departure, parse_duration_minutes, u32_from_value,
};
use crate::provider::transport::upstream_message;

const LIST_KEYS: &[&str] = &["data", "flights", "offers", "results"];
const PRICE_KEYS: &[&str] = &["price", "total_price"];
const PRICE_TOTAL_KEYS: &[&str] = &["total", "grandTotal", "amount"];
const AIRLINE_KEYS: &[&str] = &["airline_name", "airline", "validating_airline"];
const STOP_KEYS: &[&str] = &["stops", "transfers"];
const DEPARTURE_KEYS: &[&str] = &["departure_at", "departure_time"];
const LINK_KEYS: &[&str] = &["link", "deep_link", "booking_link"];

/// Fare list plus the response-level currency, if the envelope had one.
#[derive(Debug)]
pub(super) struct FarePage {
    pub fares: Vec<Value>,
    pub currency: Option<String>,
}

/// Unwrap the fare list from either a bare array or a wrapping object.
pub(super) fn extract_fares(body: Value) -> Result<FarePage, FlightSearchError> {
    let mut envelope = match body {
        Value::Array(fares) => {
            return Ok(FarePage {
                fares,
                currency: None,
            })
        }
        Value::Object(map) => map,
        other => return Err(shape_error(format!("expected a fare list, got {}", kind_of(&other)))),
    };

    if envelope.get("success").and_then(Value::as_bool) == Some(false) {
        let body = Value::Object(envelope).to_string();
        return Err(FlightSearchError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            status: None,
            message: upstream_message(&body).unwrap_or_else(|| "search unsuccessful".to_string()),
        });
    }

    let currency = envelope
        .get("currency")
        .and_then(Value::as_str)
        .map(normalize_currency);

    for key in LIST_KEYS {
        if let Some(Value::Array(fares)) = envelope.remove(*key) {
            return Ok(FarePage { fares, currency });
        }
    }

    Err(shape_error("no fare list in response".to_string()))
}

/// Map one raw fare into an offer. Fares without a readable price are dropped.
pub(super) fn normalize_fare(fare: &Value, fallback_currency: &str) -> Option<Offer> {
    let fare = fare.as_object()?;
    let (price, price_currency) = price(fare)?;

    let currency = price_currency
        .or_else(|| fare.get("currency").and_then(Value::as_str).map(normalize_currency))
        .unwrap_or_else(|| normalize_currency(fallback_currency));

    let mut offer = Offer::new(price, Cow::Owned(currency), Cow::Borrowed(PROVIDER_ID));
    offer.airline = airline_name(fare);
    offer.stops = stop_count(fare);
    offer.departure_at = departure_at(fare);
    offer.duration_minutes = duration(fare);
    offer.deep_link = first_present(fare, LINK_KEYS)
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(offer)
}

fn price(fare: &Map<String, Value>) -> Option<(Decimal, Option<String>)> {
    let raw = first_present(fare, PRICE_KEYS)?;

    match raw {
        Value::Object(nested) => {
            let amount = first_present(nested, PRICE_TOTAL_KEYS).and_then(decimal_from_value)?;
            let currency = nested
                .get("currency")
                .and_then(Value::as_str)
                .map(normalize_currency);
            Some((amount, currency))
        }
        other => decimal_from_value(other).map(|amount| (amount, None)),
    }
}

/// `airline_name` -> `airline` -> `validating_airline`.
fn airline_name(fare: &Map<String, Value>) -> Option<String> {
    AIRLINE_KEYS
        .iter()
        .filter_map(|key| fare.get(*key))
        .find_map(airline_from_value)
}

fn airline_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(airline_from_value),
        Value::Object(map) => map.get("name").and_then(airline_from_value),
        _ => None,
    }
}

/// `stops` -> `transfers` -> the first itinerary's own count or segment count.
fn stop_count(fare: &Map<String, Value>) -> Option<u32> {
    if let Some(stops) = STOP_KEYS
        .iter()
        .filter_map(|key| fare.get(*key))
        .find_map(u32_from_value)
    {
        return Some(stops);
    }

    let itinerary = first_itinerary(fare)?;
    if let Some(stops) = first_present(itinerary, &["stops", "number_of_stops"]).and_then(u32_from_value)
    {
        return Some(stops);
    }

    let segments = itinerary.get("segments")?.as_array()?;
    (segments.len() as u32).checked_sub(1)
}

fn departure_at(fare: &Map<String, Value>) -> Option<NaiveDateTime> {
    if let Some(departure) = DEPARTURE_KEYS
        .iter()
        .filter_map(|key| fare.get(*key))
        .filter_map(Value::as_str)
        .find_map(parse_departure)
    {
        return Some(departure);
    }

    first_itinerary(fare)?
        .get("segments")?
        .as_array()?
        .first()?
        .get("departure")?
        .get("at")?
        .as_str()
        .and_then(parse_departure)
}

fn duration(fare: &Map<String, Value>) -> Option<u32> {
    fare.get("duration")
        .and_then(parse_duration_minutes)
        .or_else(|| {
            first_itinerary(fare)?
                .get("duration")
                .and_then(parse_duration_minutes)
        })
}

fn first_itinerary(fare: &Map<String, Value>) -> Option<&Map<String, Value>> {
    match fare.get("itineraries") {
        Some(Value::Array(items)) => items.first()?.as_object(),
        _ => fare.get("itinerary")?.as_object(),
    }
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
}

fn normalize_currency(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn shape_error(message: String) -> FlightSearchError {
    FlightSearchError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        status: None,
        message,
    }
}
