use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use farescout_flights::{AggregateResponse, BookingPartner, SearchOutcome, SearchRequest};
use serde::Deserialize;

/// Query string shared by the search and links endpoints.
///
/// Every field is optional at this layer so that a missing code surfaces as
/// the facade's `MalformedQuery` (a JSON 400) rather than an extractor error.
#[derive(Debug, Default, Deserialize)]
struct FlightParams {
    #[serde(default)]
    origin: String,
    #[serde(default)]
    destination: String,
    date: Option<String>,
}

impl FlightParams {
    /// Codes are trimmed and uppercased; a blank date is dropped.
    fn into_request(self) -> SearchRequest {
        SearchRequest::new(
            self.origin.trim().to_ascii_uppercase(),
            self.destination.trim().to_ascii_uppercase(),
            self.date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        )
    }
}

async fn search_flights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FlightParams>,
) -> ApiResult<(StatusCode, Json<AggregateResponse>)> {
    let request = params.into_request();
    let response = state.aggregator.aggregate(&request).await?;

    let status = match &response.outcome {
        SearchOutcome::Offers(_) | SearchOutcome::NoOffers { .. } => StatusCode::OK,
        SearchOutcome::Failed(failure) => {
            tracing::warn!(
                "Search {} -> {} failed: {}",
                request.origin,
                request.destination,
                failure.summary()
            );
            StatusCode::BAD_GATEWAY
        }
    };

    Ok((status, Json(response)))
}

async fn booking_links(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FlightParams>,
) -> ApiResult<Json<BTreeMap<BookingPartner, String>>> {
    let links = state.aggregator.booking_links(&params.into_request())?;
    Ok(Json(links))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/flights/search", get(search_flights))
        .route("/flights/links", get(booking_links))
}
