use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use farescout_flights::FlightSearchError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Search(#[from] FlightSearchError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Search(e) => match e {
                FlightSearchError::MalformedQuery(reason) => {
                    (StatusCode::BAD_REQUEST, reason.clone())
                }
                FlightSearchError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
                _ => (StatusCode::BAD_GATEWAY, e.to_string()),
            },
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
