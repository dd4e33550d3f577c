//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, PersistenceError, ReservationError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Domain or persistence failure from a use case.
    Domain(DomainError),
}

impl ApiError {
    /// Returns the status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Domain(err) => domain_error_status(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg) => msg,
            ApiError::Domain(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }
        metrics::counter!("http_errors_total", "status" => status.as_u16().to_string())
            .increment(1);

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Reservation(reservation_err) => match reservation_err {
            ReservationError::InvalidStateTransition { .. }
            | ReservationError::TableNotAssigned
            | ReservationError::NoSuitableTable { .. } => StatusCode::CONFLICT,
            ReservationError::InvalidTimeSlot { .. }
            | ReservationError::InvalidDuration { .. }
            | ReservationError::InvalidPartySize { .. }
            | ReservationError::InvalidReservationId { .. }
            | ReservationError::MissingTable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        },
        DomainError::ReservationNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Persistence(PersistenceError::Conflict { .. }) => StatusCode::CONFLICT,
        DomainError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Domain(err.into())
    }
}
