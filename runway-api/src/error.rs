use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use runway_booking::{BoardingPass, BookingError};
use runway_core::{CoreError, StoreError, UniqueKey};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    AuthorizationError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("Passenger is already checked in")]
    AlreadyCheckedIn(BoardingPass),
    #[error("{0}")]
    InternalServerError(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::AlreadyCheckedIn(pass) => {
                let body = Json(json!({
                    "error": "You have already checked in.",
                    "boarding_pass": pass,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::ValidationError(msg) => AppError::ValidationError(msg),
            BookingError::NotFound(what) => AppError::NotFoundError(format!("{} not found", what)),
            e @ BookingError::FlightDeparted(_) => AppError::ValidationError(e.to_string()),
            e @ BookingError::SeatConflict { .. } => AppError::ConflictError(e.to_string()),
            e @ BookingError::IdentityMismatch => AppError::AuthenticationError(e.to_string()),
            BookingError::AlreadyCheckedIn(pass) => AppError::AlreadyCheckedIn(pass),
            e @ BookingError::ReservationCancelled(_) => AppError::ConflictError(e.to_string()),
            e @ (BookingError::IdentifierExhausted { .. } | BookingError::StorageError(_)) => {
                AppError::InternalServerError(e.to_string())
            }
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(UniqueKey::FlightNumber) => {
                AppError::ConflictError("A flight with this number already exists.".to_string())
            }
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_error_status_mapping() {
        let cases = vec![
            (BookingError::ValidationError("bad".into()), StatusCode::BAD_REQUEST),
            (BookingError::NotFound("Flight x".into()), StatusCode::NOT_FOUND),
            (BookingError::FlightDeparted("RW1".into()), StatusCode::BAD_REQUEST),
            (BookingError::SeatConflict { seat_code: "1A".into() }, StatusCode::CONFLICT),
            (BookingError::IdentityMismatch, StatusCode::UNAUTHORIZED),
            (BookingError::ReservationCancelled("ABC123".into()), StatusCode::CONFLICT),
            (
                BookingError::IdentifierExhausted { kind: "PNR", attempts: 20 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (BookingError::StorageError("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
