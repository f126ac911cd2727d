use runway_core::{CoreError, StoreError};

use crate::lifecycle::BoardingPass;

/// Outcome kinds of the reservation lifecycle. Everything except `StorageError`
/// is an expected business result the transport layer maps to a response.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Flight {0} has already departed")]
    FlightDeparted(String),

    /// Same kind whether the optimistic check or the store's unique key caught it.
    #[error("Seat {seat_code} is already booked")]
    SeatConflict { seat_code: String },

    #[error("Last name does not match the reservation")]
    IdentityMismatch,

    /// Soft failure: carries the boarding pass issued by the first check-in.
    #[error("Passenger is already checked in")]
    AlreadyCheckedIn(BoardingPass),

    #[error("Reservation {0} is cancelled")]
    ReservationCancelled(String),

    #[error("Could not generate a unique {kind} after {attempts} attempts")]
    IdentifierExhausted { kind: &'static str, attempts: u32 },

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<CoreError> for BookingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => BookingError::ValidationError(msg),
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::StorageError(err.to_string())
    }
}
