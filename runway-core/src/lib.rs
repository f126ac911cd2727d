pub mod flight;
pub mod repository;
pub mod reservation;
pub mod search;
pub mod validation;

pub use flight::{Flight, NewFlight};
pub use repository::{FlightRepository, ReservationRepository, StoreError, StoreResult, UniqueKey};
pub use reservation::{Baggage, Bill, Meal, Passenger, Reservation, ReservationStatus, Seat};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
