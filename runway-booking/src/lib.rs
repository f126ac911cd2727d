pub mod error;
pub mod identifiers;
pub mod ledger;
pub mod lifecycle;

pub use error::BookingError;
pub use identifiers::IdentifierGenerator;
pub use ledger::SeatLedger;
pub use lifecycle::{BoardingPass, NewReservation, ReservationChanges, ReservationLifecycle, UpdateOutcome};
