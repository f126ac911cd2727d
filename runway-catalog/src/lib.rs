pub mod coerce;
pub mod fare;
pub mod seat;

pub use fare::{FareCalculator, FareRules};
pub use seat::{normalize_seat_code, seat_row, SeatAvailability};
