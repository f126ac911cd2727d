use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::flight::Flight;
use crate::reservation::Reservation;
use crate::search::FlightSearchRequest;

/// Uniqueness constraints the store enforces at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    /// (flight_id, seat_code) among non-cancelled reservations
    ActiveSeat,
    Pnr,
    BoardingPass,
    FlightNumber,
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniqueKey::ActiveSeat => "active seat",
            UniqueKey::Pnr => "pnr",
            UniqueKey::BoardingPass => "boarding pass",
            UniqueKey::FlightNumber => "flight number",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(UniqueKey),

    #[error("Storage failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for flight data access
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn create_flight(&self, flight: &Flight) -> StoreResult<()>;

    async fn get_flight_by_id(&self, id: Uuid) -> StoreResult<Option<Flight>>;

    /// Lookup is case-normalized, "rw101" finds "RW101".
    async fn get_flight_by_number(&self, flight_number: &str) -> StoreResult<Option<Flight>>;

    /// All flights, earliest departure first
    async fn list_flights(&self) -> StoreResult<Vec<Flight>>;

    async fn search_flights(&self, request: &FlightSearchRequest) -> StoreResult<Vec<Flight>>;
}

/// Repository trait for reservation data access.
///
/// Every write is a single atomic statement. `insert` and `update_selection` fail with
/// `StoreError::DuplicateKey` when they would break a unique key, including the active-seat key.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn find_active_by_seat(
        &self,
        flight_id: Uuid,
        seat_code: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Option<Reservation>>;

    async fn active_seat_codes(
        &self,
        flight_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Vec<String>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>>;

    async fn find_by_pnr(&self, pnr: &str) -> StoreResult<Option<Reservation>>;

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>>;

    async fn exists(&self, pnr: &str) -> StoreResult<bool>;

    async fn exists_boarding_pass(&self, code: &str) -> StoreResult<bool>;

    async fn insert(&self, reservation: &Reservation) -> StoreResult<Reservation>;

    /// Writes seat, meal, baggage and bill only. Returns None when the reservation is gone.
    async fn update_selection(&self, reservation: &Reservation) -> StoreResult<Option<Reservation>>;

    /// Flips status to cancelled. Returns None when the reservation does not exist.
    async fn mark_cancelled(&self, id: Uuid) -> StoreResult<Option<Reservation>>;

    /// Sets checked_in and the boarding pass, only while not checked in and not cancelled.
    /// Returns None when no row matched that condition.
    async fn record_check_in(
        &self,
        id: Uuid,
        boarding_pass_no: &str,
    ) -> StoreResult<Option<Reservation>>;
}
