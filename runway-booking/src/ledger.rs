use runway_catalog::SeatAvailability;
use runway_core::{Flight, ReservationRepository, StoreError, UniqueKey};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::BookingError;

/// Decides whether a reservation may hold a seat on a flight.
///
/// The check here is optimistic. The store's unique key on (flight, seat) among
/// non-cancelled reservations is authoritative; `seat_conflict_or` turns a lost
/// race at commit into the same `SeatConflict` the check reports.
#[derive(Clone)]
pub struct SeatLedger {
    reservations: Arc<dyn ReservationRepository>,
}

impl SeatLedger {
    pub fn new(reservations: Arc<dyn ReservationRepository>) -> Self {
        Self { reservations }
    }

    /// `exclude_id` is the reservation being updated, so keeping your own seat is not a conflict.
    pub async fn try_claim_seat(
        &self,
        flight_id: Uuid,
        seat_code: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), BookingError> {
        let holder = self
            .reservations
            .find_active_by_seat(flight_id, seat_code, exclude_id)
            .await?;

        match holder {
            Some(existing) => {
                info!(
                    "Seat {} on flight {} already held by PNR {}",
                    seat_code, flight_id, existing.pnr
                );
                Err(BookingError::SeatConflict {
                    seat_code: seat_code.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    pub async fn occupied_seats(
        &self,
        flight_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<String>, BookingError> {
        let mut seats = self.reservations.active_seat_codes(flight_id, exclude_id).await?;
        seats.sort();
        Ok(seats)
    }

    /// Availability derived from active reservations, independent of `Flight::seats_available`.
    pub async fn availability(&self, flight: &Flight) -> Result<SeatAvailability, BookingError> {
        let occupied = self.reservations.active_seat_codes(flight.id, None).await?;
        Ok(SeatAvailability::new(flight.seat_capacity, occupied.len()))
    }
}

/// Commit-time failure mapping for writes that claim a seat.
pub(crate) fn seat_conflict_or(err: StoreError, seat_code: &str) -> BookingError {
    match err {
        StoreError::DuplicateKey(UniqueKey::ActiveSeat) => {
            info!("Seat booking conflict detected at commit: {}", seat_code);
            BookingError::SeatConflict {
                seat_code: seat_code.to_string(),
            }
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_conflict_mapping() {
        let err = seat_conflict_or(StoreError::DuplicateKey(UniqueKey::ActiveSeat), "3B");
        assert!(matches!(err, BookingError::SeatConflict { ref seat_code } if seat_code == "3B"));

        let err = seat_conflict_or(StoreError::Backend("connection reset".to_string()), "3B");
        assert!(matches!(err, BookingError::StorageError(_)));

        let err = seat_conflict_or(StoreError::DuplicateKey(UniqueKey::Pnr), "3B");
        assert!(matches!(err, BookingError::StorageError(_)));
    }
}
