use async_trait::async_trait;
use chrono::Utc;
use runway_core::flight::normalize_flight_number;
use runway_core::search::FlightSearchRequest;
use runway_core::{
    Flight, FlightRepository, Reservation, ReservationRepository, ReservationStatus, StoreError,
    StoreResult, UniqueKey,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    flights: HashMap<Uuid, Flight>,
    reservations: HashMap<Uuid, Reservation>,
}

impl State {
    /// Same keys the Postgres schema enforces. `ignore` is the row being rewritten.
    fn check_reservation_keys(&self, candidate: &Reservation, ignore: Option<Uuid>) -> StoreResult<()> {
        for existing in self.reservations.values() {
            if Some(existing.id) == ignore {
                continue;
            }
            if existing.pnr == candidate.pnr {
                return Err(StoreError::DuplicateKey(UniqueKey::Pnr));
            }
            if candidate.is_active() && existing.holds_seat(candidate.flight_id, &candidate.seat.code) {
                return Err(StoreError::DuplicateKey(UniqueKey::ActiveSeat));
            }
            if candidate.boarding_pass_no.is_some() && existing.boarding_pass_no == candidate.boarding_pass_no {
                return Err(StoreError::DuplicateKey(UniqueKey::BoardingPass));
            }
        }
        Ok(())
    }
}

/// Both repositories over one lock, so every write checks and applies atomically.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlightRepository for InMemoryStore {
    async fn create_flight(&self, flight: &Flight) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.flights.values().any(|f| f.flight_number == flight.flight_number) {
            return Err(StoreError::DuplicateKey(UniqueKey::FlightNumber));
        }
        state.flights.insert(flight.id, flight.clone());
        Ok(())
    }

    async fn get_flight_by_id(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        Ok(self.state.read().await.flights.get(&id).cloned())
    }

    async fn get_flight_by_number(&self, flight_number: &str) -> StoreResult<Option<Flight>> {
        let wanted = normalize_flight_number(flight_number);
        let state = self.state.read().await;
        Ok(state.flights.values().find(|f| f.flight_number == wanted).cloned())
    }

    async fn list_flights(&self) -> StoreResult<Vec<Flight>> {
        let mut flights: Vec<Flight> = self.state.read().await.flights.values().cloned().collect();
        flights.sort_by_key(|f| f.schedule);
        Ok(flights)
    }

    async fn search_flights(&self, request: &FlightSearchRequest) -> StoreResult<Vec<Flight>> {
        let mut flights: Vec<Flight> = self
            .state
            .read()
            .await
            .flights
            .values()
            .filter(|f| request.matches(f))
            .cloned()
            .collect();
        flights.sort_by_key(|f| f.schedule);
        Ok(flights)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn find_active_by_seat(
        &self,
        flight_id: Uuid,
        seat_code: &str,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Option<Reservation>> {
        let state = self.state.read().await;
        Ok(state
            .reservations
            .values()
            .find(|r| Some(r.id) != exclude_id && r.holds_seat(flight_id, seat_code))
            .cloned())
    }

    async fn active_seat_codes(
        &self,
        flight_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .reservations
            .values()
            .filter(|r| r.flight_id == flight_id && r.is_active() && Some(r.id) != exclude_id)
            .map(|r| r.seat.code.clone())
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        Ok(self.state.read().await.reservations.get(&id).cloned())
    }

    async fn find_by_pnr(&self, pnr: &str) -> StoreResult<Option<Reservation>> {
        let state = self.state.read().await;
        Ok(state.reservations.values().find(|r| r.pnr == pnr).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>> {
        let mut found: Vec<Reservation> = self
            .state
            .read()
            .await
            .reservations
            .values()
            .filter(|r| r.user_id == Some(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn exists(&self, pnr: &str) -> StoreResult<bool> {
        Ok(self.state.read().await.reservations.values().any(|r| r.pnr == pnr))
    }

    async fn exists_boarding_pass(&self, code: &str) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .reservations
            .values()
            .any(|r| r.boarding_pass_no.as_deref() == Some(code)))
    }

    async fn insert(&self, reservation: &Reservation) -> StoreResult<Reservation> {
        let mut state = self.state.write().await;
        state.check_reservation_keys(reservation, None)?;
        state.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation.clone())
    }

    async fn update_selection(&self, reservation: &Reservation) -> StoreResult<Option<Reservation>> {
        let mut state = self.state.write().await;
        let Some(current) = state.reservations.get(&reservation.id) else {
            return Ok(None);
        };

        let mut next = current.clone();
        next.seat = reservation.seat.clone();
        next.meal = reservation.meal.clone();
        next.baggage = reservation.baggage;
        next.bill = reservation.bill;
        next.updated_at = reservation.updated_at;

        state.check_reservation_keys(&next, Some(next.id))?;
        state.reservations.insert(next.id, next.clone());
        Ok(Some(next))
    }

    async fn mark_cancelled(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        let mut state = self.state.write().await;
        Ok(state.reservations.get_mut(&id).map(|r| {
            r.status = ReservationStatus::Cancelled;
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn record_check_in(
        &self,
        id: Uuid,
        boarding_pass_no: &str,
    ) -> StoreResult<Option<Reservation>> {
        let mut state = self.state.write().await;
        let taken = state
            .reservations
            .values()
            .any(|r| r.boarding_pass_no.as_deref() == Some(boarding_pass_no));

        let Some(current) = state.reservations.get_mut(&id) else {
            return Ok(None);
        };
        if current.checked_in || !current.is_active() {
            return Ok(None);
        }
        if taken {
            return Err(StoreError::DuplicateKey(UniqueKey::BoardingPass));
        }

        current.checked_in = true;
        current.boarding_pass_no = Some(boarding_pass_no.to_string());
        current.updated_at = Utc::now();
        Ok(Some(current.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use runway_core::{Baggage, Bill, Meal, Passenger, Seat};
    use runway_shared::Masked;

    fn reservation(flight_id: Uuid, seat: &str, pnr: &str) -> Reservation {
        let now = Utc::now();
        Reservation {
            id: Uuid::new_v4(),
            flight_id,
            user_id: None,
            passenger: Passenger {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: Masked("ada@example.com".to_string()),
                passport: Masked("AB1234567".to_string()),
            },
            seat: Seat { code: seat.to_string(), is_premium: false },
            meal: Meal::default(),
            baggage: Baggage::default(),
            bill: Bill::default(),
            status: ReservationStatus::Booked,
            pnr: pnr.to_string(),
            checked_in: false,
            boarding_pass_no: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn flight(number: &str) -> Flight {
        let now = Utc::now();
        Flight {
            id: Uuid::new_v4(),
            flight_number: number.to_string(),
            airline: "Runway Air".to_string(),
            aircraft_type: "A320".to_string(),
            origin: "MNL".to_string(),
            destination: "CEB".to_string(),
            schedule: now + Duration::days(3),
            price_cents: 10_000,
            seat_capacity: 180,
            seats_available: 180,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_active_seat_key_ignores_cancelled() {
        let store = InMemoryStore::new();
        let flight_id = Uuid::new_v4();

        let first = store.insert(&reservation(flight_id, "12A", "AAAAAA")).await.unwrap();
        let err = store.insert(&reservation(flight_id, "12A", "BBBBBB")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(UniqueKey::ActiveSeat)));

        store.mark_cancelled(first.id).await.unwrap();
        store.insert(&reservation(flight_id, "12A", "BBBBBB")).await.unwrap();

        // Same seat on another flight is unrelated
        store.insert(&reservation(Uuid::new_v4(), "12A", "CCCCCC")).await.unwrap();
    }

    #[tokio::test]
    async fn test_pnr_key() {
        let store = InMemoryStore::new();
        store.insert(&reservation(Uuid::new_v4(), "1A", "QWERTY")).await.unwrap();

        let err = store.insert(&reservation(Uuid::new_v4(), "1A", "QWERTY")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(UniqueKey::Pnr)));
        assert!(store.exists("QWERTY").await.unwrap());
        assert!(!store.exists("ASDFGH").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_selection_into_taken_seat() {
        let store = InMemoryStore::new();
        let flight_id = Uuid::new_v4();
        store.insert(&reservation(flight_id, "5C", "AAAAAA")).await.unwrap();
        let mover = store.insert(&reservation(flight_id, "6C", "BBBBBB")).await.unwrap();

        let mut moved = mover.clone();
        moved.seat.code = "5C".to_string();
        let err = store.update_selection(&moved).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(UniqueKey::ActiveSeat)));

        // Rewriting your own seat is not a conflict
        assert!(store.update_selection(&mover).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_check_in_is_conditional() {
        let store = InMemoryStore::new();
        let r = store.insert(&reservation(Uuid::new_v4(), "3B", "ZXCVBN")).await.unwrap();

        let first = store.record_check_in(r.id, "BP-RW1-12345").await.unwrap();
        assert_eq!(first.and_then(|r| r.boarding_pass_no).as_deref(), Some("BP-RW1-12345"));

        assert!(store.record_check_in(r.id, "BP-RW1-54321").await.unwrap().is_none());
        assert!(store.exists_boarding_pass("BP-RW1-12345").await.unwrap());

        let cancelled = store.insert(&reservation(Uuid::new_v4(), "3B", "POIUYT")).await.unwrap();
        store.mark_cancelled(cancelled.id).await.unwrap();
        assert!(store.record_check_in(cancelled.id, "BP-RW1-99999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_flight_lookup() {
        let store = InMemoryStore::new();
        store.create_flight(&flight("RW101")).await.unwrap();

        let found = store.get_flight_by_number(" rw101 ").await.unwrap();
        assert_eq!(found.map(|f| f.flight_number).as_deref(), Some("RW101"));

        let err = store.create_flight(&flight("RW101")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(UniqueKey::FlightNumber)));
    }
}
