use chrono::Utc;
use runway_catalog::{normalize_seat_code, FareCalculator, SeatAvailability};
use runway_core::validation::PassengerDetails;
use runway_core::{
    Baggage, Flight, FlightRepository, Meal, Reservation, ReservationRepository,
    ReservationStatus, StoreError, UniqueKey,
};
use runway_shared::ReservationEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::identifiers::{IdentifierGenerator, DEFAULT_MAX_ATTEMPTS};
use crate::ledger::{seat_conflict_or, SeatLedger};

/// Raw booking selections. Fees and totals are never part of the input.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub flight_id: Uuid,
    pub passenger: PassengerDetails,
    pub seat_code: String,
    pub meal: Meal,
    pub baggage_kg: u32,
}

/// Partial update; `None` leaves the current selection in place.
#[derive(Debug, Clone, Default)]
pub struct ReservationChanges {
    pub seat_code: Option<String>,
    pub meal: Option<Meal>,
    pub baggage_kg: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub reservation: Reservation,
    /// Additional amount owed, never negative. Downgrades are not refunded here.
    pub amount_due_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardingPass {
    pub pnr: String,
    pub passenger_name: String,
    pub flight_number: String,
    pub seat_code: String,
    pub boarding_pass_no: String,
}

impl BoardingPass {
    fn issued(reservation: &Reservation, flight: &Flight) -> Self {
        Self {
            pnr: reservation.pnr.clone(),
            passenger_name: reservation.passenger.full_name(),
            flight_number: flight.flight_number.clone(),
            seat_code: reservation.seat.code.clone(),
            boarding_pass_no: reservation.boarding_pass_no.clone().unwrap_or_default(),
        }
    }
}

/// Create / update / cancel / check-in for reservations.
///
/// Holds no locks. Exclusion comes from the store's unique keys, so any number of
/// lifecycles may run against the same store concurrently.
pub struct ReservationLifecycle {
    flights: Arc<dyn FlightRepository>,
    reservations: Arc<dyn ReservationRepository>,
    ledger: SeatLedger,
    identifiers: IdentifierGenerator,
    fares: FareCalculator,
    events: Option<broadcast::Sender<ReservationEvent>>,
}

impl ReservationLifecycle {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        reservations: Arc<dyn ReservationRepository>,
        fares: FareCalculator,
    ) -> Self {
        Self {
            ledger: SeatLedger::new(reservations.clone()),
            identifiers: IdentifierGenerator::new(reservations.clone(), DEFAULT_MAX_ATTEMPTS),
            flights,
            reservations,
            fares,
            events: None,
        }
    }

    /// Retry budget for PNR and boarding-pass generation, and for commit-time identifier collisions.
    pub fn with_identifier_attempts(mut self, attempts: u32) -> Self {
        self.identifiers = IdentifierGenerator::new(self.reservations.clone(), attempts);
        self
    }

    pub fn with_events(mut self, events: broadcast::Sender<ReservationEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Book a seat. `requester` is the resolved user, None for guests.
    pub async fn create(
        &self,
        request: NewReservation,
        requester: Option<Uuid>,
    ) -> Result<Reservation, BookingError> {
        let passenger = request.passenger.validate()?;
        let seat_code = normalize_seat_code(&request.seat_code)?;

        let flight = self.load_flight(request.flight_id).await?;
        if flight.has_departed(Utc::now()) {
            info!("Reservation failed: flight {} already departed.", flight.flight_number);
            return Err(BookingError::FlightDeparted(flight.flight_number));
        }

        let seat = self.fares.seat(&seat_code);
        let baggage = Baggage { kg: request.baggage_kg };
        let bill = self.fares.compute_bill(
            flight.price_cents,
            seat.is_premium,
            request.meal.price_cents,
            baggage.kg,
        )?;

        self.ledger.try_claim_seat(flight.id, &seat_code, None).await?;

        let now = Utc::now();
        let mut reservation = Reservation {
            id: Uuid::new_v4(),
            flight_id: flight.id,
            user_id: requester,
            passenger,
            seat,
            meal: request.meal,
            baggage,
            bill,
            status: ReservationStatus::Booked,
            pnr: String::new(),
            checked_in: false,
            boarding_pass_no: None,
            created_at: now,
            updated_at: now,
        };

        // A PNR collision at commit only redoes identifier assignment, not the whole booking.
        let attempts = self.identifiers.max_attempts();
        for _ in 0..attempts {
            reservation.pnr = self.identifiers.next_pnr().await?;

            match self.reservations.insert(&reservation).await {
                Ok(saved) => {
                    info!(
                        "New reservation created. PNR: {} Flight: {} Seat: {} Total: {}",
                        saved.pnr, flight.flight_number, saved.seat.code, saved.bill.total_cents
                    );
                    self.publish(ReservationEvent::SeatClaimed {
                        flight_id: saved.flight_id,
                        reservation_id: saved.id,
                        seat_code: saved.seat.code.clone(),
                        pnr: saved.pnr.clone(),
                        at: Utc::now().timestamp(),
                    });
                    return Ok(saved);
                }
                Err(StoreError::DuplicateKey(UniqueKey::Pnr)) => {
                    warn!("PNR {} was taken before commit, regenerating", reservation.pnr);
                }
                Err(err) => return Err(seat_conflict_or(err, &reservation.seat.code)),
            }
        }

        Err(BookingError::IdentifierExhausted {
            kind: "PNR",
            attempts,
        })
    }

    /// Change seat, meal or baggage. The bill is recomputed from scratch on the booked base fare.
    pub async fn update(
        &self,
        reservation_id: Uuid,
        changes: ReservationChanges,
    ) -> Result<UpdateOutcome, BookingError> {
        let current = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Reservation {}", reservation_id)))?;

        let mut updated = current.clone();

        if let Some(raw) = changes.seat_code.as_deref() {
            let seat_code = normalize_seat_code(raw)?;
            if seat_code != current.seat.code {
                self.ledger
                    .try_claim_seat(current.flight_id, &seat_code, Some(current.id))
                    .await?;
                updated.seat = self.fares.seat(&seat_code);
                info!("PNR {} changed seat to {}", current.pnr, seat_code);
            }
        }

        if let Some(meal) = changes.meal {
            info!("PNR {} changed meal to {}", current.pnr, meal.label);
            updated.meal = meal;
        }

        if let Some(kg) = changes.baggage_kg {
            info!("PNR {} changed baggage to {} kg", current.pnr, kg);
            updated.baggage = Baggage { kg };
        }

        updated.bill = self.fares.compute_bill(
            current.bill.base_fare_cents,
            updated.seat.is_premium,
            updated.meal.price_cents,
            updated.baggage.kg,
        )?;
        updated.updated_at = Utc::now();

        let saved = match self.reservations.update_selection(&updated).await {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                return Err(BookingError::NotFound(format!("Reservation {}", reservation_id)));
            }
            Err(err) => return Err(seat_conflict_or(err, &updated.seat.code)),
        };

        let amount_due_cents = (saved.bill.total_cents - current.bill.total_cents).max(0);
        info!("Reservation updated. PNR: {} Amount Due: {}", saved.pnr, amount_due_cents);

        if saved.seat.code != current.seat.code {
            let at = Utc::now().timestamp();
            self.publish(ReservationEvent::SeatReleased {
                flight_id: current.flight_id,
                reservation_id: current.id,
                seat_code: current.seat.code.clone(),
                at,
            });
            self.publish(ReservationEvent::SeatClaimed {
                flight_id: saved.flight_id,
                reservation_id: saved.id,
                seat_code: saved.seat.code.clone(),
                pnr: saved.pnr.clone(),
                at,
            });
        }
        self.publish(ReservationEvent::ReservationUpdated {
            flight_id: saved.flight_id,
            reservation_id: saved.id,
            total_cents: saved.bill.total_cents,
            amount_due_cents,
            at: Utc::now().timestamp(),
        });

        Ok(UpdateOutcome {
            reservation: saved,
            amount_due_cents,
        })
    }

    /// Releases the seat. Cancelling twice, or cancelling a missing reservation, is not an error:
    /// the result is None only when nothing with that id exists.
    pub async fn cancel(&self, reservation_id: Uuid) -> Result<Option<Reservation>, BookingError> {
        let Some(cancelled) = self.reservations.mark_cancelled(reservation_id).await? else {
            info!("Attempted to cancel non-existent reservation ID: {}", reservation_id);
            return Ok(None);
        };

        info!("Reservation cancelled. ID: {} PNR: {}", cancelled.id, cancelled.pnr);
        self.publish(ReservationEvent::SeatReleased {
            flight_id: cancelled.flight_id,
            reservation_id: cancelled.id,
            seat_code: cancelled.seat.code.clone(),
            at: Utc::now().timestamp(),
        });

        Ok(Some(cancelled))
    }

    /// Online check-in by PNR and last name. Issues the boarding pass exactly once.
    pub async fn check_in(&self, pnr: &str, last_name: &str) -> Result<BoardingPass, BookingError> {
        let pnr = pnr.trim().to_uppercase();
        if pnr.is_empty() || last_name.trim().is_empty() {
            return Err(BookingError::ValidationError(
                "PNR and Last Name are required".to_string(),
            ));
        }

        let reservation = self
            .reservations
            .find_by_pnr(&pnr)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Reservation with PNR {}", pnr)))?;

        if !reservation.passenger.last_name_matches(last_name) {
            info!("Check-in failed: last name mismatch for PNR {}", pnr);
            return Err(BookingError::IdentityMismatch);
        }

        if !reservation.is_active() {
            info!("Check-in failed: PNR {} is cancelled", pnr);
            return Err(BookingError::ReservationCancelled(pnr));
        }

        let flight = self.load_flight(reservation.flight_id).await?;
        if flight.has_departed(Utc::now()) {
            info!("Check-in failed: flight {} has already departed.", flight.flight_number);
            return Err(BookingError::FlightDeparted(flight.flight_number));
        }

        if reservation.checked_in {
            info!("Check-in attempt: already checked in for PNR {}", pnr);
            return Err(BookingError::AlreadyCheckedIn(BoardingPass::issued(&reservation, &flight)));
        }

        let attempts = self.identifiers.max_attempts();
        for _ in 0..attempts {
            let boarding_pass_no = self.identifiers.next_boarding_pass(&flight.flight_number).await?;

            match self.reservations.record_check_in(reservation.id, &boarding_pass_no).await {
                Ok(Some(saved)) => {
                    info!("Check-in successful for PNR: {}", saved.pnr);
                    self.publish(ReservationEvent::PassengerCheckedIn {
                        flight_id: saved.flight_id,
                        reservation_id: saved.id,
                        boarding_pass_no: boarding_pass_no.clone(),
                        at: Utc::now().timestamp(),
                    });
                    return Ok(BoardingPass::issued(&saved, &flight));
                }
                Ok(None) => return Err(self.check_in_lost_race(reservation.id, &flight).await),
                Err(StoreError::DuplicateKey(UniqueKey::BoardingPass)) => {
                    warn!("Boarding pass {} was issued concurrently, regenerating", boarding_pass_no);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(BookingError::IdentifierExhausted {
            kind: "boarding pass",
            attempts,
        })
    }

    /// The conditional check-in write matched nothing: report what happened in between.
    async fn check_in_lost_race(&self, reservation_id: Uuid, flight: &Flight) -> BookingError {
        match self.reservations.find_by_id(reservation_id).await {
            Ok(Some(current)) if current.checked_in => {
                BookingError::AlreadyCheckedIn(BoardingPass::issued(&current, flight))
            }
            Ok(Some(current)) if !current.is_active() => {
                BookingError::ReservationCancelled(current.pnr)
            }
            Ok(Some(current)) => BookingError::StorageError(format!(
                "check-in for PNR {} was not recorded",
                current.pnr
            )),
            Ok(None) => BookingError::NotFound(format!("Reservation {}", reservation_id)),
            Err(err) => err.into(),
        }
    }

    pub async fn get(&self, reservation_id: Uuid) -> Result<Reservation, BookingError> {
        self.reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Reservation {}", reservation_id)))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.reservations.list_by_user(user_id).await?)
    }

    /// Seat codes held by active reservations, e.g. to grey out a seat map.
    pub async fn occupied_seats(
        &self,
        flight_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<String>, BookingError> {
        self.load_flight(flight_id).await?;
        self.ledger.occupied_seats(flight_id, exclude_id).await
    }

    pub async fn seat_availability(&self, flight_id: Uuid) -> Result<SeatAvailability, BookingError> {
        let flight = self.load_flight(flight_id).await?;
        self.ledger.availability(&flight).await
    }

    async fn load_flight(&self, flight_id: Uuid) -> Result<Flight, BookingError> {
        self.flights
            .get_flight_by_id(flight_id)
            .await?
            .ok_or_else(|| {
                info!("Flight ID not found: {}", flight_id);
                BookingError::NotFound(format!("Flight {}", flight_id))
            })
    }

    fn publish(&self, event: ReservationEvent) {
        if let Some(tx) = &self.events {
            // No subscribers is fine
            let _ = tx.send(event);
        }
    }
}
