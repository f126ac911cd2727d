use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

pub const DEFAULT_AIRCRAFT_TYPE: &str = "Not specified";
/// Seat counts are stored as 32-bit signed integers.
pub const MAX_SEAT_CAPACITY: i64 = i32::MAX as i64;

/// A scheduled departure that seats can be sold on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub aircraft_type: String,
    pub origin: String,
    pub destination: String,
    pub schedule: DateTime<Utc>,
    /// Base fare in minor units
    pub price_cents: i64,
    pub seat_capacity: u32,
    /// Administrative counter. Bookings do not move it; see `SeatAvailability` for the derived figure.
    pub seats_available: u32,
    pub created_at: DateTime<Utc>,
}

impl Flight {
    /// Bookings and check-in close once the schedule is no longer in the future.
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.schedule <= now
    }
}

pub fn normalize_flight_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Admin input for a new flight, validated into a `Flight`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub flight_number: String,
    pub airline: String,
    #[serde(default)]
    pub aircraft_type: Option<String>,
    pub origin: String,
    pub destination: String,
    pub schedule: DateTime<Utc>,
    pub price_cents: i64,
    pub seat_capacity: i64,
    #[serde(default)]
    pub seats_available: Option<i64>,
}

impl NewFlight {
    pub fn validate(self) -> CoreResult<Flight> {
        let flight_number = normalize_flight_number(&self.flight_number);
        if flight_number.is_empty() {
            return Err(CoreError::ValidationError("A flight number is required.".to_string()));
        }

        let airline = required(&self.airline, "Airline is required.")?;
        let origin = required(&self.origin, "Origin is required.")?;
        let destination = required(&self.destination, "Destination is required.")?;

        if self.price_cents < 0 {
            return Err(CoreError::ValidationError("Price must be a non-negative number.".to_string()));
        }

        if self.seat_capacity < 1 {
            return Err(CoreError::ValidationError("Seat capacity must be a positive number.".to_string()));
        }
        if self.seat_capacity > MAX_SEAT_CAPACITY {
            return Err(CoreError::ValidationError(format!(
                "Seat capacity cannot exceed {}.",
                MAX_SEAT_CAPACITY
            )));
        }

        let seats_available = self.seats_available.unwrap_or(self.seat_capacity);
        if seats_available < 0 {
            return Err(CoreError::ValidationError(
                "Seats available must be zero or a positive number.".to_string(),
            ));
        }
        if seats_available > self.seat_capacity {
            return Err(CoreError::ValidationError(
                "Seats available cannot exceed seat capacity.".to_string(),
            ));
        }

        let aircraft_type = self
            .aircraft_type
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AIRCRAFT_TYPE.to_string());

        Ok(Flight {
            id: Uuid::new_v4(),
            flight_number,
            airline,
            aircraft_type,
            origin,
            destination,
            schedule: self.schedule,
            price_cents: self.price_cents,
            seat_capacity: self.seat_capacity as u32,
            seats_available: seats_available as u32,
            created_at: Utc::now(),
        })
    }
}

fn required(value: &str, message: &str) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(message.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_flight() -> NewFlight {
        NewFlight {
            flight_number: " rw101 ".to_string(),
            airline: "Runway Air".to_string(),
            aircraft_type: None,
            origin: "MNL".to_string(),
            destination: "CEB".to_string(),
            schedule: Utc::now() + Duration::days(3),
            price_cents: 10_000,
            seat_capacity: 100,
            seats_available: None,
        }
    }

    #[test]
    fn test_seats_available_defaults_to_capacity() {
        let flight = new_flight().validate().unwrap();
        assert_eq!(flight.flight_number, "RW101");
        assert_eq!(flight.seats_available, 100);
        assert_eq!(flight.aircraft_type, DEFAULT_AIRCRAFT_TYPE);
    }

    #[test]
    fn test_seats_available_cannot_exceed_capacity() {
        let mut input = new_flight();
        input.seats_available = Some(200);
        assert!(matches!(input.validate(), Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_bad_capacity_and_price() {
        let mut input = new_flight();
        input.seat_capacity = 0;
        assert!(input.validate().is_err());

        let mut input = new_flight();
        input.price_cents = -1;
        assert!(input.validate().is_err());

        let mut input = new_flight();
        input.seats_available = Some(-5);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_capacity_must_fit_storage() {
        let mut input = new_flight();
        input.seat_capacity = i64::from(u32::MAX);
        let err = input.validate().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref m) if m.contains("cannot exceed")));

        let mut input = new_flight();
        input.seat_capacity = MAX_SEAT_CAPACITY;
        let flight = input.validate().unwrap();
        assert_eq!(flight.seat_capacity, 2_147_483_647);
        assert_eq!(flight.seats_available, 2_147_483_647);
    }

    #[test]
    fn test_departure_boundary() {
        let flight = new_flight().validate().unwrap();
        assert!(!flight.has_departed(Utc::now()));
        assert!(flight.has_departed(flight.schedule));
    }
}
