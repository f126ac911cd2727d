use chrono::{DateTime, Utc};
use runway_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Reservation status. `Cancelled` is terminal and releases the seat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Booked,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Booked => "booked",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        *self != ReservationStatus::Cancelled
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(ReservationStatus::Booked),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(format!("unknown reservation status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub passport: Masked<String>,
}

impl Passenger {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check-in identity check: case-insensitive, surrounding whitespace ignored.
    pub fn last_name_matches(&self, candidate: &str) -> bool {
        self.last_name.trim().to_lowercase() == candidate.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub code: String,
    /// Derived from the row number, never client-supplied
    pub is_premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meal {
    pub label: String,
    pub price_cents: i64,
}

impl Meal {
    pub const NONE_LABEL: &'static str = "None";

    /// Blank labels fall back to "None"; negative prices are clamped to zero.
    pub fn new(label: Option<String>, price_cents: i64) -> Self {
        let label = label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| Self::NONE_LABEL.to_string());

        Self {
            label,
            price_cents: price_cents.max(0),
        }
    }
}

impl Default for Meal {
    fn default() -> Self {
        Self::new(None, 0)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Baggage {
    pub kg: u32,
}

/// Itemized fare. Always server-derived, see `FareCalculator`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bill {
    pub base_fare_cents: i64,
    pub seat_fee_cents: i64,
    pub meal_fee_cents: i64,
    pub baggage_fee_cents: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub flight_id: Uuid,
    /// None for guest bookings
    pub user_id: Option<Uuid>,
    pub passenger: Passenger,
    pub seat: Seat,
    pub meal: Meal,
    pub baggage: Baggage,
    pub bill: Bill,
    pub status: ReservationStatus,
    pub pnr: String,
    pub checked_in: bool,
    pub boarding_pass_no: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// True when this reservation currently occupies `seat_code` on `flight_id`.
    pub fn holds_seat(&self, flight_id: Uuid, seat_code: &str) -> bool {
        self.is_active() && self.flight_id == flight_id && self.seat.code == seat_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_and_activity() {
        assert_eq!("booked".parse::<ReservationStatus>().unwrap(), ReservationStatus::Booked);
        assert_eq!(ReservationStatus::Cancelled.as_str(), "cancelled");
        assert!(ReservationStatus::Booked.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
        assert!("refunded".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_meal_defaults() {
        let meal = Meal::new(Some("  ".to_string()), -300);
        assert_eq!(meal.label, Meal::NONE_LABEL);
        assert_eq!(meal.price_cents, 0);
        assert_eq!(Meal::default(), meal);
    }

    #[test]
    fn test_last_name_match_ignores_case() {
        let passenger = Passenger {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: Masked("john@example.com".to_string()),
            passport: Masked("P1234567".to_string()),
        };
        assert!(passenger.last_name_matches(" dOE "));
        assert!(!passenger.last_name_matches("Smith"));
        assert_eq!(passenger.full_name(), "John Doe");
    }
}
