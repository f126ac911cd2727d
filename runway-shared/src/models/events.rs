use uuid::Uuid;

/// Published after a reservation mutation commits. Seat maps subscribe per flight.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservationEvent {
    SeatClaimed {
        flight_id: Uuid,
        reservation_id: Uuid,
        seat_code: String,
        pnr: String,
        at: i64,
    },
    SeatReleased {
        flight_id: Uuid,
        reservation_id: Uuid,
        seat_code: String,
        at: i64,
    },
    ReservationUpdated {
        flight_id: Uuid,
        reservation_id: Uuid,
        total_cents: i64,
        amount_due_cents: i64,
        at: i64,
    },
    PassengerCheckedIn {
        flight_id: Uuid,
        reservation_id: Uuid,
        boarding_pass_no: String,
        at: i64,
    },
}

impl ReservationEvent {
    pub fn flight_id(&self) -> Uuid {
        match self {
            ReservationEvent::SeatClaimed { flight_id, .. }
            | ReservationEvent::SeatReleased { flight_id, .. }
            | ReservationEvent::ReservationUpdated { flight_id, .. }
            | ReservationEvent::PassengerCheckedIn { flight_id, .. } => *flight_id,
        }
    }

    /// SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            ReservationEvent::SeatClaimed { .. } => "seat_claimed",
            ReservationEvent::SeatReleased { .. } => "seat_released",
            ReservationEvent::ReservationUpdated { .. } => "reservation_updated",
            ReservationEvent::PassengerCheckedIn { .. } => "passenger_checked_in",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_is_tagged() {
        let flight_id = Uuid::new_v4();
        let event = ReservationEvent::SeatReleased {
            flight_id,
            reservation_id: Uuid::new_v4(),
            seat_code: "3B".to_string(),
            at: 0,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "seat_released");
        assert_eq!(json["seat_code"], "3B");
        assert_eq!(event.flight_id(), flight_id);
        assert_eq!(event.kind(), "seat_released");
    }
}
