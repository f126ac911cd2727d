use runway_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

const MAX_SEAT_CODE_LEN: usize = 6;

/// Leading integer run of a seat code: "3B" -> 3, "12C" -> 12, "B" -> 0.
pub fn seat_row(code: &str) -> u32 {
    let digits: String = code.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Trim and upper-case so "3b" and "3B" claim the same seat.
pub fn normalize_seat_code(raw: &str) -> CoreResult<String> {
    let code = raw.trim().to_ascii_uppercase();

    if code.is_empty() {
        return Err(CoreError::ValidationError("A seat selection is required.".to_string()));
    }
    if code.len() > MAX_SEAT_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::ValidationError(format!("Seat code {} is not valid.", raw.trim())));
    }

    Ok(code)
}

/// Seat counts derived from the active reservations on a flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeatAvailability {
    pub capacity: u32,
    pub occupied: u32,
    pub remaining: u32,
}

impl SeatAvailability {
    pub fn new(capacity: u32, occupied: usize) -> Self {
        let occupied = u32::try_from(occupied).unwrap_or(u32::MAX);
        Self {
            capacity,
            occupied,
            remaining: capacity.saturating_sub(occupied),
        }
    }

    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            f64::from(self.occupied) / f64::from(self.capacity)
        }
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seat_row_extraction() {
        assert_eq!(seat_row("3B"), 3);
        assert_eq!(seat_row("12C"), 12);
        assert_eq!(seat_row("5A"), 5);
        assert_eq!(seat_row("B"), 0);
        assert_eq!(seat_row(""), 0);
    }

    #[test]
    fn test_normalize_seat_code() {
        assert_eq!(normalize_seat_code(" 3b ").unwrap(), "3B");
        assert!(normalize_seat_code("").is_err());
        assert!(normalize_seat_code("   ").is_err());
        assert!(normalize_seat_code("3-B").is_err());
        assert!(normalize_seat_code("1234567").is_err());
    }

    #[test]
    fn test_availability() {
        let availability = SeatAvailability::new(100, 10);
        assert_eq!(availability.remaining, 90);
        assert!((availability.utilization() - 0.1).abs() < 0.01);
        assert!(!availability.is_sold_out());

        // More active reservations than capacity still reports zero remaining.
        let overbooked = SeatAvailability::new(2, 3);
        assert_eq!(overbooked.remaining, 0);
        assert!(overbooked.is_sold_out());
    }

    proptest! {
        #[test]
        fn prop_row_is_leading_number(row in 0u32..1000, letter in "[A-K]") {
            let code = format!("{}{}", row, letter);
            prop_assert_eq!(seat_row(&code), row);
        }
    }
}
