use rand::Rng;
use runway_core::ReservationRepository;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::BookingError;

pub const PNR_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const PNR_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Six characters drawn uniformly from A-Z0-9.
pub fn generate_pnr<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PNR_LENGTH)
        .map(|_| PNR_ALPHABET[rng.gen_range(0..PNR_ALPHABET.len())] as char)
        .collect()
}

/// Format: BP-{flight_number}-{10000..=99999}
pub fn generate_boarding_pass<R: Rng + ?Sized>(flight_number: &str, rng: &mut R) -> String {
    format!("BP-{}-{}", flight_number, rng.gen_range(10_000..=99_999))
}

/// Issues PNRs and boarding-pass numbers that are unused in the reservation store.
///
/// A candidate is only checked, never reserved: the caller must persist it promptly and
/// treat a unique-key failure at commit as a signal to ask for a fresh one.
#[derive(Clone)]
pub struct IdentifierGenerator {
    reservations: Arc<dyn ReservationRepository>,
    max_attempts: u32,
}

impl IdentifierGenerator {
    pub fn new(reservations: Arc<dyn ReservationRepository>, max_attempts: u32) -> Self {
        Self {
            reservations,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn next_pnr(&self) -> Result<String, BookingError> {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_pnr(&mut rand::thread_rng());
            if !self.reservations.exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!("PNR {} already taken (attempt {})", candidate, attempt);
        }

        warn!("PNR generation exhausted after {} attempts", self.max_attempts);
        Err(BookingError::IdentifierExhausted {
            kind: "PNR",
            attempts: self.max_attempts,
        })
    }

    pub async fn next_boarding_pass(&self, flight_number: &str) -> Result<String, BookingError> {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_boarding_pass(flight_number, &mut rand::thread_rng());
            if !self.reservations.exists_boarding_pass(&candidate).await? {
                return Ok(candidate);
            }
            debug!("Boarding pass {} already issued (attempt {})", candidate, attempt);
        }

        warn!(
            "Boarding pass generation for {} exhausted after {} attempts",
            flight_number, self.max_attempts
        );
        Err(BookingError::IdentifierExhausted {
            kind: "boarding pass",
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pnr_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let pnr = generate_pnr(&mut rng);
            assert_eq!(pnr.len(), PNR_LENGTH);
            assert!(pnr.bytes().all(|b| PNR_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_boarding_pass_format() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let bp = generate_boarding_pass("RW101", &mut rng);
            let digits = bp.strip_prefix("BP-RW101-").expect("prefix");
            let n: u32 = digits.parse().expect("digits");
            assert!((10_000..=99_999).contains(&n));
        }
    }
}
