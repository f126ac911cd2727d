use regex::Regex;
use runway_shared::pii::Masked;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::reservation::Passenger;
use crate::{CoreError, CoreResult};

// ASCII classes only: \w and \s would otherwise match any Unicode letter or space.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^[A-Za-z][A-Za-z\s'-]{1,}$").expect("name pattern"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").expect("email pattern"));
static PASSPORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{7,9}$").expect("passport pattern"));

/// Raw passenger identity as submitted by the booking form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassengerDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub passport: String,
}

impl PassengerDetails {
    /// Trims every field, lower-cases the email and checks each against its pattern.
    /// Reports the first field that fails.
    pub fn validate(&self) -> CoreResult<Passenger> {
        let first_name = self.first_name.trim();
        if !NAME_PATTERN.is_match(first_name) {
            return Err(CoreError::ValidationError(
                "Please enter a valid first name (letters, spaces, hyphens, apostrophes only).".to_string(),
            ));
        }

        let last_name = self.last_name.trim();
        if !NAME_PATTERN.is_match(last_name) {
            return Err(CoreError::ValidationError(
                "Please enter a valid last name (letters, spaces, hyphens, apostrophes only).".to_string(),
            ));
        }

        let email = self.email.trim().to_lowercase();
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(CoreError::ValidationError("Please enter a valid email address.".to_string()));
        }

        let passport = self.passport.trim();
        if !PASSPORT_PATTERN.is_match(passport) {
            return Err(CoreError::ValidationError(
                "Passport number must be 7 to 9 alphanumeric characters.".to_string(),
            ));
        }

        Ok(Passenger {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: Masked(email),
            passport: Masked(passport.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> PassengerDetails {
        PassengerDetails {
            first_name: " John ".to_string(),
            last_name: "O'Neil-Smith".to_string(),
            email: "John.Doe@Example.com".to_string(),
            passport: "P1234567".to_string(),
        }
    }

    #[test]
    fn test_valid_passenger_is_normalized() {
        let passenger = details().validate().unwrap();
        assert_eq!(passenger.first_name, "John");
        assert_eq!(passenger.email.expose(), "john.doe@example.com");
    }

    #[test]
    fn test_rejects_malformed_fields() {
        let mut d = details();
        d.first_name = "J".to_string();
        assert!(d.validate().is_err());

        let mut d = details();
        d.last_name = "D03".to_string();
        assert!(d.validate().is_err());

        let mut d = details();
        d.email = "not-an-email".to_string();
        assert!(d.validate().is_err());

        let mut d = details();
        d.email = String::new();
        assert!(d.validate().is_err());

        let mut d = details();
        d.passport = "P12".to_string();
        assert!(d.validate().is_err());

        let mut d = details();
        d.passport = "P1234567890".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_patterns_are_ascii_only() {
        let mut d = details();
        d.email = "jöhn@exämple.com".to_string();
        assert!(d.validate().is_err());

        let mut d = details();
        d.first_name = "Mary\u{2003}Ann".to_string();
        assert!(d.validate().is_err());

        let mut d = details();
        d.first_name = "Mary Ann".to_string();
        d.email = "mary_ann.o-neil@mail.example.ph".to_string();
        assert!(d.validate().is_ok());
    }
}
