use serde::{Deserialize, Serialize};
use std::fmt;

/// Passenger data (email, passport number) that must never leak through `{:?}` or `{}` in logs.
///
/// Serialization is transparent: API responses and the store need the real value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> Masked<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T: AsRef<str>> Masked<T> {
    /// Last two characters, for support staff matching a document without seeing all of it.
    pub fn hint(&self) -> String {
        let value = self.0.as_ref();
        let tail: String = value.chars().rev().take(2).collect::<Vec<_>>().into_iter().rev().collect();
        format!("******{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_never_prints_value() {
        let passport = Masked("P1234567".to_string());
        assert_eq!(format!("{:?}", passport), "********");
        assert_eq!(format!("{}", passport), "********");
        assert_eq!(passport.hint(), "******67");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let email = Masked("jane@example.com".to_string());
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"jane@example.com\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose(), "jane@example.com");
    }
}
