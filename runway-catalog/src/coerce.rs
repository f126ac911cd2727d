//! Loose client input to non-negative integers. Missing, null, non-numeric, NaN and negative all become 0.

use serde_json::Value;

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    (n.is_finite() && n > 0.0).then_some(n)
}

/// Minor-unit amount, rounded to the nearest cent. Anything past `i64::MAX` pins to it;
/// the fare calculator rejects amounts above its own maximum.
pub fn amount_cents(value: &Value) -> i64 {
    as_number(value).map_or(0, |n| n.round().min(i64::MAX as f64) as i64)
}

/// Whole kilograms, fractional part dropped. Pins to `u32::MAX` like `amount_cents`.
pub fn kilograms(value: &Value) -> u32 {
    as_number(value).map_or(0, |n| n.trunc().min(f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_coercion() {
        assert_eq!(amount_cents(&json!(2000)), 2000);
        assert_eq!(amount_cents(&json!("1500")), 1500);
        assert_eq!(amount_cents(&json!(12.6)), 13);
        assert_eq!(amount_cents(&json!("abc")), 0);
        assert_eq!(amount_cents(&json!(null)), 0);
        assert_eq!(amount_cents(&json!(-40)), 0);
        assert_eq!(amount_cents(&json!({"price": 5})), 0);
        assert_eq!(amount_cents(&json!(1e19)), i64::MAX);
        assert_eq!(amount_cents(&json!("1e400")), 0);
    }

    #[test]
    fn test_kilogram_coercion() {
        assert_eq!(kilograms(&json!(10)), 10);
        assert_eq!(kilograms(&json!("23")), 23);
        assert_eq!(kilograms(&json!(7.9)), 7);
        assert_eq!(kilograms(&json!("NaN")), 0);
        assert_eq!(kilograms(&Value::Null), 0);
        assert_eq!(kilograms(&json!("3000000000")), 3_000_000_000);
        assert_eq!(kilograms(&json!(1e12)), u32::MAX);
    }
}
