use runway_catalog::FareRules;
use runway_core::{StoreError, StoreResult, UniqueKey};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::{info, warn};
use serde_json::Value;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Config values overridden by rows of `business_rules`, stored as `{"value": <integer>}`.
    pub async fn fetch_fare_rules(&self, defaults: FareRules) -> Result<FareRules, sqlx::Error> {
        let rows: Vec<(String, Value)> =
            sqlx::query_as("SELECT rule_key, rule_value FROM business_rules")
                .fetch_all(&self.pool)
                .await?;

        Ok(apply_rule_overrides(defaults, rows))
    }
}

/// Unique violations become `DuplicateKey` by index name; everything else is a backend failure.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let key = match db_err.constraint() {
                Some("reservations_active_seat_key") => Some(UniqueKey::ActiveSeat),
                Some("reservations_pnr_key") => Some(UniqueKey::Pnr),
                Some("reservations_boarding_pass_key") => Some(UniqueKey::BoardingPass),
                Some("flights_flight_number_key") => Some(UniqueKey::FlightNumber),
                _ => None,
            };
            if let Some(key) = key {
                return StoreError::DuplicateKey(key);
            }
        }
    }
    StoreError::Backend(err.to_string())
}

/// Binds an unsigned count into an INTEGER column, refusing values Postgres would see as negative.
pub(crate) fn int4(value: u32, column: &str) -> StoreResult<i32> {
    i32::try_from(value)
        .map_err(|_| StoreError::Backend(format!("{} value {} does not fit an INTEGER column", column, value)))
}

/// Reads an INTEGER column back into an unsigned count.
pub(crate) fn uint4(value: i32, column: &str) -> StoreResult<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::Backend(format!("{} holds negative value {}", column, value)))
}

fn apply_rule_overrides(defaults: FareRules, rows: Vec<(String, Value)>) -> FareRules {
    let mut rules = defaults;

    for (key, value) in rows {
        let Some(v) = value.get("value").and_then(Value::as_i64) else {
            warn!("Ignoring business rule {} with non-integer value", key);
            continue;
        };

        match key.as_str() {
            "premium_seat_surcharge_cents" => rules.premium_seat_surcharge_cents = v.max(0),
            "baggage_rate_per_kg_cents" => rules.baggage_rate_per_kg_cents = v.max(0),
            "tax_rate_bps" => rules.tax_rate_bps = v.max(0),
            "premium_row_first" => rules.premium_row_first = v.clamp(0, i64::from(u32::MAX)) as u32,
            "premium_row_last" => rules.premium_row_last = v.clamp(0, i64::from(u32::MAX)) as u32,
            _ => {}
        }
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_overrides() {
        let rows = vec![
            ("tax_rate_bps".to_string(), json!({"value": 1000})),
            ("baggage_rate_per_kg_cents".to_string(), json!({"value": "cheap"})),
            ("premium_row_last".to_string(), json!({"value": 6})),
            ("unknown_rule".to_string(), json!({"value": 1})),
        ];

        let rules = apply_rule_overrides(FareRules::default(), rows);
        assert_eq!(rules.tax_rate_bps, 1000);
        assert_eq!(rules.baggage_rate_per_kg_cents, 500);
        assert_eq!(rules.premium_row_last, 6);
        assert_eq!(rules.premium_row_first, 1);
    }

    #[test]
    fn test_integer_columns_refuse_out_of_range() {
        assert_eq!(int4(180, "seat_capacity").unwrap(), 180);
        assert_eq!(int4(2_147_483_647, "seat_capacity").unwrap(), i32::MAX);

        let err = int4(3_000_000_000, "baggage_kg").unwrap_err();
        assert!(matches!(err, StoreError::Backend(ref m) if m.contains("baggage_kg")));

        assert_eq!(uint4(23, "baggage_kg").unwrap(), 23);
        assert!(uint4(-1_294_967_296, "baggage_kg").is_err());
    }
}
