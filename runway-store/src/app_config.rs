use runway_catalog::FareRules;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Absent means no rate limiting.
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub fares: FareRules,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    #[serde(default = "default_identifier_attempts")]
    pub identifier_attempts: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            identifier_attempts: default_identifier_attempts(),
        }
    }
}

fn default_identifier_attempts() -> u32 { 20 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: i64,
}

fn default_rate_limit() -> i64 { 120 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `RUNWAY__DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("RUNWAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize")
    }

    #[test]
    fn test_optional_sections_default() {
        let cfg = from_toml(
            r#"
            [server]
            port = 3000
            [database]
            url = "postgres://localhost/runway"
            [auth]
            jwt_secret = "secret"
            "#,
        );

        assert!(cfg.redis.is_none());
        assert_eq!(cfg.fares, FareRules::default());
        assert_eq!(cfg.booking.identifier_attempts, 20);
    }

    #[test]
    fn test_fare_overrides_are_partial() {
        let cfg = from_toml(
            r#"
            [server]
            port = 3000
            [database]
            url = "postgres://localhost/runway"
            [redis]
            url = "redis://127.0.0.1/"
            [auth]
            jwt_secret = "secret"
            [fares]
            tax_rate_bps = 1000
            [booking]
            identifier_attempts = 5
            "#,
        );

        assert_eq!(cfg.fares.tax_rate_bps, 1000);
        assert_eq!(cfg.fares.baggage_rate_per_kg_cents, 500);
        assert_eq!(cfg.redis.map(|r| r.rate_limit_per_minute), Some(120));
        assert_eq!(cfg.booking.identifier_attempts, 5);
    }
}
