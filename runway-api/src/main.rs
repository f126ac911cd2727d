use anyhow::Context;
use runway_api::{app, state::{AppState, AuthConfig}};
use runway_booking::ReservationLifecycle;
use runway_catalog::FareCalculator;
use runway_store::{DbClient, PgFlightRepository, PgReservationRepository, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runway_api=debug,runway_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = runway_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting Runway API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let fare_rules = match db.fetch_fare_rules(config.fares.clone()).await {
        Ok(rules) => rules,
        Err(e) => {
            tracing::warn!("Using configured fare rules, business_rules unavailable: {}", e);
            config.fares.clone()
        }
    };

    let redis = match &config.redis {
        Some(redis_config) => match RedisClient::new(&redis_config.url).await {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("Redis unavailable, rate limiting disabled: {}", e);
                None
            }
        },
        None => None,
    };
    let rate_limit_per_minute = config.redis.as_ref().map_or(0, |r| r.rate_limit_per_minute);

    let flights = Arc::new(PgFlightRepository::new(db.pool.clone()));
    let reservations = Arc::new(PgReservationRepository::new(db.pool.clone()));

    // SSE broadcast channel
    let (sse_tx, _) = tokio::sync::broadcast::channel(100);

    let lifecycle = ReservationLifecycle::new(
        flights.clone(),
        reservations,
        FareCalculator::new(fare_rules),
    )
    .with_identifier_attempts(config.booking.identifier_attempts)
    .with_events(sse_tx.clone());

    let app_state = AppState {
        lifecycle: Arc::new(lifecycle),
        flights,
        redis,
        rate_limit_per_minute,
        sse_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
