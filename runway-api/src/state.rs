use runway_booking::ReservationLifecycle;
use runway_core::FlightRepository;
use runway_shared::ReservationEvent;
use runway_store::RedisClient;
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<ReservationLifecycle>,
    pub flights: Arc<dyn FlightRepository>,
    /// None disables rate limiting
    pub redis: Option<Arc<RedisClient>>,
    pub rate_limit_per_minute: i64,
    pub sse_tx: broadcast::Sender<ReservationEvent>,
    pub auth: AuthConfig,
}
