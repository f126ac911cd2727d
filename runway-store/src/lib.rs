pub mod app_config;
pub mod database;
pub mod flight_repo;
pub mod memory;
pub mod redis_repo;
pub mod reservation_repo;

pub use database::DbClient;
pub use flight_repo::PgFlightRepository;
pub use memory::InMemoryStore;
pub use redis_repo::RedisClient;
pub use reservation_repo::PgReservationRepository;
