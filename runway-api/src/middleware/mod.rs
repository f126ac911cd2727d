pub mod auth;

pub use auth::{admin_auth_middleware, requester_middleware, Claims, Requester};
