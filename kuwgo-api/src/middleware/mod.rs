pub mod auth;

pub use auth::{admin_auth_middleware, Caller, CallerClaims, ADMIN_ROLE};
