//! OTPFlow console service
//!
//! Serves the authentication endpoints, the session-gated dashboard listings
//! and the admin-gated listings over HTTP.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod support;
pub mod views;

pub use routes::create_router;
pub use state::AppState;
