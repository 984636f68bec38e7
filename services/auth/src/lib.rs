//! Authentication for the OTPFlow console
//!
//! Holds the session provider each browser signs in through, the auth client
//! seam with its in-process and upstream backends, and the route guard that
//! decides which views a session may reach.

pub mod client;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod local;
pub mod models;
pub mod provider;
pub mod remote;
pub mod validation;

pub use client::AuthClient;
pub use error::{AuthError, AuthResult};
pub use guard::{Access, DEFAULT_PATH, LOGIN_PATH, RouteGate, require_session};
pub use local::LocalAuthClient;
pub use models::{LoginCredentials, NewAccount, RegistrationForm, Role, Session, User};
pub use provider::SessionProvider;
pub use remote::RemoteAuthClient;
pub use validation::ValidationErrors;
