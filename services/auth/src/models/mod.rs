//! Authentication models

pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use role::{ParseRoleError, Role};
pub use session::Session;
pub use user::{LoginCredentials, NewAccount, RegistrationForm, User};
