//! Session model and related functionality

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Role;

/// An authenticated console session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// Opaque identity token; never sent back to the browser
    #[serde(skip_serializing)]
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
