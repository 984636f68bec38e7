//! Route guard deciding whether a view may render for a session

use tracing::debug;

use crate::models::{Role, Session};

/// Unauthenticated entry point
pub const LOGIN_PATH: &str = "/login";
/// Default destination for sessions lacking a required role
pub const DEFAULT_PATH: &str = "/dashboard";

const DASHBOARD_PREFIX: &str = "/dashboard";
const ADMIN_PREFIX: &str = "/admin";

/// Outcome of a guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(&'static str),
}

/// Gate every session needs to clear to reach a route
///
/// Without a session the caller is sent to [`LOGIN_PATH`]. A session whose
/// role does not satisfy `required` is sent to [`DEFAULT_PATH`].
pub fn require_session(session: Option<&Session>, required: Option<Role>) -> Access {
    let Some(session) = session else {
        return Access::Redirect(LOGIN_PATH);
    };

    match required {
        Some(role) if !session.role.satisfies(role) => {
            debug!(
                "{} with role {} lacks required role {}",
                session.email, session.role, role
            );
            Access::Redirect(DEFAULT_PATH)
        }
        _ => Access::Granted,
    }
}

/// Route groups and the gate each one applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGate {
    /// Marketing, auth and support pages
    Public,
    /// `/dashboard` and below: any session
    Session,
    /// `/admin` and below: admin sessions only
    Admin,
}

impl RouteGate {
    pub fn for_path(path: &str) -> Self {
        if under(path, ADMIN_PREFIX) {
            RouteGate::Admin
        } else if under(path, DASHBOARD_PREFIX) {
            RouteGate::Session
        } else {
            RouteGate::Public
        }
    }

    pub fn check(self, session: Option<&Session>) -> Access {
        match self {
            RouteGate::Public => Access::Granted,
            RouteGate::Session => require_session(session, None),
            RouteGate::Admin => require_session(session, Some(Role::Admin)),
        }
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
