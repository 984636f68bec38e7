//! Browser identity and route gating middleware

use auth::{Access, RouteGate};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, info};

use crate::session::{BrowserId, SESSION_COOKIE};
use crate::state::AppState;

/// Attach a [`BrowserId`] to every request, issuing the cookie on first contact
pub async fn browser_identity(jar: CookieJar, mut req: Request, next: Next) -> Response {
    let known = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| BrowserId::parse(cookie.value()));

    let (browser, jar) = match known {
        Some(browser) => (browser, jar),
        None => {
            let browser = BrowserId::generate();
            debug!("Issuing browser id {}", browser.0);
            let cookie = Cookie::build((SESSION_COOKIE, browser.0.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (browser, jar.add(cookie))
        }
    };

    req.extensions_mut().insert(browser);
    let response = next.run(req).await;

    (jar, response).into_response()
}

/// Gate `/dashboard` and `/admin` routes by session and role
///
/// Denied requests are redirected; granted ones carry the [`auth::Session`]
/// in their extensions.
pub async fn session_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let session = match req.extensions().get::<BrowserId>().copied() {
        Some(browser) => state.sessions.current_session(browser).await,
        None => None,
    };

    match RouteGate::for_path(&path).check(session.as_ref()) {
        Access::Granted => {
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
        Access::Redirect(target) => {
            info!("Redirecting {} to {}", path, target);
            Redirect::to(target).into_response()
        }
    }
}
