//! Console routes

use std::collections::HashMap;

use auth::{
    LoginCredentials, RegistrationForm, Session,
    validation::{ValidationErrors, validate_email, validate_login, validate_registration},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use common::filter::Record;
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    error::ApiResult,
    middleware::{browser_identity, session_guard},
    models::{MessageResponse, PasswordResetRequest},
    repositories::{api_keys::ApiKeyForm, templates::TemplateForm},
    session::BrowserId,
    state::AppState,
    support::TicketForm,
    views::{self, ListingQuery, ViewSpec},
};

/// Create the router for the console service
pub fn create_router(state: AppState) -> Router {
    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard_summary))
        .route("/dashboard/logs", get(delivery_logs))
        .route("/dashboard/templates", get(templates).post(create_template))
        .route("/dashboard/templates/:id", put(update_template))
        .route("/dashboard/api-keys", get(api_keys).post(create_api_key))
        .route("/dashboard/api-keys/:id/revoke", post(revoke_api_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_guard));

    let admin_routes = Router::new()
        .route("/admin/users", get(admin_users))
        .route("/admin/templates", get(review_templates))
        .route("/admin/logs", get(system_logs))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_guard));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
        .route("/auth/reset-password", post(reset_password))
        .route("/support/ticket", post(submit_ticket))
        .merge(dashboard_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(browser_identity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "otpflow-console"
    }))
}

/// Sign the browser in
pub async fn login(
    State(state): State<AppState>,
    Extension(browser): Extension<BrowserId>,
    Json(credentials): Json<LoginCredentials>,
) -> ApiResult<Json<Session>> {
    validate_login(&credentials)?;

    let provider = state.sessions.provider(browser).await;
    let result = provider.login(&credentials).await;
    match result {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            state.sessions.discard_if_anonymous(browser, provider).await;
            Err(e.into())
        }
    }
}

/// Validate the registration form, create the account and sign in as it
pub async fn register(
    State(state): State<AppState>,
    Extension(browser): Extension<BrowserId>,
    Json(form): Json<RegistrationForm>,
) -> ApiResult<impl IntoResponse> {
    validate_registration(&form)?;

    let provider = state.sessions.provider(browser).await;
    let result = provider.register(&form.into_account()).await;
    match result {
        Ok(session) => Ok((StatusCode::CREATED, Json(session))),
        Err(e) => {
            state.sessions.discard_if_anonymous(browser, provider).await;
            Err(e.into())
        }
    }
}

/// Sign the browser out; succeeds when already signed out
pub async fn logout(
    State(state): State<AppState>,
    Extension(browser): Extension<BrowserId>,
) -> Json<MessageResponse> {
    state.sessions.end(browser).await;
    Json(MessageResponse::new("Logged out"))
}

/// Current session of the browser, `null` when signed out
pub async fn current_session(
    State(state): State<AppState>,
    Extension(browser): Extension<BrowserId>,
) -> Json<Option<Session>> {
    Json(state.sessions.current_session(browser).await)
}

/// Request a password reset email
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = ValidationErrors::new();
    errors.check("email", validate_email(&request.email));
    errors.into_result()?;

    state
        .auth_client
        .request_password_reset(request.email.trim())
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new(
            "If an account exists for this email, a reset link is on its way",
        )),
    ))
}

/// Validate and submit a support ticket
pub async fn submit_ticket(
    State(state): State<AppState>,
    Json(form): Json<TicketForm>,
) -> ApiResult<impl IntoResponse> {
    let ticket = form.validate()?;
    let receipt = state.tickets.submit(&ticket).await.inspect_err(|e| {
        warn!("Support ticket from {} not submitted: {}", ticket.email, e);
    })?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Delivery figures for the dashboard home
pub async fn dashboard_summary(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    info!("Dashboard summary for {}", session.email);
    Json(state.catalog.delivery_summary())
}

fn listing<T>(
    spec: &ViewSpec,
    records: &[T],
    params: &HashMap<String, String>,
    state: &AppState,
    session: &Session,
) -> ApiResult<Json<views::ListingResponse<T>>>
where
    T: Record + Clone + Serialize,
{
    let query = ListingQuery::parse(spec, params, state.paging).inspect_err(|e| {
        warn!("Rejected {} query from {}: {}", spec.name, session.email, e);
    })?;

    info!(
        "{} lists {} with {} active filter(s)",
        session.email,
        spec.name,
        query.criteria.active_constraint_count()
    );

    Ok(Json(views::list(spec, records, &query)))
}

/// Filtered delivery logs
pub async fn delivery_logs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    listing(
        &views::DELIVERY_LOGS,
        &state.catalog.delivery_logs,
        &params,
        &state,
        &session,
    )
}

/// Filtered message templates
pub async fn templates(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let templates = state.templates.list().await?;
    listing(&views::TEMPLATES, &templates, &params, &state, &session)
}

/// Validate and save a new template
pub async fn create_template(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(form): Json<TemplateForm>,
) -> ApiResult<impl IntoResponse> {
    let draft = form.validate()?;
    let template = state.templates.create(&draft).await.inspect_err(|e| {
        warn!("Template from {} not saved: {}", session.email, e);
    })?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// Validate and save changes to an existing template
pub async fn update_template(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(form): Json<TemplateForm>,
) -> ApiResult<impl IntoResponse> {
    let draft = form.validate()?;
    let template = state.templates.update(&id, &draft).await.inspect_err(|e| {
        warn!("Template {} from {} not saved: {}", id, session.email, e);
    })?;

    Ok(Json(template))
}

/// Filtered API keys
pub async fn api_keys(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let keys = state.api_keys.list().await?;
    listing(&views::API_KEYS, &keys, &params, &state, &session)
}

/// Create an API key; the response is the only one showing its secret
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(form): Json<ApiKeyForm>,
) -> ApiResult<impl IntoResponse> {
    let key = form.validate()?;
    let created = state.api_keys.create(&key).await?;
    info!("{} created API key {}", session.email, created.key.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// Revoke an API key
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let key = state.api_keys.revoke(&id).await?;
    info!("{} revoked API key {}", session.email, key.id);

    Ok(Json(key))
}

/// Filtered customer accounts
pub async fn admin_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    listing(
        &views::ADMIN_USERS,
        &state.catalog.users,
        &params,
        &state,
        &session,
    )
}

/// Filtered templates awaiting or past review
pub async fn review_templates(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    listing(
        &views::REVIEW_TEMPLATES,
        &state.catalog.review_templates,
        &params,
        &state,
        &session,
    )
}

/// Filtered system logs
pub async fn system_logs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    listing(
        &views::SYSTEM_LOGS,
        &state.catalog.system_logs,
        &params,
        &state,
        &session,
    )
}
