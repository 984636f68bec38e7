use std::sync::Arc;
use std::time::Duration;

use api::{
    AppState, create_router,
    models::template::Template,
    repositories::{
        Catalog, StoreError,
        api_keys::LocalApiKeys,
        templates::{LocalTemplates, TemplateDraft, TemplateRepository},
    },
    support::LocalTicketDesk,
    views::Paging,
};
use async_trait::async_trait;
use auth::local::{DEMO_ADMIN_EMAIL, DEMO_PASSWORD, DEMO_USER_EMAIL, LocalAuthClient};
use auth::{AuthClient, AuthResult, LoginCredentials, NewAccount, Session};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::Notify;
use tower::ServiceExt;

fn app_with(auth_client: Arc<dyn AuthClient>, templates: Arc<dyn TemplateRepository>) -> Router {
    let state = AppState::new(
        auth_client,
        Arc::new(LocalTicketDesk::new(Duration::ZERO)),
        templates,
        Arc::new(LocalApiKeys::seeded(Duration::ZERO).unwrap()),
        Catalog::seeded().unwrap(),
        Paging::default(),
    );
    create_router(state)
}

fn demo_auth() -> Arc<dyn AuthClient> {
    Arc::new(LocalAuthClient::with_demo_accounts(Duration::ZERO).unwrap())
}

fn setup_test_app() -> Router {
    app_with(
        demo_auth(),
        Arc::new(LocalTemplates::seeded(Duration::ZERO).unwrap()),
    )
}

/// Holds logins with the right password until released
struct GatedAuth {
    inner: LocalAuthClient,
    parked: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl AuthClient for GatedAuth {
    async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Session> {
        if credentials.password == DEMO_PASSWORD {
            self.parked.notify_one();
            self.release.notified().await;
        }
        self.inner.login(credentials).await
    }

    async fn register(&self, account: &NewAccount) -> AuthResult<Session> {
        self.inner.register(account).await
    }

    async fn request_password_reset(&self, email: &str) -> AuthResult<()> {
        self.inner.request_password_reset(email).await
    }
}

/// Template storage that is always down
struct UnavailableTemplates;

#[async_trait]
impl TemplateRepository for UnavailableTemplates {
    async fn list(&self) -> Result<Vec<Template>, StoreError> {
        Ok(Vec::new())
    }

    async fn create(&self, _draft: &TemplateDraft) -> Result<Template, StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    async fn update(&self, _id: &str, _draft: &TemplateDraft) -> Result<Template, StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
}

/// Helper function to parse response body as JSON
async fn response_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

/// `name=value` pair of the browser cookie set by a response
fn browser_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Missing Set-Cookie header")
        .to_str()
        .unwrap();

    set_cookie.split(';').next().unwrap().to_string()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Missing Location header")
        .to_str()
        .unwrap()
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str, body: Value, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Log in as `email` and return the browser cookie
async fn sign_in(app: &Router, email: &str) -> String {
    let response = post(
        app,
        "/auth/login",
        json!({ "email": email, "password": DEMO_PASSWORD }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    browser_cookie(&response)
}

fn item_ids(body: &Value) -> Vec<&str> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app();

    let response = get(&app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_first_contact_issues_browser_cookie() {
    let app = setup_test_app();

    let response = get(&app, "/auth/session", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(browser_cookie(&response).starts_with("otpflow_sid="));
    assert_eq!(response_json(response).await, Value::Null);
}

#[tokio::test]
async fn test_anonymous_dashboard_redirects_to_login() {
    let app = setup_test_app();

    for uri in ["/dashboard", "/dashboard/logs", "/admin/users"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_login_then_list_logs() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    let session = response_json(get(&app, "/auth/session", Some(&cookie)).await).await;
    assert_eq!(session["email"], DEMO_USER_EMAIL);
    assert_eq!(session["role"], "user");
    assert!(session.get("token").is_none());

    let response = get(&app, "/dashboard/logs", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["active_filters"], 0);
    assert_eq!(item_ids(&body), ["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn test_user_is_redirected_away_from_admin() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    for uri in ["/admin/users", "/admin/templates", "/admin/logs"] {
        let response = get(&app, uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/dashboard");
    }
}

#[tokio::test]
async fn test_admin_reaches_admin_and_dashboard() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_ADMIN_EMAIL).await;

    let response = get(&app, "/admin/users?plan=pro", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(item_ids(&body), ["1", "4"]);
    assert_eq!(body["active_filters"], 1);

    let response = get(&app, "/admin/templates?status=pending", Some(&cookie)).await;
    assert_eq!(item_ids(&response_json(response).await), ["1", "4"]);

    let response = get(&app, "/admin/logs?level=info&category=auth", Some(&cookie)).await;
    assert_eq!(item_ids(&response_json(response).await), ["5"]);

    let response = get(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_filters_and_paging() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    let body = response_json(get(&app, "/dashboard/logs?channel=whatsapp", Some(&cookie)).await).await;
    assert_eq!(item_ids(&body), ["1", "4"]);
    assert_eq!(body["total"], 2);

    let body = response_json(
        get(&app, "/dashboard/logs?cost=low&delivery_time=medium", Some(&cookie)).await,
    )
    .await;
    assert_eq!(item_ids(&body), ["2", "5"]);
    assert_eq!(body["active_filters"], 2);

    let body = response_json(get(&app, "/dashboard/logs?limit=2&page=2", Some(&cookie)).await).await;
    assert_eq!(item_ids(&body), ["3", "4"]);
    assert_eq!(body["total"], 5);

    let body = response_json(
        get(&app, "/dashboard/api-keys?permission=templates,logs", Some(&cookie)).await,
    )
    .await;
    assert_eq!(item_ids(&body), ["1", "2"]);

    let body = response_json(get(&app, "/dashboard/templates?search=CODE", Some(&cookie)).await).await;
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn test_bad_filters_are_rejected() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    for uri in [
        "/dashboard/logs?delivery_time=warp",
        "/dashboard/logs?start=2024-01-20&end=2024-01-10",
        "/dashboard/logs?start=not-a-date",
        "/dashboard/logs?page=first",
    ] {
        let response = get(&app, uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(response_json(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn test_wrong_password_keeps_browser_signed_out() {
    let app = setup_test_app();

    let response = post(
        &app,
        "/auth/login",
        json!({ "email": DEMO_USER_EMAIL, "password": "not the password" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cookie = browser_cookie(&response);
    assert_eq!(
        response_json(response).await["error"],
        "Invalid email or password"
    );

    let session = response_json(get(&app, "/auth/session", Some(&cookie)).await).await;
    assert_eq!(session, Value::Null);
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_ADMIN_EMAIL).await;

    let response = post(
        &app,
        "/auth/login",
        json!({ "email": DEMO_USER_EMAIL, "password": "not the password" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let session = response_json(get(&app, "/auth/session", Some(&cookie)).await).await;
    assert_eq!(session["email"], DEMO_ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = setup_test_app();

    let response = post(&app, "/auth/login", json!({}), None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["fields"]["email"], "Email is required");
    assert_eq!(body["fields"]["password"], "Password is required");
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    for _ in 0..2 {
        let response = post(&app, "/auth/logout", json!({}), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_register_validation_and_success() {
    let app = setup_test_app();

    let response = post(
        &app,
        "/auth/register",
        json!({
            "name": "",
            "email": "nope",
            "password": "short",
            "confirm_password": "other",
            "agree_to_terms": false
        }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["fields"].as_object().unwrap().len(), 5);

    let response = post(
        &app,
        "/auth/register",
        json!({
            "name": "Lisa Chen",
            "email": "lisa@devteam.io",
            "password": "s3cure-pass",
            "confirm_password": "s3cure-pass",
            "company": "DevTeam",
            "agree_to_terms": true
        }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = browser_cookie(&response);
    assert_eq!(response_json(response).await["email"], "lisa@devteam.io");

    let response = get(&app, "/dashboard/templates", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_existing_email_conflicts() {
    let app = setup_test_app();

    let response = post(
        &app,
        "/auth/register",
        json!({
            "name": "Someone Else",
            "email": DEMO_USER_EMAIL,
            "password": "s3cure-pass",
            "confirm_password": "s3cure-pass",
            "agree_to_terms": true
        }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_password() {
    let app = setup_test_app();

    let response = post(
        &app,
        "/auth/reset-password",
        json!({ "email": "nobody@otpflow.io" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = post(&app, "/auth/reset-password", json!({ "email": "nobody" }), None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response_json(response).await["fields"]["email"],
        "Email is invalid"
    );
}

#[tokio::test]
async fn test_support_ticket() {
    let app = setup_test_app();

    let response = post(
        &app,
        "/support/ticket",
        json!({
            "name": "Sarah Johnson",
            "email": "sarah@startup.com",
            "subject": "Invoice missing",
            "category": "billing",
            "message": "January invoice never arrived."
        }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert!(body["ticket_id"].as_str().unwrap().starts_with("TKT-"));
    assert_eq!(body["priority"], "medium");

    let response = post(&app, "/support/ticket", json!({ "category": "billing" }), None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert!(body["fields"].get("category").is_none());
    assert_eq!(body["fields"]["subject"], "Subject is required");
}

#[tokio::test]
async fn test_dashboard_summary() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    let response = get(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["delivered"], 3);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["pending"], 1);
    assert_eq!(body["success_rate"], 60.0);
    assert_eq!(body["average_delivery_secs"], 7.7);
}

#[tokio::test]
async fn test_failed_login_does_not_lose_concurrent_login() {
    let parked = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let auth = GatedAuth {
        inner: LocalAuthClient::with_demo_accounts(Duration::ZERO).unwrap(),
        parked: parked.clone(),
        release: release.clone(),
    };
    let app = app_with(
        Arc::new(auth),
        Arc::new(LocalTemplates::seeded(Duration::ZERO).unwrap()),
    );
    let cookie = browser_cookie(&get(&app, "/auth/session", None).await);

    let good_login = {
        let app = app.clone();
        let cookie = cookie.clone();
        tokio::spawn(async move {
            post(
                &app,
                "/auth/login",
                json!({ "email": DEMO_USER_EMAIL, "password": DEMO_PASSWORD }),
                Some(&cookie),
            )
            .await
            .status()
        })
    };
    parked.notified().await;

    let response = post(
        &app,
        "/auth/login",
        json!({ "email": DEMO_USER_EMAIL, "password": "not the password" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    release.notify_one();
    assert_eq!(good_login.await.unwrap(), StatusCode::OK);

    let session = response_json(get(&app, "/auth/session", Some(&cookie)).await).await;
    assert_eq!(session["email"], DEMO_USER_EMAIL);
    let response = get(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_template_create_and_edit() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    let response = post(
        &app,
        "/dashboard/templates",
        json!({
            "name": "Order Shipped",
            "channel": "sms",
            "message": "Hi {{name}}, use {{code}} to track your order."
        }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    assert_eq!(created["id"], "5");
    assert_eq!(created["status"], "draft");
    assert_eq!(created["variables"], json!(["name", "code"]));

    let request = Request::builder()
        .method("PUT")
        .uri("/dashboard/templates/5")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            json!({
                "name": "Order Shipped",
                "channel": "sms",
                "message": "Code {{code}}",
                "status": "active"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "active");

    let body = response_json(
        get(&app, "/dashboard/templates?channel=sms&status=active", Some(&cookie)).await,
    )
    .await;
    assert_eq!(item_ids(&body), ["3", "5"]);
}

#[tokio::test]
async fn test_template_save_errors() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    let response = post(
        &app,
        "/dashboard/templates",
        json!({ "name": "", "message": "x".repeat(1001) }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["fields"]["name"], "Template name is required");
    assert_eq!(
        body["fields"]["message"],
        "Message must be less than 1000 characters"
    );

    let request = Request::builder()
        .method("PUT")
        .uri("/dashboard/templates/42")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            json!({ "name": "Ghost", "message": "{{code}}" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post(
        &app,
        "/dashboard/templates",
        json!({ "name": "Anonymous", "message": "{{code}}" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_template_storage_down() {
    let app = app_with(demo_auth(), Arc::new(UnavailableTemplates));
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    let response = post(
        &app,
        "/dashboard/templates",
        json!({ "name": "Order Shipped", "message": "Code {{code}}" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_api_key_create_and_revoke() {
    let app = setup_test_app();
    let cookie = sign_in(&app, DEMO_USER_EMAIL).await;

    let response = post(
        &app,
        "/dashboard/api-keys",
        json!({ "name": "CI key", "permissions": ["send", "logs"] }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    assert_eq!(created["id"], "4");
    assert!(created["secret"].as_str().unwrap().starts_with("otpf_live_"));

    let body = response_json(get(&app, "/dashboard/api-keys?status=active", Some(&cookie)).await).await;
    assert_eq!(item_ids(&body), ["1", "2", "4"]);
    assert!(body["items"][2].get("secret").is_none());

    let response = post(&app, "/dashboard/api-keys/4/revoke", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "revoked");

    let body = response_json(get(&app, "/dashboard/api-keys?status=revoked", Some(&cookie)).await).await;
    assert_eq!(item_ids(&body), ["3", "4"]);

    let response = post(&app, "/dashboard/api-keys/99/revoke", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post(&app, "/dashboard/api-keys", json!({ "name": "" }), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
