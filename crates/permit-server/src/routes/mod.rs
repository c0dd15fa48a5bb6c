//! HTTP routes.
//!
//! # Pages
//! GET  /                       - Home
//! GET  /login, POST /login     - Login form
//! GET  /register, POST /register - Registration form
//! POST /logout                 - End session
//! GET  /members                - Renewal price (member only)
//! GET  /checkout               - Pay button (member only, after /members)
//! GET  /payment-success        - Stripe success landing
//! GET  /payment-cancelled      - Stripe cancel landing
//!
//! # API
//! POST /create-stripe-payment  - Create a hosted checkout session
//! POST /webhook/stripe         - Stripe event intake
//! GET  /health                 - Liveness
//! GET  /health/ready           - Database readiness
//!
//! Anything else is looked up in the public directory.

mod auth;
mod health;
mod members;
mod pages;
mod payments;

use std::path::Path;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::middleware::security_headers_middleware;
use crate::state::AppState;

/// Build the application router (without the session layer).
pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/members", get(members::members))
        .route("/checkout", get(members::checkout))
        .route("/payment-success", get(pages::payment_success))
        .route("/payment-cancelled", get(pages::payment_cancelled))
        .route("/create-stripe-payment", post(payments::create_stripe_payment))
        .route("/webhook/stripe", post(payments::stripe_webhook))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .fallback_service(ServeDir::new(public_dir))
        .layer(middleware::from_fn(security_headers_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, Response, StatusCode, header},
    };
    use secrecy::SecretString;
    use tower::ServiceExt;
    use tower_sessions_sqlx_store::SqliteStore;

    use permit_core::{
        CredentialStore, GatewayError, MemoryCredentialStore, MockPaymentGateway, PaymentGateway,
    };

    use super::*;
    use crate::config::{AppConfig, DEFAULT_PUBLIC_DIR};
    use crate::middleware::with_session_layer;

    const PASSWORD: &str = "correct horse";

    fn test_config() -> AppConfig {
        AppConfig {
            db_path: ":memory:".into(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".into(),
            session_secret: SecretString::from(
                "k3Jv9xQ2mW7pL4tR8nY1cB6hF0dS5gA2zX7vN3qE9wU4iO1pK8jM6lH2bT5rC0yG".to_owned(),
            ),
            secure_cookie: false,
            public_dir: DEFAULT_PUBLIC_DIR.into(),
        }
    }

    async fn app_with(
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> (Router, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let state = AppState::new(
            store.clone(),
            gateway,
            Some(SecretString::from("whsec_test".to_owned())),
        );

        let session_store = SqliteStore::new(crate::db::memory_pool().await);
        session_store.migrate().await.unwrap();

        let config = test_config();
        let app = with_session_layer(router(state, &config.public_dir), session_store, &config)
            .unwrap();

        (app, store)
    }

    async fn app() -> (Router, Arc<MemoryCredentialStore>) {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(MockPaymentGateway::new());
        app_with(Some(gateway)).await
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn location(response: &Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("session cookie");
        set_cookie.split(';').next().unwrap().to_owned()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn register(app: &Router, first_name: &str, email: &str, permit_type: &str) {
        let body = format!(
            "firstName={}&lastName=Lovelace&email={}&password={}&permitType={}",
            urlencoding::encode(first_name),
            urlencoding::encode(email),
            urlencoding::encode(PASSWORD),
            urlencoding::encode(permit_type),
        );
        let response = app
            .clone()
            .oneshot(form_request("/register", &body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/login"));
    }

    async fn login(app: &Router, email: &str) -> String {
        let body = format!(
            "email={}&password={}",
            urlencoding::encode(email),
            urlencoding::encode(PASSWORD)
        );
        let response = app
            .clone()
            .oneshot(form_request("/login", &body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/members");
        session_cookie(&response)
    }

    #[tokio::test]
    async fn test_members_then_checkout_for_visiting_adult() {
        let (app, _store) = app().await;
        register(&app, "Ada", "ada@example.com", "Visiting Adult").await;
        let cookie = login(&app, "ada@example.com").await;

        let members = app
            .clone()
            .oneshot(get_request("/members", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(members.status(), StatusCode::OK);
        let html = body_text(members).await;
        assert!(html.contains("100.00"));
        assert!(html.contains("Visiting Adult"));

        let checkout = app
            .clone()
            .oneshot(get_request("/checkout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(checkout.status(), StatusCode::OK);
        let html = body_text(checkout).await;
        assert!(html.contains("100.00"));
        assert!(html.contains(r#"data-amount="10000""#));
    }

    #[tokio::test]
    async fn test_checkout_before_members_is_bad_request() {
        let (app, _store) = app().await;
        register(&app, "Ada", "ada@example.com", "Local Adult").await;
        let cookie = login(&app, "ada@example.com").await;

        let response = app
            .oneshot(get_request("/checkout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Error: Renewal price not available.");
    }

    #[tokio::test]
    async fn test_members_requires_login() {
        let (app, _store) = app().await;

        let response = app.oneshot(get_request("/members", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let (app, _store) = app().await;
        register(&app, "Ada", "ada@example.com", "Local Senior").await;
        let cookie = login(&app, "ada@example.com").await;

        let response = app
            .clone()
            .oneshot(form_request("/logout", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");

        let response = app
            .oneshot(get_request("/members", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_duplicate_registration_redirects_with_message() {
        let (app, store) = app().await;
        register(&app, "Ada", "ada@example.com", "Local Adult").await;

        let body = "firstName=Eve&lastName=Lovelace&email=ada%40example.com&password=another+pass&permitType=Local+Senior";
        let response = app
            .oneshot(form_request("/register", body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register?message=User%20already%20exists.");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_wrong_password_redirects_to_login() {
        let (app, _store) = app().await;
        register(&app, "Ada", "ada@example.com", "Local Adult").await;

        let response = app
            .oneshot(form_request(
                "/login",
                "email=ada%40example.com&password=wrong+password",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(
            location(&response),
            "/login?message=Incorrect%20email%20address%20or%20password."
        );
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_markup_stripped_from_member_name() {
        let (app, _store) = app().await;
        register(&app, "<script>alert(1)</script>Eve", "eve@example.com", "Local Adult").await;
        let cookie = login(&app, "eve@example.com").await;

        let response = app
            .clone()
            .oneshot(get_request("/members", Some(&cookie)))
            .await
            .unwrap();
        let html = body_text(response).await;

        assert!(html.contains("Eve"));
        assert!(!html.contains("alert(1)"));
        assert!(html.contains("40.00"));

        let response = app
            .oneshot(get_request("/checkout", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;

        assert!(!html.contains("alert(1)"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"data-first-name="Eve""#));
        assert!(html.contains(r#"data-amount="4000""#));
    }

    #[tokio::test]
    async fn test_create_payment_returns_only_session_id() {
        let (app, _store) = app().await;

        let response = app
            .oneshot(json_request(
                "/create-stripe-payment",
                r#"{"amount":4000,"email":"x@y.com","firstName":"Ada","lastName":"Lovelace"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object["id"].as_str().unwrap().starts_with("cs_test_"));
    }

    #[tokio::test]
    async fn test_create_payment_validation_errors() {
        let (app, _store) = app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "/create-stripe-payment",
                r#"{"amount":"0","email":"x@y.com","firstName":"Ada","lastName":"Lovelace"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Invalid amount."));

        let response = app
            .clone()
            .oneshot(json_request(
                "/create-stripe-payment",
                r#"{"amount":2000,"email":"not-an-email"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Invalid or missing email address."));

        let response = app
            .oneshot(json_request("/create-stripe-payment", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Invalid request."));
    }

    #[tokio::test]
    async fn test_create_payment_gateway_failures() {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(MockPaymentGateway::failing(
            GatewayError::ProviderApi("upstream 503".into()),
        ));
        let (app, _store) = app_with(Some(gateway)).await;
        let payload = r#"{"amount":4000,"email":"x@y.com","firstName":"Ada","lastName":"Lovelace"}"#;

        let response = app
            .oneshot(json_request("/create-stripe-payment", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(!body_text(response).await.contains("upstream"));

        let (app, _store) = app_with(None).await;
        let response = app
            .oneshot(json_request("/create-stripe-payment", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_webhook_requires_signature() {
        let (app, _store) = app().await;

        let response = app
            .clone()
            .oneshot(json_request("/webhook/stripe", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = Request::post("/webhook/stripe")
            .header("stripe-signature", "t=1,v1=deadbeef")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_security_headers_and_health() {
        let (app, store) = app().await;

        let response = app
            .clone()
            .oneshot(get_request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert!(
            response.headers()["content-security-policy"]
                .to_str()
                .unwrap()
                .contains("script-src 'self'")
        );

        let response = app
            .oneshot(get_request("/health/ready", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_static_files_served() {
        let (app, _store) = app().await;

        let response = app
            .clone()
            .oneshot(get_request("/checkout.js", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request("/does-not-exist.txt", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
