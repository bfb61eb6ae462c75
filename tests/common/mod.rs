//! Shared harness for the HTTP integration tests.
//!
//! Every `TestApp` gets its own SQLite file in a temp directory, runs the
//! migrations, builds the full router and signs in as the staff account.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use bakehouse_api::{
    auth::hash_password,
    build_router,
    config::AppConfig,
    db::{establish_connection, run_migrations},
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const STAFF_USERNAME: &str = "staff";
pub const STAFF_PASSWORD: &str = "bakery-pass";

/// Decoded response: status plus the JSON body (`Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    token: String,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for sqlite");
        let db_path = db_dir.path().join("bakehouse-test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let mut config = AppConfig::new(
            database_url.clone(),
            "integration_session_secret_0123456789_abcdefghijklm".to_string(),
            STAFF_USERNAME.to_string(),
            hash_password(STAFF_PASSWORD).expect("hash staff password"),
            "127.0.0.1".to_string(),
            18080,
            "development".to_string(),
        );
        config.auto_migrate = true;
        config.cors_allow_any_origin = true;

        let db = establish_connection(&database_url)
            .await
            .expect("connect to test database");
        run_migrations(&db).await.expect("run migrations");

        let state = AppState::new(Arc::new(db), config);
        let router = build_router(state.clone()).expect("build router");

        let mut app = Self {
            router,
            state,
            token: String::new(),
            _db_dir: db_dir,
        };

        let login = app
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({ "username": STAFF_USERNAME, "password": STAFF_PASSWORD })),
                None,
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "staff login failed: {}", login.body);
        app.token = login.body["token"]
            .as_str()
            .expect("login returns a token")
            .to_string();
        app
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, Some(self.token())).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(self.token()))
            .await
    }

    pub async fn post_empty(&self, uri: &str) -> TestResponse {
        self.request(Method::POST, uri, None, Some(self.token())).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), Some(self.token()))
            .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, Some(self.token()))
            .await
    }

    /// Creates a product through the API and returns its id.
    pub async fn create_product(&self, product: Value) -> String {
        let response = self.post("/api/v1/products", product).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "product creation failed: {}",
            response.body
        );
        response.body["data"]["id"]
            .as_str()
            .expect("product id")
            .to_string()
    }

    /// Creates an order through the API and returns its id.
    pub async fn create_order(&self, order: Value) -> String {
        let response = self.post("/api/v1/orders", order).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "order creation failed: {}",
            response.body
        );
        response.body["data"]["order"]["id"]
            .as_str()
            .expect("order id")
            .to_string()
    }
}

/// Parses a decimal that the API serialized as a string.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| panic!("expected a decimal string, got {}", value))
}
