/*!
 * # Staff Session Module
 *
 * Dashboard staff sign in with the single configured admin credential and
 * receive a signed, expiring bearer token. Every protected route validates
 * the token server-side: signature, issuer, audience, expiry and the
 * in-memory revocation list populated by logout.
 */

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Claim structure for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Staff username
    pub name: String, // Display name shown in the dashboard header
    pub jti: String,  // Token id, the revocation key
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated staff member, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub username: String,
    pub display_name: String,
    #[serde(skip)]
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            username: claims.sub,
            display_name: claims.name,
            token_id: claims.jti,
            expires_at,
        }
    }
}

/// Login request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

/// Issued session returned by login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// Session settings derived from [`AppConfig`]
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
    pub admin_username: String,
    pub admin_password_hash: String,
    pub admin_display_name: String,
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            secret: cfg.session_secret.clone(),
            issuer: cfg.session_issuer.clone(),
            audience: cfg.session_audience.clone(),
            ttl: cfg.session_ttl(),
            admin_username: cfg.admin_username.clone(),
            admin_password_hash: cfg.admin_password_hash.clone(),
            admin_display_name: cfg.admin_display_name.clone(),
        }
    }
}

/// Issues and validates staff session tokens
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
    // jti -> exp (unix seconds)
    revoked: Arc<RwLock<HashMap<String, i64>>>,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            revoked: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Checks the credential against the configured admin and issues a session.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, AuthError> {
        if request.username != self.config.admin_username
            || !verify_password(&request.password, &self.config.admin_password_hash)
        {
            warn!(username = %request.username, "Rejected staff login");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue_session(&self.config.admin_username, &self.config.admin_display_name)?;
        info!(username = %session.user.username, expires_at = %session.expires_at, "Staff session issued");
        Ok(session)
    }

    /// Signs a fresh token for the given staff member.
    pub fn issue_session(&self, username: &str, display_name: &str) -> Result<Session, AuthError> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(self.config.ttl)
            .map_err(|_| AuthError::InternalError("Invalid session duration".to_string()))?;
        let expires_at = now + ttl;

        let claims = Claims {
            sub: username.to_string(),
            name: display_name.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(Session {
            token,
            token_type: "Bearer".to_string(),
            expires_in: ttl.num_seconds(),
            expires_at,
            user: AuthUser::from(claims),
        })
    }

    /// Validates signature, issuer, audience, expiry and revocation.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.leeway = 0;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_revoked(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Revokes a session until its natural expiry.
    pub async fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(token_id.to_string(), expires_at.timestamp());
        debug!(token_id, remaining = revoked.len(), "Session revoked");
    }

    async fn is_revoked(&self, token_id: &str) -> bool {
        self.revoked.read().await.contains_key(token_id)
    }
}

/// Hashes a password into an argon2 PHC string.
pub fn hash_password(plain: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

fn verify_password(plain: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Configured admin password hash is unreadable: {}", e);
            false
        }
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Session has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Session has been signed out".to_string(),
            ),
            Self::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "AUTH_INVALID_REQUEST", msg.clone())
            }
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Could not issue session".to_string(),
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = Json(serde_json::json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));
        (status, body).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a valid session and exposes [`AuthUser`] to handlers.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return AuthError::MissingAuth.into_response();
    };

    match auth.validate_token(token).await {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser::from(claims));
            next.run(request).await
        }
        Err(e) => {
            debug!("Rejected session: {}", e);
            e.into_response()
        }
    }
}

/// Extension methods for Router to add session checks
pub trait AuthRouterExt {
    fn with_auth(self, auth: Arc<AuthService>) -> Self;
}

impl<S> AuthRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self, auth: Arc<AuthService>) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(auth, auth_middleware))
    }
}

/// Login, logout and session routes, mounted under `/auth`.
pub fn auth_routes<S>(auth: Arc<AuthService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let protected = Router::new()
        .route("/logout", post(logout_handler))
        .route("/session", get(session_handler))
        .with_auth(auth.clone());

    Router::new()
        .route("/login", post(login_handler))
        .merge(protected)
        .layer(DefaultBodyLimit::max(1024 * 16))
        .with_state(auth)
}

/// Sign in with the staff credential
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = Session),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth): State<Arc<AuthService>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<Session>, AuthError> {
    credentials
        .validate()
        .map_err(|e| AuthError::InvalidRequest(e.to_string()))?;
    auth.login(&credentials).await.map(Json)
}

/// End the current session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout_handler(
    State(auth): State<Arc<AuthService>>,
    user: AuthUser,
) -> StatusCode {
    auth.revoke(&user.token_id, user.expires_at).await;
    info!(username = %user.username, "Staff signed out");
    StatusCode::NO_CONTENT
}

/// Describe the current session
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Signed-in staff member", body = AuthUser),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn session_handler(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::Body;
    use tower::ServiceExt;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            secret: "unit_test_session_secret_with_enough_entropy_42".into(),
            issuer: "bakehouse-api".into(),
            audience: "bakehouse-dashboard".into(),
            ttl: Duration::from_secs(3600),
            admin_username: "staff".into(),
            admin_password_hash: hash_password("bakery-pass").unwrap(),
            admin_display_name: "Front Counter".into(),
        })
    }

    fn credentials(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn login_issues_validatable_session() {
        let auth = service();
        let session = auth.login(&credentials("staff", "bakery-pass")).await.unwrap();
        assert_eq!(session.token_type, "Bearer");
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.user.display_name, "Front Counter");

        let claims = auth.validate_token(&session.token).await.unwrap();
        assert_eq!(claims.sub, "staff");
        assert_eq!(claims.aud, "bakehouse-dashboard");
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_user() {
        let auth = service();
        assert_matches!(
            auth.login(&credentials("staff", "nope")).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_matches!(
            auth.login(&credentials("owner", "bakery-pass")).await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn revoked_session_is_rejected() {
        let auth = service();
        let session = auth.issue_session("staff", "Staff").unwrap();
        auth.revoke(&session.user.token_id, session.expires_at).await;
        assert_matches!(
            auth.validate_token(&session.token).await,
            Err(AuthError::RevokedToken)
        );
    }

    #[tokio::test]
    async fn expired_session_is_rejected() {
        let auth = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "staff".into(),
            name: "Staff".into(),
            jti: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
            iss: "bakehouse-api".into(),
            aud: "bakehouse-dashboard".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit_test_session_secret_with_enough_entropy_42"),
        )
        .unwrap();
        assert_matches!(auth.validate_token(&token).await, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let auth = service();
        let mut other_cfg = auth.config.clone();
        other_cfg.secret = "a_completely_different_secret_value_0123456789".into();
        let forged = AuthService::new(other_cfg).issue_session("staff", "Staff").unwrap();
        assert_matches!(
            auth.validate_token(&forged.token).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[tokio::test]
    async fn protected_route_requires_session() {
        let auth = Arc::new(service());
        let app: Router = Router::new()
            .route("/secret", get(|user: AuthUser| async move { user.username }))
            .with_auth(auth.clone());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/secret").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let session = auth.issue_session("staff", "Staff").unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/secret")
                    .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
