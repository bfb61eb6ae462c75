/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - status, version and uptime
 * - Liveness check (`/health/live`) - the process is serving requests
 * - Readiness check (`/health/ready`) - the database answers a ping
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ReadinessInfo {
    pub ready: bool,
    pub database: HealthStatus,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct HealthState {
    pub db_pool: Arc<DatabaseConnection>,
    pub start_time: Instant,
}

impl HealthState {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    async fn database_status(&self) -> HealthStatus {
        match self.db_pool.ping().await {
            Ok(()) => HealthStatus::Up,
            Err(e) => {
                error!("Database health check failed: {}", e);
                HealthStatus::Down
            }
        }
    }
}

/// Liveness plus build information
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthInfo)),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check endpoint called");
    Json(HealthInfo {
        status: HealthStatus::Up,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime(),
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Process is alive")),
    tag = "health"
)]
pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "alive": true,
        "uptime_seconds": state.uptime(),
        "timestamp": Utc::now(),
    }))
}

/// Ready once the database answers
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database reachable", body = ReadinessInfo),
        (status = 503, description = "Database unreachable", body = ReadinessInfo)
    ),
    tag = "health"
)]
pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let started = Instant::now();
    let database = state.database_status().await;
    let info = ReadinessInfo {
        ready: database == HealthStatus::Up,
        database,
        latency_ms: started.elapsed().as_millis() as u64,
        timestamp: Utc::now(),
    };

    let status_code = if info.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(info))
}

/// Health routes, mounted under `/health`
pub fn health_routes<S>(db_pool: Arc<DatabaseConnection>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
        .route("/ready", get(readiness_check))
        .with_state(Arc::new(HealthState::new(db_pool)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn readiness_reports_database_up() {
        let db = Arc::new(crate::db::memory_pool().await);
        let app: Router = health_routes(db);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let info: ReadinessInfo = serde_json::from_slice(&body).unwrap();
        assert!(info.ready);
        assert_eq!(info.database, HealthStatus::Up);
    }
}
