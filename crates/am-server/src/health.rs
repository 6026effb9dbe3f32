//! Health checks
//!
//! `/health` answers as long as the process is up; `/health/ready` also
//! round-trips the database pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub struct HealthChecker {
    pool: PgPool,
    check_timeout: Duration,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            check_timeout: Duration::from_secs(5),
            start_time: Instant::now(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    fn report(&self, status: HealthStatus, components: Vec<ComponentHealth>) -> HealthReport {
        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn liveness(&self) -> HealthReport {
        self.report(HealthStatus::Healthy, Vec::new())
    }

    pub async fn readiness(&self) -> HealthReport {
        let database = self.check_database().await;
        self.report(database.status, vec![database])
    }

    async fn check_database(&self) -> ComponentHealth {
        let start = Instant::now();
        let outcome = tokio::time::timeout(self.check_timeout, am_db::pool::ping(&self.pool)).await;

        let (status, message) = match outcome {
            Ok(Ok(())) => (HealthStatus::Healthy, None),
            Ok(Err(e)) => {
                warn!(error = %e, "database ping failed");
                (HealthStatus::Unhealthy, Some(e.to_string()))
            }
            Err(_) => {
                warn!(timeout = ?self.check_timeout, "database ping timed out");
                (HealthStatus::Unhealthy, Some("timed out".to_string()))
            }
        };

        ComponentHealth {
            name: "database".to_string(),
            status,
            message,
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({
                "poolSize": self.pool.size(),
                "idleConnections": self.pool.num_idle(),
            })),
        }
    }
}

/// GET /health
pub async fn liveness(State(checker): State<Arc<HealthChecker>>) -> Json<HealthReport> {
    Json(checker.liveness())
}

/// GET /health/ready
pub async fn readiness(
    State(checker): State<Arc<HealthChecker>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = checker.readiness().await;
    (report.http_status(), Json(report))
}
