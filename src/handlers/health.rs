use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use sqlx::PgPool;

use crate::database::DatabaseManager;
use crate::middleware::ApiResponse;

/// GET /health - liveness plus a database ping
pub async fn get(State(pool): State<PgPool>) -> ApiResponse {
    let now = Utc::now();

    match DatabaseManager::health_check(&pool).await {
        Ok(()) => ApiResponse::ok()
            .field("message", "Available!!!")
            .field("database", "ok")
            .field("timestamp", now),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiResponse::with_status(StatusCode::SERVICE_UNAVAILABLE)
                .field("message", "database unavailable")
                .field("database", "degraded")
                .field("timestamp", now)
        }
    }
}
