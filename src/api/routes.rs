//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{Period, StatsReport, VisitContext};
use crate::error::{AppError, AppResult};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub period: Option<String>,
}

impl StatsQuery {
    /// Parse the requested period; no parameter means the overall total
    pub fn period(&self) -> Result<Period, AppError> {
        match self.period.as_deref() {
            None => Ok(Period::default()),
            Some(token) => Ok(token.parse::<Period>()?),
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/stats", get(stats))
        .route("/health", get(health_check))
        .route("/admin/flush", post(flush))
}

// =========================================================================
// GET /
// =========================================================================

/// Count the visit and greet the visitor with the running total
async fn index(
    State(state): State<AppState>,
    Extension(context): Extension<VisitContext>,
) -> String {
    // Resolve outside the engine lock so lookup latency never blocks others
    let region = state.regions.resolve(&context.visitor_key).await;

    if state
        .engine
        .record(&context.visitor_key, Some(region.as_str()))
        .await
        .is_err()
    {
        tracing::warn!(
            correlation_id = ?context.correlation_id,
            "Visit acknowledged without being persisted"
        );
    }

    let total = state
        .engine
        .query(Period::Total)
        .await
        .as_total()
        .map_or(0, |stat| stat.total);

    format!("Hello World! Visit count: {}", total)
}

// =========================================================================
// GET /stats
// =========================================================================

/// Visit statistics for one period
async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatsReport>> {
    let period = query.period()?;
    Ok(Json(state.engine.query(period).await))
}

// =========================================================================
// POST /admin/flush
// =========================================================================

/// Write the in-memory counts to the snapshot file now
///
/// Recovers from an earlier failed save without waiting for the next visit.
async fn flush(
    State(state): State<AppState>,
    Extension(context): Extension<VisitContext>,
) -> AppResult<StatusCode> {
    state.engine.flush().await?;

    tracing::info!(
        correlation_id = ?context.correlation_id,
        path = %state.engine.store().path().display(),
        "Snapshot flushed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
