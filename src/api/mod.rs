//! API module
//!
//! HTTP endpoints and middleware around the visit engine.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::engine::VisitEngine;
use crate::geo::RegionResolver;

pub use routes::create_router;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<VisitEngine>,
    pub regions: Arc<RegionResolver>,
    /// Take the visitor key from X-Forwarded-For
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(engine: Arc<VisitEngine>, regions: Arc<RegionResolver>) -> Self {
        Self {
            engine,
            regions,
            trust_forwarded_for: false,
        }
    }

    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

/// Build the application router with middleware applied
pub fn build_app(state: AppState) -> Router {
    // Axum layers are applied in reverse order (last added = first executed)
    // Order: request id -> trace -> propagate id -> visit context -> logging -> handler
    create_router()
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::visit_context_middleware,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
