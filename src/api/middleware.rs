//! API Middleware
//!
//! Visitor identification and request logging.

use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::VisitContext;

use super::AppState;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =========================================================================
// Visitor Context Middleware
// =========================================================================

/// Build the visit context for a request
///
/// The forwarded header wins only when the proxy in front is trusted;
/// otherwise the peer address is used.
pub fn visit_context_from(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> VisitContext {
    let forwarded = if trust_forwarded_for {
        headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    } else {
        None
    };

    let context = match (forwarded, peer) {
        (Some(key), _) => VisitContext::new().with_visitor_key(key),
        (None, Some(ip)) => VisitContext::new().with_client_ip(ip),
        (None, None) => VisitContext::new(),
    };

    let correlation_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4);

    context.with_correlation_id(correlation_id)
}

/// Attach a `VisitContext` extension to every request
pub async fn visit_context_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let context = visit_context_from(request.headers(), peer, state.trust_forwarded_for);
    request.extensions_mut().insert(context);

    next.run(request).await
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

/// Request logging middleware
pub async fn logging_middleware(
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    // Mask sensitive headers
    let headers = mask_headers_for_logging(request.headers());

    let (correlation_id, visitor_key) = request
        .extensions()
        .get::<VisitContext>()
        .map(|ctx| (ctx.correlation_id, Some(ctx.visitor_key.clone())))
        .unwrap_or((None, None));

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = ?correlation_id,
        visitor_key = ?visitor_key,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
