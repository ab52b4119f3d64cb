//! Common test utilities

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use visit_counter::api::{self, AppState};
use visit_counter::{RegionResolver, VisitEngine, VisitStore};

/// Build the full app over a snapshot in `dir`, with region lookup disabled
pub async fn setup_app(dir: &Path, trust_forwarded_for: bool) -> (Router, Arc<VisitEngine>) {
    let store = VisitStore::new(dir.join("visits.json"));
    let engine = Arc::new(VisitEngine::open(store).await.expect("Failed to open engine"));

    (app_for(engine.clone(), trust_forwarded_for), engine)
}

/// Build the full app around an existing engine, with region lookup disabled
pub fn app_for(engine: Arc<VisitEngine>, trust_forwarded_for: bool) -> Router {
    let state = AppState::new(engine, Arc::new(RegionResolver::disabled()))
        .with_trust_forwarded_for(trust_forwarded_for);
    api::build_app(state)
}

/// Send a bodiless request and return the raw response
pub async fn send(app: &Router, method: &str, uri: &str, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

/// GET `uri` as if sent from `peer`, optionally with extra headers
pub async fn get(
    app: &Router,
    uri: &str,
    peer: Option<&str>,
    headers: &[(&str, &str)],
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut req = builder.body(Body::empty()).unwrap();

    if let Some(peer) = peer {
        let addr: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
    }

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

/// GET `uri` and parse the body as JSON
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(app, uri, None, &[]).await;
    (status, serde_json::from_slice(&body).expect("Response is not JSON"))
}
