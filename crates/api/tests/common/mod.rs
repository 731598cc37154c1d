#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use hookecho_api::config::ServerConfig;
use hookecho_api::router::build_app_router;
use hookecho_api::state::AppState;
use hookecho_core::clock::FixedClock;
use hookecho_events::delivery::DEFAULT_DELIVERY_TIMEOUT;
use hookecho_events::{CallbackScheduler, DeferredDelivery};
use hookecho_store::FileCallbackStore;

/// Frozen test time: 2024-01-01T01:23:45.000Z.
pub const FROZEN_MS: i64 = 1_704_072_225_000;

/// Scheduler that records deliveries instead of running them.
#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<DeferredDelivery>>,
}

impl RecordingScheduler {
    pub fn scheduled(&self) -> Vec<DeferredDelivery> {
        self.scheduled.lock().unwrap().clone()
    }
}

impl CallbackScheduler for RecordingScheduler {
    fn schedule(&self, delivery: DeferredDelivery) {
        self.scheduled.lock().unwrap().push(delivery);
    }
}

/// Everything a test needs to drive the app and inspect its side effects.
pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
    pub clock: Arc<FixedClock>,
    pub scheduler: Arc<RecordingScheduler>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` with safe defaults, storing callbacks in `dir`.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        callback_dir: dir.path().to_path_buf(),
        callback_delay: Duration::from_secs(15),
        callback_timeout: DEFAULT_DELIVERY_TIMEOUT,
    }
}

/// Build the full application router over a fresh temp directory, a frozen
/// clock and a recording scheduler.
pub fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let clock = Arc::new(FixedClock::new(FROZEN_MS));
    let scheduler = Arc::new(RecordingScheduler::default());
    let store = FileCallbackStore::new(config.callback_dir.clone(), clock.clone());

    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(store),
        scheduler: scheduler.clone(),
        clock: clock.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        dir,
        clock,
        scheduler,
    }
}

/// Send a request through the router.
pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

/// GET `uri`.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// POST `body` as JSON to `uri`.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with no body and no content type.
pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
