#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use grocery_relay::config::ConfigV1;
use grocery_relay::routes::create_router;
use grocery_relay::state::AppState;
use grocery_relay::upstream::{AddResult, UpstreamError, UpstreamSession};

pub const TEST_TOKEN: &str = "test-token";

pub const TEST_CONFIG: &str = r#"
token: "test-token"
host: 127.0.0.1
port: 8081
upstream:
  email: cook@example.com
  password: hunter2
  base_url: http://127.0.0.1:9
logging:
  level: "debug"
  format: "json"
"#;

pub fn load_test_config() -> ConfigV1 {
    Figment::new()
        .merge(Yaml::string(TEST_CONFIG))
        .extract()
        .expect("Failed to parse test config YAML")
}

/// How often each upstream operation was invoked.
#[derive(Default)]
pub struct Calls {
    pub login: AtomicUsize,
    pub add: AtomicUsize,
    pub reset: AtomicUsize,
    pub items: Mutex<Vec<String>>,
}

impl Calls {
    pub fn login(&self) -> usize {
        self.login.load(Ordering::SeqCst)
    }

    pub fn add(&self) -> usize {
        self.add.load(Ordering::SeqCst)
    }

    pub fn reset(&self) -> usize {
        self.reset.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.login() + self.add() + self.reset()
    }

    pub fn items(&self) -> Vec<String> {
        self.items.lock().unwrap().clone()
    }
}

/// Upstream double: replays queued answers, then succeeds.
#[derive(Default)]
pub struct FakeUpstream {
    pub calls: Arc<Calls>,
    pub login: VecDeque<Result<(), UpstreamError>>,
    pub add: VecDeque<Result<AddResult, UpstreamError>>,
    pub reset: VecDeque<Result<(), UpstreamError>>,
    /// When set, every `add_query` fails with this error.
    pub add_always: Option<UpstreamError>,
}

#[async_trait]
impl UpstreamSession for FakeUpstream {
    async fn login(&mut self) -> Result<(), UpstreamError> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.login.pop_front().unwrap_or(Ok(()))
    }

    async fn add_query(&mut self, text: &str) -> Result<AddResult, UpstreamError> {
        self.calls.add.fetch_add(1, Ordering::SeqCst);
        self.calls.items.lock().unwrap().push(text.to_string());
        if let Some(e) = &self.add_always {
            return Err(e.clone());
        }
        self.add.pop_front().unwrap_or_else(|| {
            Ok(AddResult {
                result: format!("Added {}", text),
            })
        })
    }

    async fn reset(&mut self) -> Result<(), UpstreamError> {
        self.calls.reset.fetch_add(1, Ordering::SeqCst);
        self.reset.pop_front().unwrap_or(Ok(()))
    }
}

pub fn session_invalid() -> UpstreamError {
    UpstreamError::SessionInvalid("InvalidAuthenticityToken".to_string())
}

pub fn build_app(config: ConfigV1, upstream: FakeUpstream) -> (Router, Arc<Calls>) {
    let calls = upstream.calls.clone();
    let state = AppState::new(Arc::new(config), Box::new(upstream));
    (create_router(state), calls)
}

pub fn request_with_bearer(path: &str, token: &str, method: Method, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn request_without_auth(path: &str, method: Method, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}
