//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use futures_util::StreamExt;
use tower::ServiceExt;

use header_gate::api::{setup_api_router, AppState};
use header_gate::config::{BodyConfig, GateConfig};
use header_gate::gate::MetricsSink;
use header_gate::security::{AuthGuards, Principal};
use header_gate::store::{CredentialStore, Directory, Fixtures, StoreFuture};

/// Sink that keeps every reported duration.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(String, Duration)>>,
}

impl RecordingSink {
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn record_duration(&self, label: &str, elapsed: Duration) {
        self.entries.lock().unwrap().push((label.to_string(), elapsed));
    }
}

/// Credential store over the directory that counts lookups.
pub struct CountingCredentials {
    pub inner: Arc<Directory>,
    pub calls: Arc<AtomicUsize>,
}

impl CredentialStore for CountingCredentials {
    fn resolve_principal<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Principal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_principal(token)
    }
}

/// Demo-data service with instrumented lookups and timing.
pub struct TestApp {
    pub router: Router,
    pub directory: Arc<Directory>,
    pub principal_lookups: Arc<AtomicUsize>,
    pub sink: Arc<RecordingSink>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_body_config(BodyConfig::default())
    }

    pub fn with_body_config(body: BodyConfig) -> Self {
        let config = GateConfig::default();
        let directory = Arc::new(Directory::from_fixtures(Fixtures::demo()).unwrap());
        let principal_lookups = Arc::new(AtomicUsize::new(0));
        let credentials = Arc::new(CountingCredentials {
            inner: directory.clone(),
            calls: principal_lookups.clone(),
        });
        let guards = AuthGuards::from_config(&config.auth, credentials).unwrap();
        let sink = Arc::new(RecordingSink::default());
        let state = AppState::new(directory.clone(), guards, sink.clone(), body);

        Self {
            router: setup_api_router(state),
            directory,
            principal_lookups,
            sink,
        }
    }

    pub fn lookups(&self) -> usize {
        self.principal_lookups.load(Ordering::SeqCst)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        read_response(response).await
    }
}

pub async fn read_response(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("X-SECRET-TOKEN", token);
    }
    builder.body(body).unwrap()
}

/// Body that counts how many times its stream is polled for data.
pub fn counting_body(content: &'static str, polls: Arc<AtomicUsize>) -> Body {
    let stream = futures_util::stream::once(async move { Bytes::from_static(content.as_bytes()) })
        .map(move |chunk| {
            polls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>(chunk)
        });
    Body::from_stream(stream)
}
