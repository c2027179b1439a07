//! Inventory service routes.
//!
//! Every route builds its guard chain for the path parameters it received,
//! picks a body strategy once the chain allows, and runs through
//! [`serve_gated`] wrapped in a [`Timed`] decorator.

pub mod inventory;
pub mod users;

use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    response::Response,
    routing::{get, post, put},
    Router,
};

use crate::config::BodyConfig;
use crate::gate::{HeaderGated, MetricsSink, Timed};
use crate::http::serve_gated;
use crate::security::AuthGuards;
use crate::store::Directory;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub guards: AuthGuards,
    pub sink: Arc<dyn MetricsSink>,
    pub body: BodyConfig,
}

impl AppState {
    pub fn new(
        directory: Arc<Directory>,
        guards: AuthGuards,
        sink: Arc<dyn MetricsSink>,
        body: BodyConfig,
    ) -> Self {
        Self {
            directory,
            guards,
            sink,
            body,
        }
    }

    /// Time and run `handler` for `request`.
    pub async fn serve<H: HeaderGated>(&self, label: &str, handler: H, request: Request<Body>) -> Response {
        let timed = Timed::new(handler, label, self.sink.clone());
        serve_gated(&timed, label, request, &self.body).await
    }
}

pub fn setup_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/users/{id}",
            get(users::get_user).put(users::update_user),
        )
        .route("/inventory", post(inventory::create_item))
        .route(
            "/inventory/{id}",
            get(inventory::get_item)
                .put(inventory::update_item)
                .delete(inventory::delete_item),
        )
        .route("/inventory/{id}/manifest", put(inventory::upload_manifest))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
