//! Running a gated handler against an axum request.
//!
//! # Responsibilities
//! - Split the request into its head and body stream
//! - Run the header phase with only the head in scope
//! - Hand the body to the deferred consumer only after an allow
//! - Convert the final `Reply` into an axum `Response`
//!
//! # Design Decisions
//! - A denial drops the body unread
//! - The route label feeds request metrics regardless of outcome

use std::time::Instant;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};

use crate::config::BodyConfig;
use crate::gate::{Decision, HeaderGated, HeaderView};
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

/// Two-phase run of `handler` for one request.
pub async fn serve_gated<H>(
    handler: &H,
    route: &str,
    request: Request<Body>,
    body_config: &BodyConfig,
) -> Response
where
    H: HeaderGated + ?Sized,
{
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let view = HeaderView::from_parts(&parts);
    drop(parts);

    let decision = handler.decide(&view).await;
    let deferred = matches!(decision, Decision::Consume(_));
    let reply = decision.finish(body, body_config).await;

    tracing::debug!(
        request_id = view.header(X_REQUEST_ID).unwrap_or("unknown"),
        method = %view.method(),
        path = view.path(),
        route,
        status = reply.status().as_u16(),
        body_consumed = deferred,
        "Gated request finished"
    );
    metrics::record_request(view.method().as_str(), reply.status().as_u16(), route, start);

    reply.into_response()
}
