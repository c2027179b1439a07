//! Header-gated handlers.

use std::sync::Arc;

use axum::body::Body;
use futures_util::future::{BoxFuture, FutureExt};

use crate::config::BodyConfig;
use crate::gate::body::DeferredBody;
use crate::gate::guard::{Guard, GuardOutcome};
use crate::gate::reply::Reply;
use crate::gate::view::HeaderView;

/// Outcome of the header phase.
#[derive(Debug)]
pub enum Decision {
    /// A guard denied; this is the whole answer.
    Respond(Reply),
    /// Every guard allowed; the body may now be consumed.
    Consume(DeferredBody),
}

impl Decision {
    /// Second phase: consume the body if the header phase allowed it.
    /// A `Respond` decision never touches `body`.
    pub async fn finish(self, body: Body, config: &BodyConfig) -> Reply {
        match self {
            Decision::Respond(reply) => reply,
            Decision::Consume(deferred) => deferred.consume(body, config).await,
        }
    }
}

/// Anything that can make the header-phase decision.
pub trait HeaderGated: Send + Sync {
    fn decide<'a>(&'a self, header: &'a HeaderView) -> BoxFuture<'a, Decision>;
}

impl<H: HeaderGated + ?Sized> HeaderGated for Arc<H> {
    fn decide<'a>(&'a self, header: &'a HeaderView) -> BoxFuture<'a, Decision> {
        (**self).decide(header)
    }
}

impl<H: HeaderGated + ?Sized> HeaderGated for Box<H> {
    fn decide<'a>(&'a self, header: &'a HeaderView) -> BoxFuture<'a, Decision> {
        (**self).decide(header)
    }
}

/// A guard chain plus the function that picks a body strategy once the
/// chain has allowed.
pub struct GatedHandler<G, B> {
    guard: G,
    build: B,
}

impl<G, B> GatedHandler<G, B>
where
    G: Guard,
    B: Fn(G::Output) -> DeferredBody + Send + Sync,
{
    pub fn new(guard: G, build: B) -> Self {
        Self { guard, build }
    }
}

impl<G, B> HeaderGated for GatedHandler<G, B>
where
    G: Guard,
    B: Fn(G::Output) -> DeferredBody + Send + Sync,
{
    fn decide<'a>(&'a self, header: &'a HeaderView) -> BoxFuture<'a, Decision> {
        async move {
            match self.guard.evaluate(header).await {
                GuardOutcome::Allow(context) => Decision::Consume((self.build)(context)),
                GuardOutcome::Deny(reply) => {
                    tracing::debug!(
                        method = %header.method(),
                        path = header.path(),
                        status = reply.status().as_u16(),
                        "Request denied"
                    );
                    Decision::Respond(reply)
                }
            }
        }
        .boxed()
    }
}
