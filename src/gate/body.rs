//! Deferred body consumption.
//!
//! # Responsibilities
//! - Hold the business closure chosen after every guard passed
//! - Read the body stream once, with the configured size limit
//! - Turn decode and size failures into 400/413 replies
//!
//! # Design Decisions
//! - Strategy is a closed enum (no-body, structured, raw), fixed at construction
//! - `consume` takes `self`; a consumer cannot be invoked twice
//! - Dropping an unconsumed `DeferredBody` runs nothing

use std::future::Future;

use axum::body::{Body, Bytes};
use futures_util::future::{BoxFuture, FutureExt};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;

use crate::config::{BodyConfig, UnexpectedBodyPolicy};
use crate::gate::error::AccessError;
use crate::gate::reply::Reply;

/// Which strategy a [`DeferredBody`] was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    NoBody,
    Structured,
    Raw,
}

type Run<I> = Box<dyn FnOnce(I) -> BoxFuture<'static, Reply> + Send>;
type Decode = Box<dyn FnOnce(Bytes) -> Result<BoxFuture<'static, Reply>, AccessError> + Send>;
type Completion = Box<dyn FnOnce(&Reply) + Send>;

enum Strategy {
    NoBody(Run<()>),
    Structured(Decode),
    Raw(Run<Body>),
}

/// Business closure bound to the context of a fully authorized request,
/// waiting for the body.
pub struct DeferredBody {
    strategy: Strategy,
    completions: Vec<Completion>,
}

impl DeferredBody {
    fn from_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            completions: Vec::new(),
        }
    }

    /// For read and delete style operations.
    pub fn no_body<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Reply> + Send + 'static,
    {
        Self::from_strategy(Strategy::NoBody(Box::new(move |()| f().boxed())))
    }

    /// Decode the body as JSON into `T` before running `f`.
    /// `f` never runs when decoding fails.
    pub fn structured<T, F, Fut>(f: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Reply> + Send + 'static,
    {
        Self::from_strategy(Strategy::Structured(Box::new(move |bytes: Bytes| {
            let value: T = serde_json::from_slice(&bytes)
                .map_err(|e| AccessError::BodyDecodeFailure(e.to_string()))?;
            Ok(f(value).boxed())
        })))
    }

    /// Hand the unparsed body stream to `f`.
    pub fn raw<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Body) -> Fut + Send + 'static,
        Fut: Future<Output = Reply> + Send + 'static,
    {
        Self::from_strategy(Strategy::Raw(Box::new(move |body| f(body).boxed())))
    }

    pub fn kind(&self) -> BodyKind {
        match self.strategy {
            Strategy::NoBody(_) => BodyKind::NoBody,
            Strategy::Structured(_) => BodyKind::Structured,
            Strategy::Raw(_) => BodyKind::Raw,
        }
    }

    /// Register a callback that sees the final reply.
    pub fn on_complete(mut self, f: impl FnOnce(&Reply) + Send + 'static) -> Self {
        self.completions.push(Box::new(f));
        self
    }

    /// Run the strategy against the body stream.
    pub async fn consume(self, body: Body, config: &BodyConfig) -> Reply {
        let reply = match self.strategy {
            Strategy::NoBody(run) => match config.unexpected_body {
                UnexpectedBodyPolicy::Ignore => {
                    drop(body);
                    run(()).await
                }
                UnexpectedBodyPolicy::Reject => match read_body(body, config.max_body_size).await {
                    Ok(bytes) if bytes.is_empty() => run(()).await,
                    Ok(bytes) => {
                        tracing::debug!(len = bytes.len(), "Rejecting body sent to no-body route");
                        AccessError::UnexpectedBody.into()
                    }
                    Err(err) => err.into(),
                },
            },
            Strategy::Structured(decode) => {
                match read_body(body, config.max_body_size).await.and_then(decode) {
                    Ok(run) => run.await,
                    Err(err) => {
                        tracing::debug!(reason = err.reason(), error = %err, "Body rejected");
                        err.into()
                    }
                }
            }
            Strategy::Raw(run) => run(body).await,
        };

        for done in self.completions {
            done(&reply);
        }
        reply
    }
}

impl std::fmt::Debug for DeferredBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredBody")
            .field("kind", &self.kind())
            .field("completions", &self.completions.len())
            .finish()
    }
}

/// Collect the body, refusing anything over `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, AccessError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.is::<LengthLimitError>() => Err(AccessError::BodyTooLarge),
        Err(err) => Err(AccessError::BodyDecodeFailure(err.to_string())),
    }
}
