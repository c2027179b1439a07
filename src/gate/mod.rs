//! Header-gated request pipeline.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → view.rs (HeaderView: method, path, headers; no body)
//!     → guard.rs (Guard chain composed with bind, first Deny wins)
//!     → handler.rs (GatedHandler: Deny → Reply, Allow → DeferredBody)
//!     → body.rs (DeferredBody consumes the body stream once)
//!     → reply.rs (Reply handed back to the transport)
//!
//! timing.rs wraps any HeaderGated handler and reports the elapsed
//! time once the final Reply exists.
//! ```
//!
//! # Design Decisions
//! - Two explicit phases: `decide(header)` then `consume(body)`
//! - Context flows left to right through `bind`, never through shared state
//! - The body strategy is a tagged variant chosen once, after every guard passed
//! - `DeferredBody::consume` takes `self`, so it can run at most once

pub mod body;
pub mod error;
pub mod guard;
pub mod handler;
pub mod reply;
pub mod timing;
pub mod view;

pub use body::{BodyKind, DeferredBody};
pub use error::AccessError;
pub use guard::{bind, from_fn, provide, Bind, BoxGuard, Guard, GuardExt, GuardFuture, GuardOutcome};
pub use handler::{Decision, GatedHandler, HeaderGated};
pub use reply::Reply;
pub use timing::{MetricsSink, Timed};
pub use view::HeaderView;
