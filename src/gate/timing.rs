//! Elapsed-time decorator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt};

use crate::gate::handler::{Decision, HeaderGated};
use crate::gate::view::HeaderView;

/// Destination for handler durations.
pub trait MetricsSink: Send + Sync {
    fn record_duration(&self, label: &str, elapsed: Duration);
}

/// Wraps a handler and reports how long each request took, from the start
/// of the header phase until the final reply exists.
///
/// For deferred requests the clock stops after body consumption. A deferred
/// body that is dropped unconsumed reports nothing.
pub struct Timed<H> {
    inner: H,
    label: Arc<str>,
    sink: Arc<dyn MetricsSink>,
}

impl<H: HeaderGated> Timed<H> {
    pub fn new(inner: H, label: impl Into<Arc<str>>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            inner,
            label: label.into(),
            sink,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<H: HeaderGated> HeaderGated for Timed<H> {
    fn decide<'a>(&'a self, header: &'a HeaderView) -> BoxFuture<'a, Decision> {
        let start = Instant::now();
        async move {
            match self.inner.decide(header).await {
                Decision::Respond(reply) => {
                    self.sink.record_duration(&self.label, start.elapsed());
                    Decision::Respond(reply)
                }
                Decision::Consume(deferred) => {
                    let sink = self.sink.clone();
                    let label = self.label.clone();
                    Decision::Consume(deferred.on_complete(move |_| {
                        sink.record_duration(&label, start.elapsed());
                    }))
                }
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyConfig;
    use crate::gate::body::DeferredBody;
    use crate::gate::error::AccessError;
    use crate::gate::guard::{Guard, GuardFuture, GuardOutcome};
    use crate::gate::handler::GatedHandler;
    use crate::gate::reply::Reply;
    use axum::body::Body;
    use axum::http::{HeaderMap, Method, StatusCode};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded(Mutex<Vec<(String, Duration)>>);

    impl MetricsSink for Recorded {
        fn record_duration(&self, label: &str, elapsed: Duration) {
            self.0.lock().unwrap().push((label.to_string(), elapsed));
        }
    }

    struct Slow {
        delay: Duration,
        deny: bool,
    }

    impl Guard for Slow {
        type Output = ();

        fn evaluate<'a>(&'a self, _header: &'a HeaderView) -> GuardFuture<'a, ()> {
            async move {
                tokio::time::sleep(self.delay).await;
                if self.deny {
                    GuardOutcome::deny(AccessError::InsufficientPermission)
                } else {
                    GuardOutcome::Allow(())
                }
            }
            .boxed()
        }
    }

    fn view() -> HeaderView {
        HeaderView::new(Method::PUT, "/items/1", HeaderMap::new())
    }

    #[tokio::test]
    async fn test_duration_covers_guards_and_body() {
        let sink = Arc::new(Recorded::default());
        let guard_delay = Duration::from_millis(30);
        let body_delay = Duration::from_millis(40);

        let handler = Timed::new(
            GatedHandler::new(
                Slow {
                    delay: guard_delay,
                    deny: false,
                },
                move |()| {
                    DeferredBody::no_body(move || async move {
                        tokio::time::sleep(body_delay).await;
                        Reply::ok()
                    })
                },
            ),
            "items.update",
            sink.clone(),
        );

        let outer = Instant::now();
        let decision = handler.decide(&view()).await;
        assert!(sink.0.lock().unwrap().is_empty(), "must not report before body");

        let reply = decision.finish(Body::empty(), &BodyConfig::default()).await;
        let measured_outside = outer.elapsed();
        assert_eq!(reply.status(), StatusCode::OK);

        let recorded = sink.0.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        let (label, elapsed) = &recorded[0];
        assert_eq!(label, "items.update");
        assert!(*elapsed >= guard_delay + body_delay);
        assert!(*elapsed <= measured_outside);
    }

    #[tokio::test]
    async fn test_denial_reported_and_passed_through() {
        let sink = Arc::new(Recorded::default());
        let handler = Timed::new(
            GatedHandler::new(
                Slow {
                    delay: Duration::from_millis(5),
                    deny: true,
                },
                |()| DeferredBody::no_body(|| async { Reply::ok() }),
            ),
            "items.delete",
            sink.clone(),
        );

        match handler.decide(&view()).await {
            Decision::Respond(reply) => {
                assert_eq!(reply.status(), StatusCode::FORBIDDEN);
                assert_eq!(reply.body_text(), "Insufficient Permission");
            }
            Decision::Consume(_) => panic!("denied chain must respond"),
        }
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unconsumed_body_reports_nothing() {
        let sink = Arc::new(Recorded::default());
        let handler = Timed::new(
            GatedHandler::new(
                Slow {
                    delay: Duration::ZERO,
                    deny: false,
                },
                |()| DeferredBody::no_body(|| async { Reply::ok() }),
            ),
            "items.get",
            sink.clone(),
        );

        drop(handler.decide(&view()).await);
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
