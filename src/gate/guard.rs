//! Guards and the combinator that chains them.
//!
//! A guard looks at the request head and either allows with a derived value
//! or denies with a finished [`Reply`]. Guards never subclass each other;
//! the only way to layer them is [`bind`] (or [`GuardExt::and_then`]), which
//! feeds the value produced by one guard into the construction of the next.

use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::gate::error::AccessError;
use crate::gate::reply::Reply;
use crate::gate::view::HeaderView;

/// Result of evaluating one guard.
#[derive(Debug)]
pub enum GuardOutcome<T> {
    Allow(T),
    Deny(Reply),
}

impl<T> GuardOutcome<T> {
    pub fn deny(err: AccessError) -> Self {
        GuardOutcome::Deny(err.into())
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, GuardOutcome::Allow(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GuardOutcome<U> {
        match self {
            GuardOutcome::Allow(value) => GuardOutcome::Allow(f(value)),
            GuardOutcome::Deny(reply) => GuardOutcome::Deny(reply),
        }
    }

    pub fn into_result(self) -> Result<T, Reply> {
        match self {
            GuardOutcome::Allow(value) => Ok(value),
            GuardOutcome::Deny(reply) => Err(reply),
        }
    }
}

impl<T> From<Result<T, AccessError>> for GuardOutcome<T> {
    fn from(result: Result<T, AccessError>) -> Self {
        match result {
            Ok(value) => GuardOutcome::Allow(value),
            Err(err) => GuardOutcome::deny(err),
        }
    }
}

pub type GuardFuture<'a, T> = BoxFuture<'a, GuardOutcome<T>>;

/// A header-only authorization check.
///
/// Implementations must not hold request state of their own and must not
/// mutate the collaborators they close over.
pub trait Guard: Send + Sync {
    /// Context handed to the next layer on success.
    type Output: Send + 'static;

    fn evaluate<'a>(&'a self, header: &'a HeaderView) -> GuardFuture<'a, Self::Output>;
}

pub type BoxGuard<T> = Box<dyn Guard<Output = T>>;

impl<G: Guard + ?Sized> Guard for Box<G> {
    type Output = G::Output;

    fn evaluate<'a>(&'a self, header: &'a HeaderView) -> GuardFuture<'a, Self::Output> {
        (**self).evaluate(header)
    }
}

impl<G: Guard + ?Sized> Guard for Arc<G> {
    type Output = G::Output;

    fn evaluate<'a>(&'a self, header: &'a HeaderView) -> GuardFuture<'a, Self::Output> {
        (**self).evaluate(header)
    }
}

/// Run `first`; on allow, build the next guard from its value and run that.
pub fn bind<G, F, N>(first: G, next: F) -> Bind<G, F>
where
    G: Guard,
    F: Fn(G::Output) -> N + Send + Sync,
    N: Guard + 'static,
{
    Bind { first, next }
}

/// See [`bind`].
pub struct Bind<G, F> {
    first: G,
    next: F,
}

impl<G, F, N> Guard for Bind<G, F>
where
    G: Guard,
    F: Fn(G::Output) -> N + Send + Sync,
    N: Guard + 'static,
{
    type Output = N::Output;

    fn evaluate<'a>(&'a self, header: &'a HeaderView) -> GuardFuture<'a, Self::Output> {
        async move {
            match self.first.evaluate(header).await {
                GuardOutcome::Allow(value) => {
                    let next = (self.next)(value);
                    next.evaluate(header).await
                }
                GuardOutcome::Deny(reply) => GuardOutcome::Deny(reply),
            }
        }
        .boxed()
    }
}

/// Transforms the allowed value without another check.
pub struct Map<G, F> {
    inner: G,
    f: F,
}

impl<G, F, U> Guard for Map<G, F>
where
    G: Guard,
    F: Fn(G::Output) -> U + Send + Sync,
    U: Send + 'static,
{
    type Output = U;

    fn evaluate<'a>(&'a self, header: &'a HeaderView) -> GuardFuture<'a, U> {
        self.inner
            .evaluate(header)
            .map(move |outcome| outcome.map(&self.f))
            .boxed()
    }
}

/// Guard backed by a synchronous closure.
pub struct FromFn<F> {
    f: F,
}

pub fn from_fn<F, T>(f: F) -> FromFn<F>
where
    F: Fn(&HeaderView) -> GuardOutcome<T> + Send + Sync,
    T: Send + 'static,
{
    FromFn { f }
}

impl<F, T> Guard for FromFn<F>
where
    F: Fn(&HeaderView) -> GuardOutcome<T> + Send + Sync,
    T: Send + 'static,
{
    type Output = T;

    fn evaluate<'a>(&'a self, header: &'a HeaderView) -> GuardFuture<'a, T> {
        future::ready((self.f)(header)).boxed()
    }
}

/// Always allows with a clone of the given value.
pub struct Provide<T> {
    value: T,
}

pub fn provide<T>(value: T) -> Provide<T>
where
    T: Clone + Send + Sync + 'static,
{
    Provide { value }
}

impl<T> Guard for Provide<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn evaluate<'a>(&'a self, _header: &'a HeaderView) -> GuardFuture<'a, T> {
        future::ready(GuardOutcome::Allow(self.value.clone())).boxed()
    }
}

/// Chaining helpers available on every guard.
pub trait GuardExt: Guard + Sized {
    fn and_then<F, N>(self, next: F) -> Bind<Self, F>
    where
        F: Fn(Self::Output) -> N + Send + Sync,
        N: Guard + 'static,
    {
        bind(self, next)
    }

    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> U + Send + Sync,
        U: Send + 'static,
    {
        Map { inner: self, f }
    }

    fn boxed(self) -> BoxGuard<Self::Output>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<G: Guard> GuardExt for G {}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn view() -> HeaderView {
        HeaderView::new(Method::GET, "/", HeaderMap::new())
    }

    /// Allows with `value + 1` or denies with `status`, counting calls.
    struct Step {
        calls: Arc<AtomicUsize>,
        value: u32,
        deny: Option<StatusCode>,
    }

    impl Guard for Step {
        type Output = u32;

        fn evaluate<'a>(&'a self, _header: &'a HeaderView) -> GuardFuture<'a, u32> {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                match self.deny {
                    Some(status) => GuardOutcome::Deny(Reply::text(status, "denied")),
                    None => GuardOutcome::Allow(self.value + 1),
                }
            }
            .boxed()
        }
    }

    fn step(calls: &Arc<AtomicUsize>, value: u32, deny: Option<StatusCode>) -> Step {
        Step {
            calls: calls.clone(),
            value,
            deny,
        }
    }

    #[tokio::test]
    async fn test_bind_threads_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c2 = calls.clone();
        let c3 = calls.clone();
        let chain = step(&calls, 0, None)
            .and_then(move |a| step(&c2, a * 10, None))
            .and_then(move |b| step(&c3, b * 10, None));

        match chain.evaluate(&view()).await {
            GuardOutcome::Allow(value) => assert_eq!(value, 111),
            GuardOutcome::Deny(reply) => panic!("unexpected deny: {:?}", reply),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_deny_short_circuits_inner_layers() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));
        let (s, t) = (second.clone(), third.clone());

        let chain = step(&first, 0, None)
            .and_then(move |a| step(&s, a, Some(StatusCode::FORBIDDEN)))
            .and_then(move |b| step(&t, b, None));

        match chain.evaluate(&view()).await {
            GuardOutcome::Deny(reply) => assert_eq!(reply.status(), StatusCode::FORBIDDEN),
            GuardOutcome::Allow(_) => panic!("chain should deny"),
        }
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bind_is_associative() {
        for deny_at in [None, Some(0), Some(1), Some(2)] {
            let status = |i: u16| {
                (deny_at == Some(i)).then(|| StatusCode::from_u16(400 + i).unwrap())
            };
            let (s0, s1, s2) = (status(0), status(1), status(2));

            let left_calls = Arc::new(AtomicUsize::new(0));
            let (l2, l3) = (left_calls.clone(), left_calls.clone());
            let left = bind(
                bind(step(&left_calls, 1, s0), move |a| step(&l2, a * 2, s1)),
                move |b| step(&l3, b * 3, s2),
            );

            let right_calls = Arc::new(AtomicUsize::new(0));
            let (r2, r3) = (right_calls.clone(), right_calls.clone());
            let right = bind(step(&right_calls, 1, s0), move |a| {
                let r3 = r3.clone();
                bind(step(&r2, a * 2, s1), move |b| step(&r3, b * 3, s2))
            });

            let header = view();
            let (l, r) = (left.evaluate(&header).await, right.evaluate(&header).await);
            match (l, r) {
                (GuardOutcome::Allow(a), GuardOutcome::Allow(b)) => assert_eq!(a, b),
                (GuardOutcome::Deny(a), GuardOutcome::Deny(b)) => {
                    assert_eq!(a.status(), b.status())
                }
                _ => panic!("outcomes diverged for deny_at={:?}", deny_at),
            }
            assert_eq!(
                left_calls.load(Ordering::SeqCst),
                right_calls.load(Ordering::SeqCst)
            );
        }
    }

    #[tokio::test]
    async fn test_map_and_from_fn() {
        let guard = from_fn(|header: &HeaderView| match header.header("x-user") {
            Some(user) => GuardOutcome::Allow(user.to_string()),
            None => GuardOutcome::deny(AccessError::MissingCredential),
        })
        .map(|user| user.len());

        match guard.evaluate(&view()).await {
            GuardOutcome::Deny(reply) => assert_eq!(reply.status(), StatusCode::UNAUTHORIZED),
            GuardOutcome::Allow(_) => panic!("missing header must deny"),
        }

        let mut headers = HeaderMap::new();
        headers.insert("x-user", "alice".parse().unwrap());
        let header = HeaderView::new(Method::GET, "/", headers);
        assert!(matches!(guard.evaluate(&header).await, GuardOutcome::Allow(5)));
    }

    #[tokio::test]
    async fn test_boxed_guards_compose() {
        let guard: BoxGuard<u32> = provide(20u32).and_then(|n| provide(n + 1)).boxed();
        let shared = Arc::new(guard);
        assert!(matches!(shared.evaluate(&view()).await, GuardOutcome::Allow(21)));
    }

    #[test]
    fn test_outcome_from_result() {
        let allowed: GuardOutcome<u8> = Ok(1).into();
        assert!(allowed.is_allow());
        let denied: GuardOutcome<u8> = Err(AccessError::ResourceNotFound).into();
        assert_eq!(denied.into_result().unwrap_err().status(), StatusCode::NOT_FOUND);
    }
}
