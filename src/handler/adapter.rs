//! Calling-convention adapters.
//!
//! Handler bodies come in three shapes:
//!
//! - direct return: a synchronous function that returns a result or fails
//! - deferred result: a function returning a future that resolves or
//!   rejects on some executor
//! - callback: a function handed a [`Completion`] it resolves exactly once
//!
//! Each adapter wraps one shape and converges on the [`Handler`] contract,
//! so the dispatch loop never branches on the convention. The deferred and
//! callback adapters bound their wait by the invocation deadline; expiry
//! produces a `HandlerTimeoutError` failure outcome instead of hanging the
//! loop. Timed-out work is abandoned, not cancelled - the process is
//! single-invocation-scoped and gets replaced after faults.

use std::future::Future;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::timeout_at;

use crate::codec::JsonCodec;
use crate::error::{BoxError, Error};

use super::{BoxFuture, Handler, InvocationContext, Outcome};

/// Encode a successful handler result, reporting serialization failures
/// as `EncodeError` outcomes rather than dropping them.
fn encode_outcome<R: Serialize>(value: &R) -> Outcome {
    match JsonCodec::encode(value) {
        Ok(body) => Outcome::Success(Bytes::from(body)),
        Err(error) => Outcome::from(error),
    }
}

/// Adapter for the direct-return convention.
///
/// The body is synchronous: it returns a result value or fails with an
/// arbitrary error, which is captured opaquely.
pub struct DirectFn<F, T, R, E> {
    body: F,
    _marker: PhantomData<fn(T) -> (R, E)>,
}

impl<F, T, R, E> DirectFn<F, T, R, E>
where
    F: Fn(T, InvocationContext) -> std::result::Result<R, E> + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + 'static,
    E: Into<BoxError> + 'static,
{
    /// Wrap a direct-return body.
    pub fn new(body: F) -> Self {
        Self {
            body,
            _marker: PhantomData,
        }
    }
}

impl<F, T, R, E> Handler for DirectFn<F, T, R, E>
where
    F: Fn(T, InvocationContext) -> std::result::Result<R, E> + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + 'static,
    E: Into<BoxError> + 'static,
{
    fn call(&self, payload: Bytes, ctx: InvocationContext) -> BoxFuture<'static, Outcome> {
        let outcome = match JsonCodec::decode::<T>(&payload) {
            Ok(event) => match (self.body)(event, ctx) {
                Ok(value) => encode_outcome(&value),
                Err(cause) => Outcome::from(Error::HandlerExecution(cause.into())),
            },
            Err(error) => Outcome::from(error),
        };
        Box::pin(std::future::ready(outcome))
    }
}

/// Adapter for the deferred-result convention.
///
/// The body returns a future; the adapter awaits it up to the invocation
/// deadline.
pub struct DeferredFn<F, T, Fut> {
    body: F,
    _marker: PhantomData<fn(T) -> Fut>,
}

impl<F, T, Fut> DeferredFn<F, T, Fut> {
    /// Wrap a deferred-result body.
    pub fn new(body: F) -> Self {
        Self {
            body,
            _marker: PhantomData,
        }
    }
}

impl<F, T, R, E, Fut> Handler for DeferredFn<F, T, Fut>
where
    F: Fn(T, InvocationContext) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
    Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
{
    fn call(&self, payload: Bytes, ctx: InvocationContext) -> BoxFuture<'static, Outcome> {
        let event = match JsonCodec::decode::<T>(&payload) {
            Ok(event) => event,
            Err(error) => return Box::pin(std::future::ready(Outcome::from(error))),
        };

        let deadline = ctx.deadline();
        let handler_name = ctx.handler_name().to_string();
        let fut = (self.body)(event, ctx);

        Box::pin(async move {
            match timeout_at(deadline, fut).await {
                Ok(Ok(value)) => encode_outcome(&value),
                Ok(Err(cause)) => Outcome::from(Error::HandlerExecution(cause.into())),
                Err(_) => Outcome::from(Error::HandlerTimeout(handler_name)),
            }
        })
    }
}

/// Single-fire result handle passed to callback-convention handlers.
///
/// The handle is cheap to clone and may be moved into spawned tasks or
/// threads. The first call to [`succeed`](Completion::succeed) or
/// [`fail`](Completion::fail) is authoritative; later calls are ignored
/// with a warning. Built on a capacity-1 channel, so no locking is
/// involved.
pub struct Completion<R> {
    tx: mpsc::Sender<std::result::Result<R, BoxError>>,
}

impl<R> Clone for Completion<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<R> Completion<R> {
    /// Create a completion handle and the receiver its adapter waits on.
    fn channel() -> (Self, mpsc::Receiver<std::result::Result<R, BoxError>>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Resolve the invocation with a success value.
    pub fn succeed(&self, value: R) {
        self.deliver(Ok(value));
    }

    /// Resolve the invocation with a failure.
    pub fn fail(&self, error: impl Into<BoxError>) {
        self.deliver(Err(error.into()));
    }

    fn deliver(&self, result: std::result::Result<R, BoxError>) {
        // First call wins: a second try_send observes a full (or already
        // closed) channel and is discarded.
        if self.tx.try_send(result).is_err() {
            tracing::warn!("completion already resolved; extra call ignored");
        }
    }
}

/// Adapter for the callback convention.
///
/// The body is invoked with the event, the context, and a [`Completion`];
/// the adapter waits for the completion to fire, bounded by the invocation
/// deadline.
pub struct CallbackFn<F, T, R> {
    body: F,
    _marker: PhantomData<fn(T) -> R>,
}

impl<F, T, R> CallbackFn<F, T, R>
where
    F: Fn(T, InvocationContext, Completion<R>) + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
{
    /// Wrap a callback body.
    pub fn new(body: F) -> Self {
        Self {
            body,
            _marker: PhantomData,
        }
    }
}

impl<F, T, R> Handler for CallbackFn<F, T, R>
where
    F: Fn(T, InvocationContext, Completion<R>) + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
{
    fn call(&self, payload: Bytes, ctx: InvocationContext) -> BoxFuture<'static, Outcome> {
        let event = match JsonCodec::decode::<T>(&payload) {
            Ok(event) => event,
            Err(error) => return Box::pin(std::future::ready(Outcome::from(error))),
        };

        let deadline = ctx.deadline();
        let handler_name = ctx.handler_name().to_string();
        let (completion, mut rx) = Completion::channel();
        (self.body)(event, ctx, completion);

        Box::pin(async move {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some(Ok(value))) => encode_outcome(&value),
                Ok(Some(Err(cause))) => Outcome::from(Error::HandlerExecution(cause)),
                // Every completion handle was dropped without a result; the
                // callback can never fire, so there is nothing to wait for.
                Ok(None) => Outcome::from(Error::HandlerTimeout(handler_name)),
                Err(_) => Outcome::from(Error::HandlerTimeout(handler_name)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Fault};
    use std::time::Duration;

    fn ctx_with_budget(budget: Duration) -> InvocationContext {
        InvocationContext::with_budget("inv-test", "under-test", budget)
    }

    fn expect_fault(outcome: Outcome) -> Fault {
        match outcome {
            Outcome::Failure(fault) => fault,
            Outcome::Success(body) => {
                panic!("expected failure, got success: {:?}", body)
            }
        }
    }

    #[tokio::test]
    async fn test_direct_success() {
        let handler = DirectFn::new(|event: serde_json::Value, _ctx| {
            Ok::<_, BoxError>(event)
        });

        let outcome = handler
            .call(Bytes::from_static(br#"{"msg":"hi"}"#), ctx_with_budget(Duration::from_secs(1)))
            .await;

        match outcome {
            Outcome::Success(body) => {
                let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
                assert_eq!(value["msg"], "hi");
            }
            Outcome::Failure(fault) => panic!("unexpected failure: {fault}"),
        }
    }

    #[tokio::test]
    async fn test_direct_body_error_is_opaque() {
        let handler = DirectFn::new(|_event: serde_json::Value, _ctx| {
            Err::<serde_json::Value, _>(std::io::Error::other("disk on fire"))
        });

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_secs(1)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::HandlerExecutionError);
        assert!(fault.message.contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_direct_decode_failure() {
        #[derive(serde::Deserialize)]
        struct Event {
            #[allow(dead_code)]
            count: i32,
        }

        let handler =
            DirectFn::new(|event: Event, _ctx| Ok::<_, BoxError>(event.count));

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"not json"), ctx_with_budget(Duration::from_secs(1)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::DecodeError);
    }

    #[tokio::test]
    async fn test_direct_encode_failure_is_reported() {
        let handler = DirectFn::new(|_event: serde_json::Value, _ctx| {
            let mut map = std::collections::HashMap::new();
            map.insert((1u8, 2u8), 3u8);
            Ok::<_, BoxError>(map)
        });

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_secs(1)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::EncodeError);
    }

    #[tokio::test]
    async fn test_deferred_success() {
        let handler = DeferredFn::new(|event: serde_json::Value, _ctx| async move {
            Ok::<_, BoxError>(event)
        });

        let outcome = handler
            .call(Bytes::from_static(br#"{"n":1}"#), ctx_with_budget(Duration::from_secs(1)))
            .await;

        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_deferred_rejection_carries_cause() {
        let handler = DeferredFn::new(|_event: serde_json::Value, _ctx| async move {
            Err::<serde_json::Value, _>("db down".to_string())
        });

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_secs(1)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::HandlerExecutionError);
        assert!(fault.message.contains("db down"));
    }

    #[tokio::test]
    async fn test_deferred_deadline_expiry() {
        let handler = DeferredFn::new(|_event: serde_json::Value, _ctx| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, BoxError>(serde_json::Value::Null)
        });

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_millis(20)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::HandlerTimeoutError);
    }

    #[tokio::test]
    async fn test_callback_success() {
        let handler = CallbackFn::new(|event: serde_json::Value, _ctx, done: Completion<serde_json::Value>| {
            done.succeed(event);
        });

        let outcome = handler
            .call(Bytes::from_static(br#"{"ok":true}"#), ctx_with_budget(Duration::from_secs(1)))
            .await;

        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_callback_from_spawned_task() {
        let handler = CallbackFn::new(|event: serde_json::Value, _ctx, done: Completion<serde_json::Value>| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                done.succeed(event);
            });
        });

        let outcome = handler
            .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_secs(1)))
            .await;

        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_callback_first_call_wins() {
        // Mirrors a body that resolves the failure path and then falls
        // through to also resolve success: the first call is authoritative.
        let handler = CallbackFn::new(|_event: serde_json::Value, _ctx, done: Completion<serde_json::Value>| {
            done.fail("invalid event");
            done.succeed(serde_json::Value::Null);
        });

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_secs(1)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::HandlerExecutionError);
        assert!(fault.message.contains("invalid event"));
    }

    #[tokio::test]
    async fn test_callback_double_success_keeps_first_value() {
        let handler = CallbackFn::new(|_event: serde_json::Value, _ctx, done: Completion<i32>| {
            done.succeed(1);
            done.succeed(2);
        });

        let outcome = handler
            .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_secs(1)))
            .await;

        match outcome {
            Outcome::Success(body) => assert_eq!(&body[..], b"1"),
            Outcome::Failure(fault) => panic!("unexpected failure: {fault}"),
        }
    }

    #[tokio::test]
    async fn test_callback_dropped_without_result() {
        let handler =
            CallbackFn::new(|_event: serde_json::Value, _ctx, _done: Completion<i32>| {
                // Completion dropped without being resolved.
            });

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_secs(5)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::HandlerTimeoutError);
    }

    #[tokio::test]
    async fn test_callback_never_fires_hits_deadline() {
        let handler =
            CallbackFn::new(|_event: serde_json::Value, _ctx, done: Completion<i32>| {
                // Keep the handle alive forever without resolving it.
                std::mem::forget(done);
            });

        let fault = expect_fault(
            handler
                .call(Bytes::from_static(b"{}"), ctx_with_budget(Duration::from_millis(30)))
                .await,
        );

        assert_eq!(fault.kind, ErrorKind::HandlerTimeoutError);
    }
}
