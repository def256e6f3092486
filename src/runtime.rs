//! Runtime builder and dispatch loop.
//!
//! [`RuntimeBuilder`] provides a fluent API for registering handlers under
//! one of the three calling conventions. [`Runtime::run`] is the process
//! lifetime: pull the next invocation, resolve the handler, execute,
//! submit the outcome, repeat - one invocation in flight at a time.
//!
//! # Example
//!
//! ```ignore
//! use pacer::{HttpSource, Runtime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::from_env()?;
//!
//!     Runtime::builder()
//!         .handle("echo", |event: serde_json::Value, _ctx| {
//!             Ok::<_, pacer::BoxError>(event)
//!         })?
//!         .build(source)
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{BoxError, Result};
use crate::handler::{
    CallbackFn, Completion, DeferredFn, DirectFn, Handler, HandlerRegistry, InvocationContext,
    Outcome,
};
use crate::source::{Invocation, InvocationSource};

/// Builder for configuring and creating a runtime.
///
/// Registration is only possible here, before the dispatch loop starts;
/// [`build`](RuntimeBuilder::build) consumes the registry and freezes it
/// for the life of the process.
#[derive(Default)]
pub struct RuntimeBuilder {
    registry: HandlerRegistry,
}

impl RuntimeBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::new(),
        }
    }

    /// Register a direct-return handler.
    ///
    /// The body runs synchronously and returns its result value, or fails
    /// with an arbitrary error that is captured opaquely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHandler`](crate::Error::DuplicateHandler)
    /// if the name is already bound.
    pub fn handle<F, T, R, E>(mut self, name: &str, body: F) -> Result<Self>
    where
        F: Fn(T, InvocationContext) -> std::result::Result<R, E> + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        R: Serialize + 'static,
        E: Into<BoxError> + 'static,
    {
        self.registry.register(name, Box::new(DirectFn::new(body)))?;
        Ok(self)
    }

    /// Register a deferred-result handler.
    ///
    /// The body returns a future; the runtime awaits it up to the
    /// invocation deadline.
    pub fn handle_deferred<F, T, R, E, Fut>(mut self, name: &str, body: F) -> Result<Self>
    where
        F: Fn(T, InvocationContext) -> Fut + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
        Fut: Future<Output = std::result::Result<R, E>> + Send + 'static,
    {
        self.registry
            .register(name, Box::new(DeferredFn::new(body)))?;
        Ok(self)
    }

    /// Register a callback handler.
    ///
    /// The body receives a [`Completion`] it resolves exactly once, from
    /// anywhere - inline, a spawned task, another thread.
    pub fn handle_callback<F, T, R>(mut self, name: &str, body: F) -> Result<Self>
    where
        F: Fn(T, InvocationContext, Completion<R>) + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
    {
        self.registry
            .register(name, Box::new(CallbackFn::new(body)))?;
        Ok(self)
    }

    /// Register a pre-built handler.
    ///
    /// Escape hatch for custom [`Handler`] implementations that do their
    /// own decoding or encoding.
    pub fn register(mut self, name: &str, handler: Box<dyn Handler>) -> Result<Self> {
        self.registry.register(name, handler)?;
        Ok(self)
    }

    /// Freeze the registry and attach the invocation source.
    pub fn build<S: InvocationSource>(self, source: S) -> Runtime<S> {
        Runtime {
            registry: self.registry,
            source,
        }
    }
}

/// A configured runtime: an immutable handler registry plus the invocation
/// source it serves.
pub struct Runtime<S> {
    registry: HandlerRegistry,
    source: S,
}

impl Runtime<()> {
    /// Create a new runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }
}

impl<S: InvocationSource> Runtime<S> {
    /// Run the dispatch loop until the invocation source fails.
    ///
    /// Each cycle produces exactly one outcome submission, success or
    /// failure - an invocation is never left unanswered. The loop has no
    /// terminal state of its own; the only way out is
    /// [`Error::SourceUnavailable`](crate::Error::SourceUnavailable),
    /// which the caller should treat as fatal and exit non-zero on.
    pub async fn run(mut self) -> Result<()> {
        let names: Vec<&str> = self.registry.names().collect();
        tracing::info!(handlers = ?names, "runtime started");

        loop {
            let invocation = self.source.next().await?;
            self.dispatch(invocation).await?;
        }
    }

    /// Process one invocation and submit its outcome.
    async fn dispatch(&mut self, invocation: Invocation) -> Result<()> {
        let Invocation { context, payload } = invocation;
        let invocation_id = context.invocation_id().to_string();

        tracing::debug!(
            invocation = %invocation_id,
            handler = context.handler_name(),
            "dispatching"
        );

        let outcome = match self.registry.resolve(context.handler_name()) {
            Ok(handler) => handler.call(payload, context).await,
            Err(error) => Outcome::from(error),
        };

        match outcome {
            Outcome::Success(body) => {
                tracing::debug!(invocation = %invocation_id, "invocation succeeded");
                self.source.submit_success(&invocation_id, body).await
            }
            Outcome::Failure(fault) => {
                tracing::warn!(
                    invocation = %invocation_id,
                    kind = %fault.kind,
                    "invocation failed: {}",
                    fault.message
                );
                self.source.submit_failure(&invocation_id, &fault).await
            }
        }
    }
}
