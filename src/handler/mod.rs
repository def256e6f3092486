//! Handler module - registration, calling conventions, and dispatch.
//!
//! Provides:
//! - [`HandlerRegistry`] - maps handler names to registered handlers
//! - [`InvocationContext`] - per-invocation metadata passed to handlers
//! - [`DirectFn`], [`DeferredFn`], [`CallbackFn`] - adapters that normalize
//!   the three calling conventions into the [`Handler`] contract
//! - [`Completion`] - single-fire result handle for callback handlers
//!
//! The dispatch loop only ever sees the unified [`Handler`] contract; the
//! convention a body was written against is erased here at registration
//! time.
//!
//! # Example
//!
//! ```ignore
//! use pacer::handler::{DirectFn, HandlerRegistry};
//!
//! let mut registry = HandlerRegistry::new();
//!
//! registry.register(
//!     "echo",
//!     Box::new(DirectFn::new(|event: String, _ctx| Ok::<_, pacer::BoxError>(event))),
//! )?;
//! ```

mod adapter;
mod context;
mod registry;

pub use adapter::{CallbackFn, Completion, DeferredFn, DirectFn};
pub use context::InvocationContext;
pub use registry::{BoxFuture, Handler, HandlerRegistry, Outcome};
