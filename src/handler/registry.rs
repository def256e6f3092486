//! Handler registry - the write-once mapping from handler name to handler.
//!
//! Registration happens during startup, before the dispatch loop pulls its
//! first invocation; the runtime consumes the registry and never exposes
//! it mutably afterwards. A name can be bound exactly once for the life of
//! the process.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::{Error, Fault, Result};

use super::InvocationContext;

/// Boxed future for handler outcomes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The result of one invocation: either an encoded success payload or a
/// structured failure.
///
/// Every calling convention converges on this type inside its adapter, so
/// the dispatch loop stays convention-agnostic. Exactly one `Outcome` is
/// produced and submitted per invocation.
#[derive(Debug)]
pub enum Outcome {
    /// Encoded result payload.
    Success(Bytes),
    /// Structured failure: stable kind tag plus message.
    Failure(Fault),
}

impl Outcome {
    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl From<Error> for Outcome {
    fn from(error: Error) -> Self {
        Outcome::Failure(error.to_fault())
    }
}

/// The unified execution contract all calling conventions are adapted to.
///
/// `call` receives the raw event bytes and the invocation context, and
/// resolves to the invocation's [`Outcome`]. Decoding the event, waiting
/// out deferred or callback bodies, and encoding the result all happen
/// behind this boundary.
pub trait Handler: Send + Sync + 'static {
    /// Execute the handler against one invocation.
    fn call(&self, payload: Bytes, ctx: InvocationContext) -> BoxFuture<'static, Outcome>;
}

/// Registry mapping handler names to registered handlers.
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Bind a handler to a name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateHandler`] if the name is already bound.
    /// Registration is write-once per name.
    pub fn register(&mut self, name: &str, handler: Box<dyn Handler>) -> Result<()> {
        match self.handlers.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::DuplicateHandler(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(())
            }
        }
    }

    /// Look up the handler bound to a name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHandler`] if no binding exists.
    pub fn resolve(&self, name: &str) -> Result<&dyn Handler> {
        self.handlers
            .get(name)
            .map(|h| h.as_ref())
            .ok_or_else(|| Error::UnknownHandler(name.to_string()))
    }

    /// Whether a name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterate over the registered handler names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
