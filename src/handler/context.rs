//! Per-invocation context passed to handlers.
//!
//! The context is created fresh by the invocation source for each unit of
//! work, is read-only to the handler, and is discarded once the outcome
//! has been submitted. It carries the invocation identifier, the handler
//! name the source requested, and the wall-clock deadline.

use std::time::Duration;

use tokio::time::Instant;

/// Context for one invocation.
///
/// Cheap to clone; handlers receive their own copy and cannot affect the
/// dispatch loop through it.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Identifier assigned by the invocation source.
    invocation_id: String,
    /// Handler name requested for this invocation.
    handler_name: String,
    /// Wall-clock deadline for producing an outcome.
    deadline: Instant,
}

impl InvocationContext {
    /// Create a context with an absolute deadline.
    pub fn new(
        invocation_id: impl Into<String>,
        handler_name: impl Into<String>,
        deadline: Instant,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            handler_name: handler_name.into(),
            deadline,
        }
    }

    /// Create a context whose deadline is `budget` from now.
    pub fn with_budget(
        invocation_id: impl Into<String>,
        handler_name: impl Into<String>,
        budget: Duration,
    ) -> Self {
        Self::new(invocation_id, handler_name, Instant::now() + budget)
    }

    /// The invocation identifier.
    #[inline]
    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    /// The handler name requested for this invocation.
    #[inline]
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    /// The absolute deadline.
    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline. Zero once the deadline has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_accessors() {
        let ctx = InvocationContext::with_budget("inv-1", "echo", Duration::from_secs(5));

        assert_eq!(ctx.invocation_id(), "inv-1");
        assert_eq!(ctx.handler_name(), "echo");
        assert!(ctx.remaining() <= Duration::from_secs(5));
        assert!(ctx.remaining() > Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_remaining_is_zero_past_deadline() {
        let ctx = InvocationContext::new("inv-2", "echo", Instant::now());
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_context_is_clone() {
        let ctx = InvocationContext::with_budget("inv-3", "echo", Duration::from_secs(1));
        let copy = ctx.clone();

        assert_eq!(ctx.invocation_id(), copy.invocation_id());
        assert_eq!(ctx.deadline(), copy.deadline());
    }
}
