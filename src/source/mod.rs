//! Invocation source - where units of work come from and outcomes go.
//!
//! The dispatch loop depends only on the abstract [`InvocationSource`]
//! contract: "give me the next unit of work" and "report the outcome for
//! id X". The bit-exact wire format of any particular host is deliberately
//! out of the contract; [`HttpSource`] implements it for hosts that speak
//! an HTTP long-poll protocol.
//!
//! Any transport fault maps to
//! [`Error::SourceUnavailable`](crate::error::Error::SourceUnavailable),
//! which is fatal to the process: the hosting environment replaces the
//! process rather than having it retry.

mod http;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Fault, Result};
use crate::handler::InvocationContext;

pub use http::{
    HttpSource, DEADLINE_MS_HEADER, DEFAULT_BUDGET, ENDPOINT_ENV, HANDLER_ENV, HANDLER_HEADER,
    INVOCATION_ID_HEADER,
};

/// One unit of work delivered by the invocation source.
#[derive(Debug)]
pub struct Invocation {
    /// Per-invocation metadata: id, requested handler name, deadline.
    pub context: InvocationContext,
    /// Opaque raw event bytes.
    pub payload: Bytes,
}

/// Abstract contract between the dispatch loop and the invocation host.
///
/// The loop uses the source strictly sequentially: one `next`, then exactly
/// one `submit_success` or `submit_failure` for the returned invocation id,
/// then the next `next`. Submitting twice for the same id is a programming
/// error the loop structurally never commits.
#[async_trait]
pub trait InvocationSource: Send {
    /// Block until the next invocation is available.
    async fn next(&mut self) -> Result<Invocation>;

    /// Report a success payload for an invocation.
    async fn submit_success(&mut self, invocation_id: &str, body: Bytes) -> Result<()>;

    /// Report a structured failure for an invocation.
    async fn submit_failure(&mut self, invocation_id: &str, fault: &Fault) -> Result<()>;
}
