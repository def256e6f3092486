//! # pacer
//!
//! Rust runtime client for Pacer serverless function hosts.
//!
//! This crate is the adapter between a function host and your handler
//! code: it long-polls the host for the next invocation, decodes the
//! event, invokes the registered handler, and reports the outcome back
//! before polling again - one invocation at a time, under the host's
//! per-invocation deadline.
//!
//! ## Architecture
//!
//! - **Codec** (`codec`): raw event bytes to typed or dynamic shapes
//! - **Handlers** (`handler`): registry, invocation context, and the three
//!   calling conventions (direct, deferred, callback) normalized into one
//!   execution contract
//! - **Source** (`source`): the abstract invocation contract plus the
//!   HTTP long-poll implementation
//! - **Runtime** (`runtime`): the builder and the dispatch loop
//!
//! ## Example
//!
//! ```ignore
//! use pacer::{HttpSource, Runtime};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Event {
//!     name: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Response {
//!     message: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::from_env()?;
//!
//!     Runtime::builder()
//!         .handle("helloWorld", |event: Event, _ctx| {
//!             Ok::<_, pacer::BoxError>(Response {
//!                 message: format!("Hello {}!", event.name),
//!             })
//!         })?
//!         .build(source)
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod error;
pub mod handler;
pub mod source;

mod runtime;

pub use error::{BoxError, Error, ErrorKind, Fault, Result};
pub use handler::{Completion, Handler, InvocationContext, Outcome};
pub use runtime::{Runtime, RuntimeBuilder};
pub use source::{HttpSource, Invocation, InvocationSource};
