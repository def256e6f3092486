//! Codec module - serialization/deserialization for event payloads.
//!
//! Every invocation arrives as opaque bytes and leaves as opaque bytes; the
//! codec is the only place where shape enters the picture. Two shapes are
//! supported, selected by the event/result type a handler is registered
//! with:
//!
//! - strongly typed: any `serde` struct with fixed, named fields
//! - dynamically typed: [`DynamicEvent`], an open string-keyed mapping
//!
//! # Design
//!
//! The codec is a marker struct with static methods rather than a trait
//! object. Both shapes go through the same `serde_json` path, so the split
//! is decided at registration time by the type parameter, never by
//! inspecting payloads at run time.
//!
//! # Example
//!
//! ```
//! use pacer::codec::JsonCodec;
//!
//! let encoded = JsonCodec::encode(&"hello").unwrap();
//! let decoded: String = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod json;

pub use json::JsonCodec;

/// The dynamically-typed event/result shape: an open mapping from string
/// keys to heterogeneous JSON values.
///
/// Handlers registered with `DynamicEvent` as their event or result type
/// skip the fixed-schema step entirely and work against raw structure.
pub type DynamicEvent = serde_json::Map<String, serde_json::Value>;
