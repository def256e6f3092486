//! JSON codec using `serde_json`.
//!
//! Decode failures and encode failures are kept apart in the error
//! taxonomy: a decode failure means the event did not match the handler's
//! expected shape, an encode failure means the handler produced a result
//! that cannot be serialized. The dispatch loop reports both as failure
//! outcomes, never as process faults.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// JSON codec for event and result payloads.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the value cannot be serialized, e.g. a
    /// non-string-keyed map reachable from a dynamically-typed result.
    #[inline]
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(Error::Encode)
    }

    /// Decode JSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are not valid for the target
    /// shape (malformed JSON, missing required field, wrong type).
    #[inline]
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(Error::Decode)
    }
}
