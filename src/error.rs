//! Error types for the pacer runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque error produced by a handler body.
///
/// Handlers fail with whatever error type their business logic uses; the
/// runtime never inspects it beyond its `Display` output.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all runtime operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A handler name was registered twice. Fatal at startup.
    #[error("handler already registered: {0}")]
    DuplicateHandler(String),

    /// No handler is registered under the requested name.
    #[error("no handler registered under: {0}")]
    UnknownHandler(String),

    /// The raw event did not match the handler's expected shape.
    #[error("event decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The handler's result could not be serialized.
    #[error("result encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The deadline elapsed before the handler produced a result.
    #[error("handler {0} did not complete before the invocation deadline")]
    HandlerTimeout(String),

    /// The handler body failed. Wraps the opaque underlying cause.
    #[error("handler failed: {0}")]
    HandlerExecution(#[source] BoxError),

    /// The invocation source cannot be reached. Fatal to the process;
    /// the hosting environment is responsible for restart.
    #[error("invocation source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error-kind tag carried by a failure outcome.
///
/// The tag is the only part of the taxonomy that crosses the submission
/// boundary; stack traces and internal representations never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    DuplicateHandlerError,
    UnknownHandlerError,
    DecodeError,
    EncodeError,
    HandlerTimeoutError,
    HandlerExecutionError,
    SourceUnavailableError,
}

impl ErrorKind {
    /// The tag as reported to the invocation source.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DuplicateHandlerError => "DuplicateHandlerError",
            ErrorKind::UnknownHandlerError => "UnknownHandlerError",
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::EncodeError => "EncodeError",
            ErrorKind::HandlerTimeoutError => "HandlerTimeoutError",
            ErrorKind::HandlerExecutionError => "HandlerExecutionError",
            ErrorKind::SourceUnavailableError => "SourceUnavailableError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure reported back to the invocation source:
/// a stable kind tag plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    /// Stable error-kind tag.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl Fault {
    /// Create a fault from a kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error {
    /// The stable tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateHandler(_) => ErrorKind::DuplicateHandlerError,
            Error::UnknownHandler(_) => ErrorKind::UnknownHandlerError,
            Error::Decode(_) => ErrorKind::DecodeError,
            Error::Encode(_) => ErrorKind::EncodeError,
            Error::HandlerTimeout(_) => ErrorKind::HandlerTimeoutError,
            Error::HandlerExecution(_) => ErrorKind::HandlerExecutionError,
            Error::SourceUnavailable(_) => ErrorKind::SourceUnavailableError,
        }
    }

    /// Convert into the structured failure submitted for an invocation.
    pub fn to_fault(&self) -> Fault {
        Fault::new(self.kind(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_are_stable() {
        let error = Error::UnknownHandler("ghost".to_string());
        assert_eq!(error.kind().as_str(), "UnknownHandlerError");

        let error = Error::HandlerTimeout("slow".to_string());
        assert_eq!(error.kind().as_str(), "HandlerTimeoutError");
    }

    #[test]
    fn test_fault_carries_kind_and_message() {
        let error = Error::UnknownHandler("ghost".to_string());
        let fault = error.to_fault();

        assert_eq!(fault.kind, ErrorKind::UnknownHandlerError);
        assert!(fault.message.contains("ghost"));
    }

    #[test]
    fn test_fault_serializes_kind_as_tag() {
        let fault = Fault::new(ErrorKind::DecodeError, "missing field `name`");
        let json = serde_json::to_value(&fault).unwrap();

        assert_eq!(json["kind"], "DecodeError");
        assert_eq!(json["message"], "missing field `name`");
    }

    #[test]
    fn test_execution_error_preserves_cause_message() {
        let cause: BoxError = "db down".into();
        let error = Error::HandlerExecution(cause);

        assert!(error.to_string().contains("db down"));
        assert_eq!(error.kind(), ErrorKind::HandlerExecutionError);
    }
}
