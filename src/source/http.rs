//! HTTP long-poll invocation source.
//!
//! Speaks the Pacer host protocol:
//!
//! - `GET  {endpoint}/invocation/next` - blocks until work is available;
//!   the response body is the raw event, the context travels in the
//!   `Pacer-Invocation-Id`, `Pacer-Handler` and `Pacer-Deadline-Ms`
//!   response headers
//! - `POST {endpoint}/invocation/{id}/response` - success payload
//! - `POST {endpoint}/invocation/{id}/error` - failure as JSON
//!   `{"kind", "message"}`
//!
//! The deadline header carries an absolute epoch-milliseconds timestamp
//! and is converted to a monotonic instant on receipt.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

use crate::error::{Error, Fault, Result};
use crate::handler::InvocationContext;

use super::{Invocation, InvocationSource};

/// Response header carrying the invocation identifier.
pub const INVOCATION_ID_HEADER: &str = "Pacer-Invocation-Id";

/// Response header carrying the requested handler name.
pub const HANDLER_HEADER: &str = "Pacer-Handler";

/// Response header carrying the deadline as epoch milliseconds.
pub const DEADLINE_MS_HEADER: &str = "Pacer-Deadline-Ms";

/// Environment variable naming the host endpoint, e.g.
/// `http://127.0.0.1:9001/runtime`.
pub const ENDPOINT_ENV: &str = "PACER_API";

/// Environment variable naming the fallback handler, used when the host
/// omits the handler header.
pub const HANDLER_ENV: &str = "PACER_HANDLER";

/// Deadline budget assumed when the host omits the deadline header.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(60);

/// Invocation source for hosts speaking the HTTP long-poll protocol.
pub struct HttpSource {
    http: reqwest::Client,
    endpoint: String,
    default_handler: String,
}

impl HttpSource {
    /// Create a source polling the given endpoint.
    ///
    /// `default_handler` is used when the host omits the handler header;
    /// pass an empty string to make the header mandatory in practice
    /// (an unknown empty name resolves to a failure outcome, not a crash).
    pub fn new(endpoint: impl Into<String>, default_handler: impl Into<String>) -> Result<Self> {
        // No request timeout: `next` long-polls and may legitimately block
        // far longer than any fixed budget.
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let endpoint = endpoint.into();
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            default_handler: default_handler.into(),
        })
    }

    /// Create a source from `PACER_API` and `PACER_HANDLER`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] when `PACER_API` is unset; a
    /// missing `PACER_HANDLER` only disables the fallback name.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .map_err(|_| Error::SourceUnavailable(format!("{ENDPOINT_ENV} is not set")))?;
        let default_handler = std::env::var(HANDLER_ENV).unwrap_or_default();
        Self::new(endpoint, default_handler)
    }

    /// The endpoint this source polls.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }
}

/// Convert an absolute epoch-milliseconds deadline to a monotonic instant.
///
/// A deadline already in the past yields an instant that is due
/// immediately, producing a timeout outcome rather than an error.
fn deadline_instant(deadline_ms: u64) -> Instant {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Instant::now() + Duration::from_millis(deadline_ms.saturating_sub(now_ms))
}

fn header_value<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl InvocationSource for HttpSource {
    async fn next(&mut self) -> Result<Invocation> {
        let response = self
            .http
            .get(self.url("invocation/next"))
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "next invocation returned HTTP {status}"
            )));
        }

        let invocation_id = header_value(&response, INVOCATION_ID_HEADER)
            .ok_or_else(|| {
                Error::SourceUnavailable(format!("missing {INVOCATION_ID_HEADER} header"))
            })?
            .to_string();

        let handler_name = header_value(&response, HANDLER_HEADER)
            .unwrap_or(&self.default_handler)
            .to_string();

        let deadline = match header_value(&response, DEADLINE_MS_HEADER)
            .and_then(|v| v.parse::<u64>().ok())
        {
            Some(deadline_ms) => deadline_instant(deadline_ms),
            None => Instant::now() + DEFAULT_BUDGET,
        };

        let payload = response
            .bytes()
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        tracing::debug!(
            invocation = %invocation_id,
            handler = %handler_name,
            bytes = payload.len(),
            "received invocation"
        );

        Ok(Invocation {
            context: InvocationContext::new(invocation_id, handler_name, deadline),
            payload,
        })
    }

    async fn submit_success(&mut self, invocation_id: &str, body: Bytes) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("invocation/{invocation_id}/response")))
            .body(body)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "success submission returned HTTP {status}"
            )));
        }
        Ok(())
    }

    async fn submit_failure(&mut self, invocation_id: &str, fault: &Fault) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("invocation/{invocation_id}/error")))
            .json(fault)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "failure submission returned HTTP {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_endpoint_is_normalized() {
        let source = HttpSource::new("http://127.0.0.1:9001/runtime/", "main").unwrap();

        assert_eq!(source.endpoint(), "http://127.0.0.1:9001/runtime");
        assert_eq!(
            source.url("invocation/next"),
            "http://127.0.0.1:9001/runtime/invocation/next"
        );
        assert_eq!(
            source.url("invocation/abc/response"),
            "http://127.0.0.1:9001/runtime/invocation/abc/response"
        );
    }

    #[tokio::test]
    async fn test_deadline_in_future() {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        let deadline = deadline_instant(now_ms + 5_000);
        let budget = deadline.saturating_duration_since(Instant::now());

        assert!(budget <= Duration::from_secs(5));
        assert!(budget > Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_deadline_in_past_is_due_immediately() {
        let deadline = deadline_instant(0);
        assert_eq!(
            deadline.saturating_duration_since(Instant::now() + Duration::from_millis(10)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_from_env_requires_endpoint() {
        std::env::remove_var(ENDPOINT_ENV);

        let error = HttpSource::from_env().err().unwrap();
        assert_eq!(error.kind(), ErrorKind::SourceUnavailableError);
        assert!(error.to_string().contains(ENDPOINT_ENV));
    }
}
