//! HTTPS fetch handler - the deferred-result convention.
//!
//! This example demonstrates:
//! - A handler body that returns a future
//! - An HTTP client created once at startup and passed into the handler
//!   as a captured dependency rather than ambient global state
//!
//! # Running against a local host
//!
//! ```sh
//! PACER_API=http://127.0.0.1:9001/runtime \
//!     cargo run --example fetch
//! ```

use pacer::{BoxError, HttpSource, Runtime};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Event {
    url: String,
}

#[derive(Serialize)]
struct Response {
    url: String,
    content: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let source = HttpSource::from_env()?;
    let http = reqwest::Client::new();

    let runtime = Runtime::builder()
        .handle_deferred("getHttps", move |event: Event, _ctx| {
            let http = http.clone();
            async move {
                let content = http.get(&event.url).send().await?.text().await?;
                Ok::<_, BoxError>(Response {
                    url: event.url,
                    content,
                })
            }
        })?
        .build(source);

    if let Err(error) = runtime.run().await {
        tracing::error!("runtime stopped: {error}");
        std::process::exit(1);
    }
    Ok(())
}
