//! Greeting handlers - the direct-return convention, typed and dynamic.
//!
//! This example demonstrates:
//! - Creating a runtime with the builder pattern
//! - Registering a handler with a fixed event/response schema
//! - Registering the same logic against the open dynamic shape
//!
//! # Running against a local host
//!
//! ```sh
//! PACER_API=http://127.0.0.1:9001/runtime \
//!     cargo run --example hello
//! ```

use pacer::codec::DynamicEvent;
use pacer::{BoxError, HttpSource, Runtime};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Event {
    name: String,
}

#[derive(Serialize)]
struct Response {
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let source = HttpSource::from_env()?;

    let runtime = Runtime::builder()
        .handle("helloWorld", |event: Event, _ctx| {
            Ok::<_, BoxError>(Response {
                message: format!("Hello World! Hello {}!", event.name),
            })
        })?
        .handle("helloWorldDyn", |event: DynamicEvent, _ctx| {
            let name = event
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or("missing field: name")?;

            let mut result = DynamicEvent::new();
            result.insert(
                "message".to_string(),
                format!("Hello World! Hello {name}!").into(),
            );
            Ok::<_, BoxError>(result)
        })?
        .build(source);

    if let Err(error) = runtime.run().await {
        tracing::error!("runtime stopped: {error}");
        std::process::exit(1);
    }
    Ok(())
}
