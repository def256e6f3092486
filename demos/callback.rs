//! Greeting handlers - the callback convention.
//!
//! This example demonstrates:
//! - Resolving the completion inline on the validation-failure path
//! - Moving the completion into a spawned task and resolving it there
//!
//! # Running against a local host
//!
//! ```sh
//! PACER_API=http://127.0.0.1:9001/runtime \
//!     cargo run --example callback
//! ```

use pacer::codec::DynamicEvent;
use pacer::{Completion, HttpSource, Runtime};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let source = HttpSource::from_env()?;

    let runtime = Runtime::builder()
        .handle_callback(
            "greet",
            |event: DynamicEvent, _ctx, done: Completion<DynamicEvent>| {
                let Some(name) = event.get("name").and_then(|v| v.as_str()) else {
                    done.fail("missing field: name");
                    return;
                };

                let mut result = DynamicEvent::new();
                result.insert(
                    "message".to_string(),
                    format!("Hello World! Hello {name}!").into(),
                );
                done.succeed(result);
            },
        )?
        .handle_callback(
            "greetLater",
            |event: DynamicEvent, ctx, done: Completion<DynamicEvent>| {
                tracing::debug!(remaining = ?ctx.remaining(), "scheduling greeting");

                tokio::spawn(async move {
                    let name = event
                        .get("name")
                        .and_then(|v| v.as_str())
                        .unwrap_or("stranger");

                    let mut result = DynamicEvent::new();
                    result.insert("message".to_string(), format!("Hello {name}!").into());
                    done.succeed(result);
                });
            },
        )?
        .build(source);

    if let Err(error) = runtime.run().await {
        tracing::error!("runtime stopped: {error}");
        std::process::exit(1);
    }
    Ok(())
}
