//! Demonstrates the default logger reporting through tracing
//!
//! Run with: cargo run --example tracing_demo

use panicretry::testing::Flaky;
use panicretry::Retrier;

fn main() {
    // Set up tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("Starting tracing demo");

    // Every intercepted panic becomes an ERROR event with its call sites
    let flaky = Flaky::with_message(2, "connection reset by peer");
    let result = Retrier::with_max_retries(5).run(|| flaky.call());
    tracing::info!("Recovered: {:?} after {} calls", result, flaky.calls());

    // The budget runs out and the retry loop warns before returning
    let broken = Flaky::always();
    let result = Retrier::with_max_retries(2).run(|| broken.call());
    match result {
        Ok(()) => tracing::info!("Unexpected success"),
        Err(e) => tracing::error!("Gave up: {}", e),
    }
}
