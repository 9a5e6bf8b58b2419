//! Flaky Handler Example
//!
//! Demonstrates defending a unit of work against sporadic panics.
//! Shows practical patterns including:
//! - The package-level `run` with unlimited retries
//! - A bounded budget that gives up and returns the last panic
//! - Ordinary errors passing straight through
//! - Re-raising the panic once the budget is spent
//!
//! Run with: cargo run --example flaky_handler

use std::sync::atomic::{AtomicU32, Ordering};

use panicretry::{logger, OnExhausted, Retrier, RetryError};

// ==================== Unlimited Retries ====================

/// Example 1: a handler that crashes a few times before it works
fn example_unlimited() {
    println!("\n=== Example 1: Unlimited Retries ===");

    let mut attempts = 0;
    let result = panicretry::run(|| {
        attempts += 1;
        println!("  Attempt {}", attempts);
        if attempts < 4 {
            panic!("cache not warmed up");
        }
        Ok::<_, String>("200 OK")
    });

    println!("Result after {} attempts: {:?}", attempts, result);
}

// ==================== Bounded Budget ====================

/// Example 2: give up after a fixed number of retries
fn example_bounded() {
    println!("\n=== Example 2: Bounded Budget ===");

    let attempts = AtomicU32::new(0);
    let retrier = Retrier::with_max_retries(3).with_logger(|err: &panicretry::PanicError| {
        println!("  Intercepted: {}", err);
    });

    let result = retrier.run(|| -> Result<(), String> {
        attempts.fetch_add(1, Ordering::SeqCst);
        let pool: Vec<u8> = Vec::new();
        let _first = pool[0];
        Ok(())
    });

    match result {
        Ok(()) => println!("Unexpected success"),
        Err(RetryError::Exhausted { error, attempts }) => {
            println!("Gave up after {} attempts:\n{:#}", attempts, error);
        }
        Err(RetryError::Operation(e)) => println!("Handler error: {}", e),
    }
    println!("Operation ran {} times", attempts.load(Ordering::SeqCst));
}

// ==================== Ordinary Errors ====================

/// Example 3: errors the handler returns are not retried
fn example_ordinary_error() {
    println!("\n=== Example 3: Ordinary Errors ===");

    let mut attempts = 0;
    let result = Retrier::with_max_retries(5)
        .with_logger(logger::discard)
        .run(|| {
            attempts += 1;
            Err::<(), _>("401 Unauthorized")
        });

    println!("Result: {:?} after {} attempt(s)", result, attempts);
}

// ==================== Re-raising ====================

/// Example 4: let the final panic escape to a supervisor
fn example_repanic() {
    println!("\n=== Example 4: Re-raising ===");

    let retrier = Retrier::with_max_retries(1)
        .on_exhausted(OnExhausted::Repanic)
        .with_logger(logger::discard);

    let supervised = panicretry::boundary::catch_panic(|| {
        retrier.run(|| -> Result<(), String> { panic!("corrupt frame") })
    });

    match supervised {
        Ok(_) => println!("Handler returned"),
        Err(escaped) => println!("Supervisor caught: {}", escaped),
    }
}

fn main() {
    println!("======================================");
    println!("       Flaky Handler Example          ");
    println!("======================================");

    example_unlimited();
    example_bounded();
    example_ordinary_error();
    example_repanic();

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
