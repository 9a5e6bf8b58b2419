//! # panicretry
//!
//! Run a unit of work, catch the panics it raises, report them, and run it
//! again.
//!
//! Ordinary errors are the operation's business and come back untouched on
//! the first attempt. Panics are treated as sporadic crashes: each one is
//! turned into a [`PanicError`] carrying the panic message and the call
//! sites that led to it, handed to a logger, and the operation is run again
//! until it returns or the [`RetryPolicy`] gives up.
//!
//! ## Quick Example
//!
//! ```rust
//! let mut counter = 0;
//! let result = panicretry::run(|| {
//!     if counter < 10 {
//!         counter += 1;
//!         panic!("oops");
//!     }
//!     Ok::<_, std::io::Error>(())
//! });
//!
//! assert!(result.is_ok());
//! assert_eq!(counter, 10);
//! ```
//!
//! ## Pieces
//!
//! - [`boundary`]: runs an operation once and converts a panic into a
//!   [`PanicError`]
//! - [`retry`]: [`Retrier`] and [`RetryPolicy`], the retry loop and its
//!   budget
//! - [`logger`]: the callbacks that report each intercepted panic
//! - [`testing`]: helpers for tests of code built on this crate
//!
//! ## Limits
//!
//! Only unwinding panics can be caught. With `panic = "abort"`, or for
//! faults the runtime does not turn into a panic (stack overflow, memory
//! corruption), the process still dies.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod boundary;
pub mod error;
pub mod logger;
pub mod retry;
pub mod testing;

use std::future::Future;

// Re-exports
pub use error::{PanicError, RetryError, ERROR_PREFIX, MAX_FRAMES};
pub use logger::Logger;
pub use retry::{OnExhausted, Retrier, RetryPolicy};

/// Run `op` with a default [`Retrier`]: unlimited retries, default logger.
///
/// Blocks for as long as `op` keeps panicking.
pub fn run<T, E, F>(op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
{
    Retrier::default().run(op)
}

/// Async counterpart of [`run`].
///
/// # Examples
///
/// ```rust
/// # tokio_test::block_on(async {
/// let mut calls = 0;
/// let result = panicretry::run_async(|| {
///     calls += 1;
///     let attempt = calls;
///     async move {
///         if attempt == 1 {
///             panic!("cold cache");
///         }
///         Ok::<_, String>(attempt)
///     }
/// })
/// .await;
///
/// assert_eq!(result, Ok(2));
/// # });
/// ```
pub async fn run_async<T, E, F, Fut>(make_future: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Retrier::default().run_async(make_future).await
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::boundary::{catch_panic, catch_panic_async};
    pub use crate::error::{PanicError, RetryError};
    pub use crate::retry::{OnExhausted, Retrier, RetryPolicy};
}
