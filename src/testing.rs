//! Testing utilities for code that retries panicking operations.
//!
//! # Examples
//!
//! ```rust
//! use panicretry::testing::{Flaky, RecordingLogger};
//! use panicretry::Retrier;
//!
//! let flaky = Flaky::new(2);
//! let logger = RecordingLogger::new();
//!
//! let result = Retrier::unlimited()
//!     .with_logger(logger.callback())
//!     .run(|| flaky.call());
//!
//! assert_eq!(result, Ok(()));
//! assert_eq!(flaky.calls(), 3);
//! assert_eq!(logger.len(), 2);
//! ```

use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::PanicError;

/// An operation that panics on its first `failures` calls, then succeeds.
///
/// Call counting is atomic, so a `Flaky` can be shared between threads.
#[derive(Debug)]
pub struct Flaky {
    failures: u32,
    message: &'static str,
    calls: AtomicU32,
}

impl Flaky {
    /// Panic with `"oops"` on the first `failures` calls.
    pub fn new(failures: u32) -> Self {
        Self::with_message(failures, "oops")
    }

    /// Panic with `message` on the first `failures` calls.
    pub fn with_message(failures: u32, message: &'static str) -> Self {
        Self {
            failures,
            message,
            calls: AtomicU32::new(0),
        }
    }

    /// A flaky operation that never recovers.
    pub fn always() -> Self {
        Self::new(u32::MAX)
    }

    /// Run the operation once.
    ///
    /// # Panics
    ///
    /// On each of the first `failures` calls.
    pub fn call(&self) -> Result<(), Infallible> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            std::panic::panic_any(self.message);
        }
        Ok(())
    }

    /// How many times [`call`](Flaky::call) has run.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A logger that keeps every panic it is given.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<PanicError>>>,
}

impl RecordingLogger {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback for [`Retrier::with_logger`](crate::Retrier::with_logger)
    /// that records into this logger.
    pub fn callback(&self) -> impl Fn(&PanicError) + Send + Sync + 'static {
        let entries = Arc::clone(&self.entries);
        move |err: &PanicError| lock(&entries).push(err.clone())
    }

    /// Every recorded panic, oldest first.
    pub fn entries(&self) -> Vec<PanicError> {
        lock(&self.entries).clone()
    }

    /// Messages of every recorded panic, oldest first.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.entries)
            .iter()
            .map(|err| err.message().to_owned())
            .collect()
    }

    /// Number of recorded panics.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Assert that a retry run gave up after a given number of attempts.
///
/// # Example
///
/// ```rust
/// use panicretry::{assert_exhausted, logger, Retrier};
///
/// let result = Retrier::with_max_retries(1)
///     .with_logger(logger::discard)
///     .run(|| -> Result<(), String> { panic!("oops") });
///
/// assert_exhausted!(result, 2);
/// assert_exhausted!(result, 2, "oops");
/// ```
#[macro_export]
macro_rules! assert_exhausted {
    ($result:expr, $attempts:expr) => {
        match &$result {
            Err($crate::RetryError::Exhausted { attempts, .. }) => {
                assert_eq!(*attempts, $attempts, "unexpected number of attempts");
            }
            other => panic!("Expected Exhausted, got {:?}", other),
        }
    };
    ($result:expr, $attempts:expr, $message:expr) => {
        match &$result {
            Err($crate::RetryError::Exhausted { error, attempts }) => {
                assert_eq!(*attempts, $attempts, "unexpected number of attempts");
                assert_eq!(error.message(), $message);
            }
            other => panic!("Expected Exhausted, got {:?}", other),
        }
    };
}

/// Assert that a retry run ended with the operation's own error.
///
/// # Example
///
/// ```rust
/// use panicretry::{assert_operation_error, Retrier};
///
/// let result = Retrier::new().run(|| Err::<(), _>("denied"));
///
/// assert_operation_error!(result);
/// assert_operation_error!(result, "denied");
/// ```
#[macro_export]
macro_rules! assert_operation_error {
    ($result:expr) => {
        match &$result {
            Err($crate::RetryError::Operation(_)) => {}
            other => panic!("Expected Operation error, got {:?}", other),
        }
    };
    ($result:expr, $expected:expr) => {
        match &$result {
            Err($crate::RetryError::Operation(error)) => assert_eq!(*error, $expected),
            other => panic!("Expected Operation error, got {:?}", other),
        }
    };
}
