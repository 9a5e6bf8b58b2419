//! End-to-end behavior of the retry loop through the public API.

use std::fmt;
use std::panic::AssertUnwindSafe;

use panicretry::prelude::*;
use panicretry::testing::{Flaky, RecordingLogger};
use panicretry::{assert_exhausted, assert_operation_error, logger};

#[derive(Debug, Clone, PartialEq)]
struct HandlerError {
    code: u16,
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler failed with {}", self.code)
    }
}

impl std::error::Error for HandlerError {}

#[test]
fn test_package_run_recovers_from_ten_panics() {
    let mut counter = 0;
    let result = panicretry::run(|| {
        if counter < 10 {
            counter += 1;
            panic!("oops");
        }
        Ok::<_, HandlerError>(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(counter, 10);
}

#[test]
fn test_default_retrier_calls_eleven_times() {
    let flaky = Flaky::new(10);
    let result = Retrier::default()
        .with_logger(logger::discard)
        .run(|| flaky.call());

    assert!(result.is_ok());
    assert_eq!(flaky.calls(), 11);
}

#[test]
fn test_ten_retries_then_gives_up() {
    let mut counter = 0;
    let result = Retrier::with_max_retries(10)
        .with_logger(logger::discard)
        .run(|| -> Result<(), HandlerError> {
            counter += 1;
            panic!("oops");
        });

    assert_eq!(counter, 11);
    assert_exhausted!(result, 11, "oops");
    assert_eq!(result.unwrap_err().to_string(), "panicretry: oops");
}

#[test]
fn test_no_panic_no_error() {
    let mut counter = 0;
    let result = Retrier::new().run(|| {
        counter += 1;
        Ok::<_, HandlerError>(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(counter, 1);
}

#[test]
fn test_no_panic_an_error() {
    let some_err = HandlerError { code: 503 };
    let mut counter = 0;
    let result = Retrier::new().run(|| {
        counter += 1;
        Err::<(), _>(some_err.clone())
    });

    assert_operation_error!(result, some_err);
    assert_eq!(counter, 1);
    assert_eq!(result.unwrap_err().to_string(), "handler failed with 503");
}

#[test]
fn test_exhausted_error_chains_to_panic() {
    use std::error::Error as _;

    let result = Retrier::with_max_retries(1)
        .with_logger(logger::discard)
        .run(|| -> Result<(), HandlerError> { panic!("oops") });

    let err = result.unwrap_err();
    let source = err.source().expect("exhausted error has a source");
    assert_eq!(source.to_string(), "panicretry: oops");
}

#[test]
fn test_logged_errors_render_extended_form() {
    let logger = RecordingLogger::new();
    let _ = Retrier::with_max_retries(1)
        .with_logger(logger.callback())
        .run(|| Flaky::always().call());

    for err in logger.entries() {
        let extended = format!("{:#}", err);
        let mut lines = extended.lines();
        assert_eq!(lines.next(), Some("panicretry: oops"));
        let frame_lines: Vec<&str> = lines.collect();
        assert_eq!(frame_lines.len(), err.frames().len());
        assert!(frame_lines.len() <= panicretry::MAX_FRAMES);
    }
}

#[test]
fn test_policy_drives_retrier() {
    let policy = RetryPolicy::with_max_retries(4);
    let flaky = Flaky::always();

    let result = Retrier::from_policy(policy)
        .with_logger(logger::discard)
        .run(|| flaky.call());

    assert_eq!(Some(flaky.calls()), policy.max_attempts());
    assert_exhausted!(result, 5);
}

#[test]
fn test_repanic_escapes_as_panic() {
    let retrier = Retrier::with_max_retries(1)
        .on_exhausted(OnExhausted::Repanic)
        .with_logger(logger::discard);

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        retrier.run(|| Flaky::always().call())
    }));

    let payload = outcome.expect_err("exhaustion re-raises");
    assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("oops"));
}
