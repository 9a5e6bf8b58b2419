//! Property-based tests for attempt counting

use proptest::prelude::*;
use panicretry::testing::{Flaky, RecordingLogger};
use panicretry::{Retrier, RetryError, MAX_FRAMES};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_unlimited_runs_k_plus_one_times(k in 0u32..20) {
        let flaky = Flaky::new(k);
        let logger = RecordingLogger::new();

        let result = Retrier::unlimited()
            .with_logger(logger.callback())
            .run(|| flaky.call());

        prop_assert_eq!(result, Ok(()));
        prop_assert_eq!(flaky.calls(), k + 1);
        prop_assert_eq!(logger.len(), k as usize);
    }

    #[test]
    fn prop_bounded_runs_n_plus_one_times(n in 1u32..15) {
        let flaky = Flaky::always();
        let logger = RecordingLogger::new();

        let result = Retrier::with_max_retries(n)
            .with_logger(logger.callback())
            .run(|| flaky.call());

        let is_exhausted = matches!(result, Err(RetryError::Exhausted { attempts, .. }) if attempts == n + 1);
        prop_assert!(is_exhausted);
        prop_assert_eq!(flaky.calls(), n + 1);
        prop_assert_eq!(logger.len(), (n + 1) as usize);
    }

    #[test]
    fn prop_recovers_within_budget(n in 1u32..15, k in 0u32..15) {
        prop_assume!(k <= n);
        let flaky = Flaky::new(k);

        let result = Retrier::with_max_retries(n)
            .with_logger(panicretry::logger::discard)
            .run(|| flaky.call());

        prop_assert_eq!(result, Ok(()));
        prop_assert_eq!(flaky.calls(), k + 1);
    }

    #[test]
    fn prop_ordinary_errors_never_retried(n in 0u32..50, code in any::<i32>()) {
        let mut calls = 0;
        let result = Retrier::with_max_retries(n)
            .with_logger(panicretry::logger::discard)
            .run(|| {
                calls += 1;
                Err::<(), _>(code)
            });

        prop_assert_eq!(result, Err(RetryError::Operation(code)));
        prop_assert_eq!(calls, 1);
    }

    #[test]
    fn prop_message_survives_any_text(message in "[a-zA-Z0-9 ]{0,40}") {
        let result = Retrier::with_max_retries(1)
            .with_logger(panicretry::logger::discard)
            .run(|| -> Result<(), String> { panic!("{}", message) });

        let err = result.unwrap_err();
        let caught = err.panic_error().expect("budget was exhausted");
        prop_assert_eq!(caught.message(), message.as_str());
        prop_assert_eq!(caught.to_string(), format!("panicretry: {}", message));
        prop_assert!(caught.frames().len() <= MAX_FRAMES);
    }
}
