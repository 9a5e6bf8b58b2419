//! The retry loop.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::boundary::{catch_panic, catch_panic_async};
use crate::error::{PanicError, RetryError};
use crate::logger::{default_logger, Logger};
use crate::retry::{OnExhausted, RetryPolicy};

/// Runs an operation and runs it again whenever it panics.
///
/// Each panic is reported to the logger, then the [`RetryPolicy`] decides
/// whether to try again. Ordinary errors returned by the operation are never
/// retried. Nothing sleeps between attempts.
///
/// A `Retrier` is only read by [`run`](Retrier::run), so one instance can be
/// shared by any number of threads as long as its logger tolerates
/// concurrent calls.
///
/// # Examples
///
/// ```rust
/// use panicretry::{logger, Retrier};
///
/// let mut calls = 0;
/// let result = Retrier::unlimited()
///     .with_logger(logger::discard)
///     .run(|| {
///         calls += 1;
///         if calls <= 3 {
///             panic!("flaky handler");
///         }
///         Ok::<_, String>(calls)
///     });
///
/// assert_eq!(result, Ok(4));
/// ```
#[derive(Clone, Default)]
pub struct Retrier {
    policy: RetryPolicy,
    logger: Option<Logger>,
}

impl fmt::Debug for Retrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .field("logger", &self.logger.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Retrier {
    /// Unlimited retries, default logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry every panic forever.
    ///
    /// The call blocks for as long as the operation keeps panicking.
    pub fn unlimited() -> Self {
        Self::from_policy(RetryPolicy::unlimited())
    }

    /// Allow up to `n` retries after the initial attempt, `0` meaning
    /// unlimited.
    pub fn with_max_retries(n: u32) -> Self {
        Self::from_policy(RetryPolicy::with_max_retries(n))
    }

    /// Build a retrier around an existing policy.
    pub fn from_policy(policy: RetryPolicy) -> Self {
        Self {
            policy,
            logger: None,
        }
    }

    /// Replace the policy, keeping the logger.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Choose what happens when the budget is spent.
    pub fn on_exhausted(mut self, action: OnExhausted) -> Self {
        self.policy = self.policy.on_exhausted(action);
        self
    }

    /// Report each intercepted panic to `logger` instead of the default.
    pub fn with_logger<L>(self, logger: L) -> Self
    where
        L: Fn(&PanicError) + Send + Sync + 'static,
    {
        self.with_shared_logger(Arc::new(logger))
    }

    /// Report each intercepted panic to an already shared logger.
    pub fn with_shared_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Get the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it returns, retrying whenever it panics.
    ///
    /// - `Ok(value)` as soon as an attempt succeeds, however many panicked
    ///   before it.
    /// - `Err(RetryError::Operation(e))` as soon as an attempt returns an
    ///   error of its own.
    /// - `Err(RetryError::Exhausted { .. })` once a panic occurs on the last
    ///   permitted attempt, unless the policy says
    ///   [`OnExhausted::Repanic`], in which case this call panics with the
    ///   original message instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use panicretry::{logger, Retrier, RetryError};
    ///
    /// let retrier = Retrier::with_max_retries(5).with_logger(logger::discard);
    ///
    /// let mut calls = 0;
    /// let result = retrier.run(|| {
    ///     calls += 1;
    ///     Err::<(), _>("row not found")
    /// });
    ///
    /// assert_eq!(result, Err(RetryError::Operation("row not found")));
    /// assert_eq!(calls, 1); // ordinary errors are not retried
    /// ```
    pub fn run<T, E, F>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        let logger = self.resolve_logger();
        let mut attempts: u32 = 1;

        loop {
            let error = match catch_panic(&mut op) {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(error)) => return Err(RetryError::Operation(error)),
                Err(error) => error,
            };
            logger(&error);
            if let Some(exhausted) = self.after_panic(error, &mut attempts) {
                return Err(exhausted);
            }
        }
    }

    /// Await a fresh future from `make_future` until one completes, retrying
    /// whenever creating or polling it panics.
    ///
    /// Same outcomes as [`run`](Retrier::run).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use panicretry::{logger, Retrier};
    ///
    /// # tokio_test::block_on(async {
    /// let mut calls = 0;
    /// let result = Retrier::with_max_retries(3)
    ///     .with_logger(logger::discard)
    ///     .run_async(|| {
    ///         calls += 1;
    ///         let attempt = calls;
    ///         async move {
    ///             if attempt < 3 {
    ///                 panic!("socket reset");
    ///             }
    ///             Ok::<_, String>(attempt)
    ///         }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(result, Ok(3));
    /// # });
    /// ```
    pub async fn run_async<T, E, F, Fut>(&self, mut make_future: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let logger = self.resolve_logger();
        let mut attempts: u32 = 1;

        loop {
            let error = match catch_panic_async(async { make_future().await }).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(error)) => return Err(RetryError::Operation(error)),
                Err(error) => error,
            };
            logger(&error);
            if let Some(exhausted) = self.after_panic(error, &mut attempts) {
                return Err(exhausted);
            }
        }
    }

    fn resolve_logger(&self) -> Logger {
        self.logger.clone().unwrap_or_else(default_logger)
    }

    /// Decide what follows a panic on attempt `attempts`.
    ///
    /// Returns the terminal error when the budget is spent, `None` to retry.
    fn after_panic<E>(&self, error: PanicError, attempts: &mut u32) -> Option<RetryError<E>> {
        if !self.policy.is_exhausted(*attempts) {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = *attempts, "operation panicked, retrying");
            *attempts = attempts.saturating_add(1);
            return None;
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(
            attempts = *attempts,
            "retry budget exhausted: {}",
            error.message()
        );

        match self.policy.exhaustion() {
            OnExhausted::Return => Some(RetryError::Exhausted {
                error,
                attempts: *attempts,
            }),
            OnExhausted::Repanic => std::panic::panic_any(error.message().to_owned()),
        }
    }
}
