//! Callbacks that report intercepted panics.
//!
//! A [`Logger`] sees every panic the retry loop absorbs, before the loop
//! decides whether to try again. It is for observability only: nothing it
//! does changes the outcome of the run.

use std::sync::Arc;

use crate::error::PanicError;

/// Callback invoked with each intercepted panic.
///
/// Shared by every run of a [`Retrier`](crate::Retrier), possibly from
/// several threads at once.
pub type Logger = Arc<dyn Fn(&PanicError) + Send + Sync>;

/// The logger used when a [`Retrier`](crate::Retrier) has none configured.
///
/// Reports through [`log_panic`].
pub fn default_logger() -> Logger {
    Arc::new(log_panic)
}

/// A logging callback that discards everything.
///
/// ```rust
/// use panicretry::{logger, Retrier};
///
/// let quiet = Retrier::with_max_retries(3).with_logger(logger::discard);
/// # let _ = quiet;
/// ```
pub fn discard(_: &PanicError) {}

/// Report a panic with its captured call sites.
///
/// With the `tracing` feature and a subscriber installed this is an `ERROR`
/// event carrying the alternate form of the error. Otherwise the alternate
/// form goes to stderr, so a panic absorbed by the retry loop is never
/// silent.
pub fn log_panic(err: &PanicError) {
    if has_subscriber() {
        emit(err);
    } else {
        eprintln!("{}", report(err));
    }
}

/// The stderr line for `err`.
fn report(err: &PanicError) -> String {
    format!("{:#}", err)
}

#[cfg(feature = "tracing")]
fn has_subscriber() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(not(feature = "tracing"))]
fn has_subscriber() -> bool {
    false
}

#[cfg(feature = "tracing")]
fn emit(err: &PanicError) {
    tracing::error!(
        location = err.location().unwrap_or("<unknown>"),
        "{:#}",
        err
    );
}

#[cfg(not(feature = "tracing"))]
fn emit(err: &PanicError) {
    eprintln!("{}", report(err));
}
