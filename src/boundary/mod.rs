//! The panic boundary.
//!
//! [`catch_panic`] runs one operation and converts a panic raised inside it
//! into a [`PanicError`]. It never logs, never retries, and never lets a panic
//! escape, whatever the payload type.
//!
//! # Call-site capture
//!
//! The first boundary entered installs a process-wide panic hook that wraps
//! whichever hook was installed before. While a boundary is active on the
//! current thread, that hook records a backtrace and the panic location for
//! the boundary to pick up, and the default "thread panicked at" report is
//! not printed. Panics outside any boundary go to the previous hook as usual.
//!
//! If the application replaces the panic hook after the first boundary ran,
//! frames are captured at the catch site instead, which no longer shows the
//! code that panicked.
//!
//! # Unwind safety
//!
//! The operation is treated as unwind safe. A panic can leave data the
//! operation touched half-updated; callers that run it again must be able to
//! live with that.
//!
//! Panics compiled with `panic = "abort"` cannot be caught.

mod frames;
mod payload;

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::Once;
use std::task::Poll;

use crate::error::PanicError;

static INSTALL: Once = Once::new();

thread_local! {
    static ACTIVE: Cell<usize> = const { Cell::new(0) };
    static CAPTURED: RefCell<Option<Captured>> = const { RefCell::new(None) };
}

struct Captured {
    backtrace: Backtrace,
    location: Option<String>,
}

fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !record(info) {
                previous(info);
            }
        }));
    });
}

/// Store the panic for the innermost active boundary on this thread.
///
/// Returns false when no boundary is active.
#[inline(never)]
fn record(info: &PanicHookInfo<'_>) -> bool {
    if ACTIVE.try_with(Cell::get).unwrap_or(0) == 0 {
        return false;
    }
    let captured = Captured {
        backtrace: Backtrace::force_capture(),
        location: info.location().map(ToString::to_string),
    };
    CAPTURED
        .try_with(|slot| {
            if let Ok(mut slot) = slot.try_borrow_mut() {
                *slot = Some(captured);
            }
        })
        .is_ok()
}

/// Marks a boundary as active on the current thread for its lifetime.
struct Scope;

impl Scope {
    fn enter() -> Self {
        install_hook();
        ACTIVE.with(|active| active.set(active.get() + 1));
        Scope
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let _ = ACTIVE.try_with(|active| {
            let remaining = active.get().saturating_sub(1);
            active.set(remaining);
            if remaining == 0 {
                // a panic caught inside the operation itself leaves its capture behind
                let _ = CAPTURED.try_with(|slot| slot.borrow_mut().take());
            }
        });
    }
}

/// Run `f` once, converting a panic into a [`PanicError`].
///
/// When `f` returns normally its value comes back untouched in `Ok`, which
/// for a fallible operation means the operation's own `Result` is nested
/// inside.
///
/// # Examples
///
/// ```rust
/// use panicretry::boundary::catch_panic;
///
/// let ok = catch_panic(|| Ok::<_, String>(42));
/// assert_eq!(ok, Ok(Ok(42)));
///
/// let failed = catch_panic(|| Err::<i32, _>("not found".to_string()));
/// assert_eq!(failed, Ok(Err("not found".to_string())));
///
/// let panicked = catch_panic(|| -> Result<i32, String> { panic!("oops") });
/// assert_eq!(panicked.unwrap_err().message(), "oops");
/// ```
pub fn catch_panic<F, R>(f: F) -> Result<R, PanicError>
where
    F: FnOnce() -> R,
{
    let _scope = Scope::enter();
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| into_panic_error(payload.as_ref()))
}

/// Await `fut` once, converting a panic raised while polling it into a
/// [`PanicError`].
///
/// Every poll runs inside the boundary, so the capture follows the future
/// across executor threads.
///
/// # Examples
///
/// ```rust
/// use panicretry::boundary::catch_panic_async;
///
/// # tokio_test::block_on(async {
/// let caught = catch_panic_async(async {
///     panic!("oops");
/// })
/// .await;
/// assert_eq!(caught.unwrap_err().message(), "oops");
/// # });
/// ```
pub async fn catch_panic_async<Fut>(fut: Fut) -> Result<Fut::Output, PanicError>
where
    Fut: Future,
{
    let mut fut = Box::pin(fut);
    futures::future::poll_fn(move |cx| match catch_panic(|| fut.as_mut().poll(cx)) {
        Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
        Ok(Poll::Pending) => Poll::Pending,
        Err(error) => Poll::Ready(Err(error)),
    })
    .await
}

fn into_panic_error(payload: &(dyn Any + Send)) -> PanicError {
    let message = payload::describe(payload);
    let captured = CAPTURED
        .try_with(|slot| slot.try_borrow_mut().ok().and_then(|mut slot| slot.take()))
        .ok()
        .flatten();

    match captured {
        Some(Captured {
            backtrace,
            location: Some(location),
        }) => PanicError::new(message)
            .with_frames(frames::panic_sites(&backtrace))
            .with_location(location),
        Some(Captured {
            backtrace,
            location: None,
        }) => PanicError::new(message).with_frames(frames::panic_sites(&backtrace)),
        None => PanicError::new(message).with_frames(fallback_capture()),
    }
}

#[inline(never)]
fn fallback_capture() -> Vec<String> {
    frames::catch_sites(&Backtrace::force_capture())
}
