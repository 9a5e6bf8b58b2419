//! Boundary behavior once the application replaces the panic hook.
//!
//! Kept in its own test binary: the panic hook is process-wide.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use panicretry::boundary::catch_panic;
use panicretry::MAX_FRAMES;

#[inline(never)]
fn failing_handler() {
    panic!("handler blew up");
}

#[test]
fn test_frames_fall_back_to_catch_site() {
    // first boundary installs the crate's hook
    let _ = catch_panic(failing_handler);

    let seen = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&seen);
    std::panic::set_hook(Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let err = catch_panic(failing_handler).unwrap_err();

    assert_eq!(err.message(), "handler blew up");
    assert_eq!(err.location(), None);
    assert!(err.frames().len() <= MAX_FRAMES);
    assert!(err.frames().iter().all(|frame| frame.starts_with("    ")));
    let first = err.frames().first().expect("backtrace was captured");
    assert!(first.contains("replaced_hook.rs"), "frames: {:#?}", err.frames());
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    let _ = std::panic::take_hook();
}
