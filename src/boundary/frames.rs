//! Call-site extraction from captured backtraces.
//!
//! A backtrace taken inside the panic hook opens with the hook and the std
//! panic runtime, followed by whatever raised the panic for its caller
//! (`panic_fmt`, `unwrap_failed`, `Result::expect`, slice indexing). Call
//! sites start right after the last frame of that panic entry block.
//!
//! A backtrace taken at the catch site, when our hook was replaced, starts
//! inside the boundary; call sites start at the caller of `catch_panic`.

use std::backtrace::{Backtrace, BacktraceStatus};

use crate::error::MAX_FRAMES;

/// Frames of this crate's hook and of the boxed hook dispatch.
const HOOK: &[&str] = &[
    "std::backtrace",
    "panicretry::boundary::record",
    "panicretry::boundary::install_hook",
    "core::ops::function::Fn::call",
];

/// Frames that raise a panic on behalf of the code that called them.
const PANIC_ENTRY: &[&str] = &[
    "rust_begin_unwind",
    "__rustc::rust_begin_unwind",
    "core::panicking::",
    "std::panicking::begin_panic",
    "std::panicking::rust_panic",
    "std::panicking::panic_with_hook",
    "std::panicking::panic_handler",
    "std::panicking::begin_panic_handler",
    "std::panic::panic_any",
    "std::sys::backtrace::__rust_end_short_backtrace",
    "std::sys_common::backtrace::__rust_end_short_backtrace",
    "core::result::unwrap_failed",
    "core::option::unwrap_failed",
    "core::option::expect_failed",
    "core::result::Result<T,E>::unwrap",
    "core::result::Result<T,E>::expect",
    "core::option::Option<T>::unwrap",
    "core::option::Option<T>::expect",
    "core::str::slice_error_fail",
    "core::cell::panic_already",
];

/// Entry frames whose symbol is a trait impl, so only a substring is stable.
const PANIC_ENTRY_INFIX: &[&str] = &["core::slice::index::", "as core::ops::index::Index<"];

/// The boundary function whose caller is the catch site.
const CATCH_SITE: &str = "panicretry::boundary::catch_panic";

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawFrame {
    symbol: String,
    location: Option<String>,
}

/// Call sites of a backtrace captured by the panic hook.
///
/// Returns an empty list when the platform could not capture anything.
pub(crate) fn panic_sites(backtrace: &Backtrace) -> Vec<String> {
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    let frames = parse(&backtrace.to_string());
    let start = after_panic_entry(&frames);
    render(&frames[start..])
}

/// Call sites of a backtrace captured where the boundary caught the panic.
pub(crate) fn catch_sites(backtrace: &Backtrace) -> Vec<String> {
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    let frames = parse(&backtrace.to_string());
    let start = after_catch_site(&frames);
    render(&frames[start..])
}

fn parse(text: &str) -> Vec<RawFrame> {
    let mut frames: Vec<RawFrame> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.location.is_none() {
                    frame.location = Some(location.to_owned());
                }
            }
            continue;
        }
        if let Some((index, symbol)) = line.split_once(": ") {
            if is_digits(index) {
                frames.push(RawFrame {
                    symbol: symbol.to_owned(),
                    location: None,
                });
            }
        }
    }
    frames
}

/// Index of the first frame above the panic entry block.
///
/// The block opens at the first entry frame and runs through the last entry
/// frame reached before any frame outside `std`/`core`/`alloc`. Without an
/// entry block only the hook frames are dropped.
fn after_panic_entry(frames: &[RawFrame]) -> usize {
    let Some(first) = frames.iter().position(is_panic_entry) else {
        return frames.iter().take_while(|frame| is_hook(frame)).count();
    };
    let mut last = first;
    for (index, frame) in frames.iter().enumerate().skip(first + 1) {
        if is_panic_entry(frame) {
            last = index;
        } else if !is_runtime(frame) {
            break;
        }
    }
    last + 1
}

/// Index of the caller of `catch_panic`.
fn after_catch_site(frames: &[RawFrame]) -> usize {
    frames
        .iter()
        .position(is_catch_site)
        .map(|index| index + 1)
        .unwrap_or_else(|| {
            frames
                .iter()
                .take_while(|frame| {
                    is_hook(frame) || frame.symbol.starts_with("panicretry::boundary::")
                })
                .count()
        })
}

fn is_catch_site(frame: &RawFrame) -> bool {
    match frame.symbol.strip_prefix(CATCH_SITE) {
        Some(rest) => rest.is_empty() || rest.starts_with("::<"),
        None => false,
    }
}

fn render(frames: &[RawFrame]) -> Vec<String> {
    frames
        .iter()
        .take(MAX_FRAMES)
        .map(|frame| match &frame.location {
            Some(location) => format!("    {}", without_column(location)),
            None => format!("    {}", frame.symbol),
        })
        .collect()
}

fn is_hook(frame: &RawFrame) -> bool {
    HOOK.iter().any(|prefix| frame.symbol.starts_with(prefix))
        || frame.symbol.contains("as core::ops::function::Fn<")
}

fn is_panic_entry(frame: &RawFrame) -> bool {
    let symbol = frame.symbol.as_str();
    PANIC_ENTRY.iter().any(|prefix| symbol.starts_with(prefix))
        || PANIC_ENTRY_INFIX.iter().any(|infix| symbol.contains(infix))
}

fn is_runtime(frame: &RawFrame) -> bool {
    let symbol = frame.symbol.trim_start_matches('<');
    ["std::", "core::", "alloc::", "__rust"]
        .iter()
        .any(|prefix| symbol.starts_with(prefix))
}

/// `src/lib.rs:10:5` -> `src/lib.rs:10`
fn without_column(location: &str) -> &str {
    match location.rsplit_once(':') {
        Some((head, column)) if is_digits(column) => match head.rsplit_once(':') {
            Some((_, line)) if is_digits(line) => head,
            _ => location,
        },
        _ => location,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
