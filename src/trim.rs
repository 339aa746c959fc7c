//! Narrowing a captured stack to the frames a reader cares about.
//!
//! A stack captured at a [`raise!`](crate::raise!) site contains the crate's
//! own dispatch frame and everything inside it, then the user frames up to the
//! recovery point, then the unwind machinery and runtime entry frames.
//! [`trim_frames`] keeps only the middle part and flips it so the outermost
//! caller comes first.

use crate::bridge::DISPATCH_FUNCTION;
use crate::frame::Frame;

/// Prefix of every line of a converted panic trace.
pub const PANIC_PREFIX: &str = "PANIC: ";

/// Function-name prefixes marking the unwind boundary or the program/thread
/// entry, whichever is met first going outward.
const ENTRY_PREFIXES: &[&str] = &[
    "<core::panic::unwind_safe::AssertUnwindSafe<",
    "std::panicking::",
    "std::panic::catch_unwind",
    "__rust_try",
    "std::rt::lang_start",
    "std::sys::backtrace::__rust_begin_short_backtrace",
    "std::sys_common::backtrace::__rust_begin_short_backtrace",
];

/// Call shims the closure or fn item handed to `catch_unwind` is invoked
/// through. They belong to the recovery machinery, not to the caller.
const SHIM_PREFIX: &str = "core::ops::function::";

fn is_dispatch(frame: &Frame) -> bool {
    frame.function() == Some(DISPATCH_FUNCTION)
}

fn is_entry(frame: &Frame) -> bool {
    frame
        .function()
        .is_some_and(|name| ENTRY_PREFIXES.iter().any(|p| name.starts_with(p)))
}

fn is_shim(frame: &Frame) -> bool {
    frame
        .function()
        .is_some_and(|name| name.starts_with(SHIM_PREFIX))
}

/// Keep the frames strictly between the dispatch marker and the entry marker,
/// outermost first.
///
/// `frames` is innermost first, as captured. Call shims sitting right inside
/// the entry marker are dropped with it. A missing marker leaves that end
/// untouched: extra frames are preferred over dropping real ones.
pub fn trim_frames(mut frames: Vec<Frame>) -> Vec<Frame> {
    if let Some(i) = frames.iter().position(is_dispatch) {
        frames.drain(..=i);
    }
    if let Some(i) = frames.iter().position(is_entry) {
        frames.truncate(i);
        while frames.last().is_some_and(is_shim) {
            frames.pop();
        }
    }
    frames.reverse();
    frames
}

/// Render frames as `PANIC: <file>:<line> <function>()` lines, in order.
pub fn render_trace(frames: &[Frame]) -> String {
    frames
        .iter()
        .map(|frame| format!("{PANIC_PREFIX}{frame}"))
        .collect::<Vec<_>>()
        .join("\n")
}
