//! # errtrace - errors that know where they have been
//!
//! Every error built with this crate records the file, line, and function of
//! the code that created it. Wrapping an error adds another located line, so
//! the rendered error reads like a stack trace of the call sites it passed:
//!
//! ```text
//! ERROR: src/api.rs:89: myapp::api::handle() cannot serve user 42
//! ERROR: src/db.rs:142: myapp::db::query() user 42 not found
//! ```
//!
//! ## Try It Now
//!
//! ```rust
//! use errtrace::{annotate, reason, Annotated};
//!
//! fn query(id: u64) -> Result<String, Annotated> {
//!     Err(reason!("user {} not found", id))
//! }
//!
//! fn handle(id: u64) -> Result<String, Annotated> {
//!     query(id).map_err(|e| annotate!(Some(e), "cannot serve user {}", id).unwrap())
//! }
//!
//! let err = handle(42).unwrap_err();
//! assert_eq!(err.to_string().lines().count(), 2);
//! ```
//!
//! The [`ResultExt`] trait does the same without the `map_err`:
//!
//! ```rust
//! use errtrace::{reason, Annotated, ResultExt};
//!
//! fn query(id: u64) -> Result<String, Annotated> {
//!     Err(reason!("user {} not found", id))
//! }
//!
//! fn handle(id: u64) -> Result<String, Annotated> {
//!     query(id).annotate_with(|| format!("cannot serve user {}", id))
//! }
//! # assert!(handle(1).is_err());
//! ```
//!
//! ## Building Errors
//!
//! | Macro / function | Effect |
//! |------------------|--------|
//! | [`reason!(fmt, ..)`](reason!) | New error located at the caller |
//! | [`annotate!(err, fmt, ..)`](annotate!) | Wrap `Option<E>`; `None` stays `None` |
//! | [`reason_at!(depth, fmt, ..)`](reason_at!) | New error located `depth` frames further out |
//! | [`annotate_at!(err, depth, fmt, ..)`](annotate_at!) | Wrap, located `depth` frames further out |
//! | [`.annotate(msg)`](ResultExt::annotate) | Wrap the `Err` of a `Result` |
//!
//! Formatting follows [`format!`]. The `_at` forms exist for helpers that sit
//! between the real call site and the builder: a helper one level deep passes
//! `depth = 1` so the reported location is its caller, not itself.
//!
//! ## Panic as Early Return
//!
//! Deep call chains can skip the `?` plumbing: [`raise!`] unwinds with an
//! error, and [`catch`] turns it back into `Err`, adding a `PANIC:` line for
//! each frame between the two.
//!
//! ```rust
//! use errtrace::{catch, raise, Annotated};
//!
//! fn parse_port(s: &str) -> u16 {
//!     s.parse().unwrap_or_else(|_| raise!("bad port {:?}", s))
//! }
//!
//! fn configure(s: &str) -> Result<u16, Annotated> {
//!     catch(|| parse_port(s))
//! }
//!
//! assert_eq!(configure("8080").unwrap(), 8080);
//! let err = configure("http").unwrap_err().to_string();
//! assert!(err.contains("PANIC: "));
//! assert!(err.contains("bad port \"http\""));
//! ```
//!
//! Panics that did not come from `raise!` are never converted; they keep
//! unwinding as if `catch` were not there.
//!
//! ## Searching the Chain
//!
//! [`Annotated`] implements [`std::error::Error`] with the wrapped error as its
//! source. [`matches`], [`find`], and [`extract_as`] walk that chain, through
//! both annotation and panic-trace layers.
//!
//! ## Location Accuracy
//!
//! | Source | Used for | Needs debug info |
//! |--------|----------|------------------|
//! | `#[track_caller]` location | file and line at depth 0 | no |
//! | native stack (`backtrace`) | function names, depth > 0, panic traces | yes |
//!
//! Without debug info a depth-0 annotation still reads `file:line: ???() `,
//! while deeper locations degrade to `???: `. No operation ever fails because
//! of missing symbols. Release builds may fold a function into its caller
//! through tail calls, which shifts a stack-derived frame by one.

#![deny(unsafe_code)]

mod annotated;
mod bridge;
mod ext;
mod frame;
pub mod prelude;
mod search;
mod trim;

pub use annotated::{Annotated, BoxError, ERROR_PREFIX, annotate_at, reason_at};
pub use bridge::{Raised, catch, raise_at, recover_to_error};
pub use ext::ResultExt;
pub use frame::{Frame, Introspect, NativeStack, UNKNOWN_CALL_SITE, call_site, call_site_in};
pub use search::{Chain, extract_as, find, matches};
pub use trim::{PANIC_PREFIX, render_trace, trim_frames};

// ============================================================================
// Builder macros
// ============================================================================

/// Create an [`Annotated`] error located at the caller.
///
/// Takes the same arguments as [`format!`].
///
/// ```rust
/// use errtrace::reason;
///
/// let err = reason!("x = {} is negative", -3);
/// assert!(err.message().starts_with("ERROR: "));
/// assert!(err.message().ends_with("x = -3 is negative"));
/// ```
#[macro_export]
macro_rules! reason {
    ($($arg:tt)+) => {
        $crate::reason_at(0, ::core::format_args!($($arg)+))
    };
}

/// Create an [`Annotated`] error located `depth` frames above the caller.
///
/// ```rust
/// use errtrace::{reason_at, Annotated};
///
/// fn not_found(key: &str) -> Annotated {
///     reason_at!(1, "{} not found", key) // reports the caller of not_found
/// }
/// # let _ = not_found("k");
/// ```
#[macro_export]
macro_rules! reason_at {
    ($depth:expr, $($arg:tt)+) => {
        $crate::reason_at($depth, ::core::format_args!($($arg)+))
    };
}

/// Wrap an `Option<E>` error in a new [`Annotated`] node located at the
/// caller.
///
/// Evaluates to `Option<Annotated>`: `None` in, `None` out, and the message
/// is not even formatted.
///
/// ```rust
/// use errtrace::{annotate, reason, Annotated};
///
/// let err = annotate!(Some(reason!("inner")), "outer {}", 1).unwrap();
/// assert_eq!(err.depth(), 2);
///
/// assert!(annotate!(None::<Annotated>, "never shown").is_none());
/// ```
#[macro_export]
macro_rules! annotate {
    ($err:expr, $($arg:tt)+) => {
        $crate::annotate_at($err, 0, ::core::format_args!($($arg)+))
    };
}

/// Wrap an `Option<E>` error in a new [`Annotated`] node located `depth`
/// frames above the caller.
#[macro_export]
macro_rules! annotate_at {
    ($err:expr, $depth:expr, $($arg:tt)+) => {
        $crate::annotate_at($err, $depth, ::core::format_args!($($arg)+))
    };
}

/// Unwind with an [`Annotated`] error located at the caller.
///
/// Recover it with [`catch`] or [`recover_to_error`]. Evaluates to `!`.
///
/// A `raise!` nobody recovers does not print a panic message: the thread just
/// unwinds, and in `main` the process exits with code 101 and no output. Wrap
/// the program body in [`catch`] and report the error yourself:
///
/// ```rust,no_run
/// fn run() {
///     errtrace::raise!("config missing {}", "db.url");
/// }
///
/// fn main() {
///     if let Err(err) = errtrace::catch(run) {
///         eprintln!("{err}");
///         std::process::exit(1);
///     }
/// }
/// ```
#[macro_export]
macro_rules! raise {
    ($($arg:tt)+) => {
        $crate::raise_at(0, ::core::format_args!($($arg)+))
    };
}
