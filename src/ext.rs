//! Extension trait for annotating `Result`s in place.
//!
//! [`ResultExt`] is the method-call form of [`annotate!`](crate::annotate!):
//! `Ok` passes through untouched, `Err` gets wrapped in a new [`Annotated`]
//! node located at the caller of the method.

use std::fmt;
use std::panic::Location;

use crate::annotated::{Annotated, BoxError, located};

/// Annotate the error of a `Result` with the caller's location and a message.
///
/// Works for any error convertible into a boxed error, including
/// [`Annotated`] itself, `std::io::Error`, and plain strings.
///
/// ```rust
/// use errtrace::{reason, Annotated, ResultExt};
///
/// fn load(path: &str) -> Result<String, Annotated> {
///     Err(reason!("{} does not exist", path))
/// }
///
/// fn init() -> Result<String, Annotated> {
///     load("/etc/app.toml").annotate("loading configuration")
/// }
///
/// let text = init().unwrap_err().to_string();
/// assert!(text.lines().next().unwrap().ends_with("loading configuration"));
/// assert!(text.lines().nth(1).unwrap().ends_with("/etc/app.toml does not exist"));
/// ```
pub trait ResultExt<T> {
    /// Wrap the error, if any, with `msg` at the caller's location.
    #[track_caller]
    fn annotate<M: fmt::Display>(self, msg: M) -> Result<T, Annotated>;

    /// Like [`annotate`](Self::annotate), with the message built only on `Err`.
    #[track_caller]
    fn annotate_with<M, F>(self, f: F) -> Result<T, Annotated>
    where
        M: fmt::Display,
        F: FnOnce() -> M;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    #[track_caller]
    #[inline(never)]
    fn annotate<M: fmt::Display>(self, msg: M) -> Result<T, Annotated> {
        match self {
            Ok(v) => Ok(v),
            // Skip this method's own frame.
            Err(e) => Err(Annotated::from_parts(
                located(1, Some(Location::caller()), format_args!("{msg}")),
                Some(e.into()),
            )),
        }
    }

    #[track_caller]
    #[inline(never)]
    fn annotate_with<M, F>(self, f: F) -> Result<T, Annotated>
    where
        M: fmt::Display,
        F: FnOnce() -> M,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => {
                let msg = f();
                Err(Annotated::from_parts(
                    located(1, Some(Location::caller()), format_args!("{msg}")),
                    Some(e.into()),
                ))
            }
        }
    }
}
