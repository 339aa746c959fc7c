//! The [`Annotated`] chain node and the builders that create it.
//!
//! An `Annotated` is an immutable error holding one located message and,
//! optionally, the error it wraps. Each builder call captures the caller's
//! file, line, and function, so a chain read top to bottom is the path the
//! error took, newest first:
//!
//! ```text
//! ERROR: src/api.rs:89: myapp::api::handle() cannot serve user 42
//! ERROR: src/db.rs:142: myapp::db::query() user 42 not found
//! ```

use std::error::Error;
use std::fmt;
use std::panic::Location;

use crate::frame::{NativeStack, site_of};
use crate::search::Chain;

/// Boxed, thread-safe error used for wrapped predecessors.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Prefix of every located annotation line.
pub const ERROR_PREFIX: &str = "ERROR: ";

// ============================================================================
// Annotated - the chain node
// ============================================================================

/// An error message tagged with its call site, optionally wrapping an earlier
/// error.
///
/// Created by [`reason!`](crate::reason!), [`annotate!`](crate::annotate!),
/// [`ResultExt`](crate::ResultExt), or by [`recover_to_error`](crate::recover_to_error)
/// when a raised panic is converted back. Never mutated after construction.
///
/// ## Rendering
///
/// Both `Display` and `Debug` render the whole chain: this node's message,
/// then the rendering of the wrapped error on the following lines.
///
/// ```rust
/// use errtrace::{annotate, reason};
///
/// let inner = reason!("disk {} is full", "/dev/sda1");
/// let outer = annotate!(Some(inner), "cannot save").unwrap();
///
/// let text = outer.to_string();
/// let lines: Vec<_> = text.lines().collect();
/// assert_eq!(lines.len(), 2);
/// assert!(lines[0].ends_with("cannot save"));
/// assert!(lines[1].ends_with("disk /dev/sda1 is full"));
/// ```
///
/// ## Source chain
///
/// [`Error::source`] returns the wrapped error, so generic tooling such as
/// [`matches`](crate::matches), [`extract_as`](crate::extract_as), or `anyhow`
/// walks through annotation layers to the original error.
pub struct Annotated {
    message: String,
    wrapped: Option<BoxError>,
}

impl Annotated {
    pub(crate) fn from_parts(message: String, wrapped: Option<BoxError>) -> Self {
        debug_assert!(!message.is_empty());
        Self { message, wrapped }
    }

    /// This node's own message, including the `ERROR: file:line: function() `
    /// prefix (or the panic trace, for converted panics).
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error this node wraps, if any.
    #[inline]
    pub fn wrapped(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.wrapped.as_deref()
    }

    /// Iterate over this node and every error below it, newest first.
    ///
    /// ```rust
    /// use errtrace::{annotate, reason};
    ///
    /// let err = annotate!(Some(reason!("root")), "middle").unwrap();
    /// assert_eq!(err.chain().count(), 2);
    /// ```
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    /// Number of nodes in the chain, this one included.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }
}

// ============================================================================
// Formatting and Error impls
// ============================================================================

impl fmt::Display for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(wrapped) = &self.wrapped {
            write!(f, "\n{}", wrapped)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for Annotated {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.wrapped.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Format `args` behind the `ERROR: ` prefix and the call site `skip` levels
/// above the caller, taking file and line from `caller` when given.
#[inline(never)]
pub(crate) fn located(
    skip: usize,
    caller: Option<&Location<'_>>,
    args: fmt::Arguments<'_>,
) -> String {
    let site = site_of(&NativeStack, skip.saturating_add(1), caller);
    format!("{}{}{}", ERROR_PREFIX, site, args)
}

/// Caller location of the public entry point, kept only at `depth == 0`.
#[track_caller]
#[inline]
pub(crate) fn caller_at(depth: usize) -> Option<&'static Location<'static>> {
    if depth == 0 { Some(Location::caller()) } else { None }
}

/// Create a new error located `depth` frames above the caller.
///
/// `depth = 0` reports the function calling `reason_at`, with file and line
/// from its caller location. Use a larger depth from helpers that sit between
/// the real call site and this builder; a depth beyond the stack gives
/// `???: ` rather than failing.
/// Most code wants the [`reason!`](crate::reason!) macro instead.
///
/// ```rust
/// use errtrace::{reason_at, Annotated};
///
/// // Reports the caller of `invalid`, not `invalid` itself.
/// fn invalid(what: &str) -> Annotated {
///     reason_at(1, format_args!("invalid {}", what))
/// }
///
/// let err = invalid("port");
/// assert!(err.message().ends_with("invalid port"));
/// ```
#[track_caller]
#[inline(never)]
pub fn reason_at(depth: usize, args: fmt::Arguments<'_>) -> Annotated {
    let caller = caller_at(depth);
    Annotated::from_parts(located(depth.saturating_add(1), caller, args), None)
}

/// Wrap `err` in a new node located `depth` frames above the caller.
///
/// Returns `None`, without capturing anything, when `err` is `None`:
/// annotation never manufactures an error.
/// Most code wants the [`annotate!`](crate::annotate!) macro instead.
#[track_caller]
#[inline(never)]
pub fn annotate_at<E>(err: Option<E>, depth: usize, args: fmt::Arguments<'_>) -> Option<Annotated>
where
    E: Into<BoxError>,
{
    let err = err?;
    let message = located(depth.saturating_add(1), caller_at(depth), args);
    Some(Annotated::from_parts(message, Some(err.into())))
}
