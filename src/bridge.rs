//! Panic as a shortcut for returning an error.
//!
//! [`raise!`](crate::raise!) unwinds out of any depth of calls carrying an
//! [`Annotated`] error. [`catch`] (or [`recover_to_error`] on a payload from
//! your own `catch_unwind`) turns it back into an ordinary error whose
//! message lists every call frame between the raise and the recovery point:
//!
//! ```text
//! PANIC: src/app.rs:12 myapp::run::{{closure}}()
//! PANIC: src/app.rs:20 myapp::load()
//! PANIC: src/app.rs:31 myapp::parse()
//! ERROR: src/app.rs:31: myapp::parse() bad header
//! ```
//!
//! Only payloads created by `raise!` are converted. Any other panic passes
//! through unchanged.
//!
//! The unwind is started with [`std::panic::resume_unwind`], so the panic hook
//! does not print anything for raised errors. Builds with `panic = "abort"`
//! abort on `raise!` instead.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::annotated::{Annotated, caller_at, located};
use crate::frame::{Frame, Introspect, NativeStack};
use crate::trim::{render_trace, trim_frames};

/// Demangled name of [`raise_at`], marking where raised stacks begin.
pub(crate) const DISPATCH_FUNCTION: &str = concat!(module_path!(), "::raise_at");

// ============================================================================
// Raised - the unwind payload
// ============================================================================

/// Panic payload carried by [`raise!`](crate::raise!).
///
/// Holds the error and the stack captured at the raise site, innermost first
/// and untrimmed. You only see this type when running `catch_unwind` yourself;
/// hand the payload to [`recover_to_error`] to convert it.
pub struct Raised {
    pub(crate) error: Annotated,
    pub(crate) frames: Vec<Frame>,
}

impl Raised {
    /// The raised error, without trace.
    pub fn error(&self) -> &Annotated {
        &self.error
    }

    /// The captured stack, innermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Wrap the raised error in a node whose message is the trimmed trace.
    ///
    /// Falls back to the bare error when no frame survives trimming.
    pub fn into_error(self) -> Annotated {
        let frames = trim_frames(self.frames);
        if frames.is_empty() {
            tracing::debug!("no frames left after trimming, returning error without trace");
            return self.error;
        }
        tracing::debug!(frames = frames.len(), "converted raised panic to error");
        Annotated::from_parts(render_trace(&frames), Some(Box::new(self.error)))
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raised")
            .field("error", &self.error)
            .field("frames", &self.frames.len())
            .finish()
    }
}

// ============================================================================
// Raise
// ============================================================================

/// Unwind with an error located `depth` frames above the caller.
///
/// Equivalent to building the error with [`reason_at`](crate::reason_at) and
/// returning it all the way up to the nearest [`catch`]. Most code wants the
/// [`raise!`](crate::raise!) macro instead.
///
/// With no [`catch`] or [`recover_to_error`] above it, the unwind ends the
/// thread silently, since the panic hook is skipped. On the main thread the
/// process exits with code 101 and prints nothing; the error is only visible
/// as a `tracing` debug event emitted before unwinding.
#[track_caller]
#[inline(never)]
pub fn raise_at(depth: usize, args: fmt::Arguments<'_>) -> ! {
    let caller = caller_at(depth);
    let error = Annotated::from_parts(located(depth.saturating_add(1), caller, args), None);
    tracing::debug!(error = %error, "raising error as panic");
    // Starts at this very frame, which is the dispatch marker.
    let frames = NativeStack.capture_all(0);
    panic::resume_unwind(Box::new(Raised { error, frames }))
}

// ============================================================================
// Recover
// ============================================================================

/// Convert a recovered panic payload back into an error.
///
/// - `None` (nothing panicked) gives `None`.
/// - A [`Raised`] payload gives its error, wrapped in a node listing the call
///   frames from the recovery point down to the raise site.
/// - Anything else is re-raised unchanged with [`std::panic::resume_unwind`].
///
/// ```rust
/// use errtrace::{raise, recover_to_error};
///
/// fn parse(input: &str) -> u32 {
///     input.parse().unwrap_or_else(|_| raise!("not a number: {:?}", input))
/// }
///
/// let payload = std::panic::catch_unwind(|| parse("x")).err();
/// let err = recover_to_error(payload).unwrap();
/// assert!(err.to_string().contains("not a number: \"x\""));
///
/// assert!(recover_to_error(None).is_none());
/// ```
pub fn recover_to_error(payload: Option<Box<dyn Any + Send>>) -> Option<Annotated> {
    payload.map(convert)
}

/// Run `body`, turning a [`raise!`](crate::raise!) inside it into `Err`.
///
/// Foreign panics keep unwinding through `catch` untouched.
///
/// ```rust
/// use errtrace::{catch, raise, Annotated};
///
/// fn check(n: i32) -> i32 {
///     if n < 0 {
///         raise!("n = {} is negative", n);
///     }
///     n
/// }
///
/// fn run(n: i32) -> Result<i32, Annotated> {
///     catch(|| check(n) * 2)
/// }
///
/// assert_eq!(run(4).unwrap(), 8);
/// assert!(run(-1).unwrap_err().to_string().contains("n = -1 is negative"));
/// ```
#[inline(never)]
pub fn catch<T, F>(body: F) -> Result<T, Annotated>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(body)).map_err(convert)
}

fn convert(payload: Box<dyn Any + Send>) -> Annotated {
    match payload.downcast::<Raised>() {
        Ok(raised) => (*raised).into_error(),
        Err(foreign) => {
            tracing::trace!("re-raising foreign panic payload");
            panic::resume_unwind(foreign)
        }
    }
}
