//! Stack introspection: captured frames and the call-site capturer.
//!
//! This module provides the [`Frame`] snapshot, the [`Introspect`] capability
//! trait, and [`NativeStack`], the implementation backed by the `backtrace`
//! crate. [`call_site`] turns a frame into the `"file:line: function() "`
//! prefix carried by every annotation.
//!
//! ## Skip counting
//!
//! Every `skip` parameter in this crate counts *logical* frames above the
//! function that received it: `0` is the immediate caller, `1` its caller, and
//! so on. Inlined functions are resolved into their own logical frames, so the
//! count does not depend on the optimizer as long as the crate's entry points
//! stay `#[inline(never)]`.
//!
//! ## Caller locations
//!
//! Entry points are also `#[track_caller]`. At depth `0` the file and line
//! are taken from [`Location::caller`], which needs no debug info, so release
//! builds still report where an error was made. Symbols are then only needed
//! for the function name, which falls back to `???`.

use std::fmt;
use std::panic::Location;

// ============================================================================
// Frame
// ============================================================================

/// One resolved stack entry: source file, line, and function name.
///
/// Any part the platform cannot resolve is `None`. Function names are
/// demangled without the trailing symbol hash, e.g. `myapp::db::query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    pub(crate) file: Option<String>,
    pub(crate) line: Option<u32>,
    pub(crate) function: Option<String>,
}

impl Frame {
    /// Create a fully resolved frame.
    ///
    /// ```rust
    /// use errtrace::Frame;
    ///
    /// let frame = Frame::new("src/db.rs", 42, "myapp::db::query");
    /// assert_eq!(frame.file(), Some("src/db.rs"));
    /// assert_eq!(frame.line(), Some(42));
    /// assert_eq!(frame.function(), Some("myapp::db::query"));
    /// ```
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            function: Some(function.into()),
        }
    }

    /// A frame the platform returned no symbol for.
    pub const fn unresolved() -> Self {
        Self {
            file: None,
            line: None,
            function: None,
        }
    }

    fn from_symbol(symbol: &backtrace::Symbol) -> Self {
        Self {
            file: symbol.filename().map(|p| p.display().to_string()),
            line: symbol.lineno(),
            // Alternate formatting drops the `::h0123abcd` hash suffix.
            function: symbol.name().map(|name| format!("{name:#}")),
        }
    }

    /// Source file path, as recorded in debug info.
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Source line number.
    #[inline]
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Demangled function path.
    #[inline]
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// True when both the file and the line are known.
    #[inline]
    pub fn has_location(&self) -> bool {
        self.file.is_some() && self.line.is_some()
    }
}

impl fmt::Display for Frame {
    /// `file:line function()`, with `???` for unknown parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}()",
            self.file().unwrap_or("???"),
            self.line.unwrap_or(0),
            self.function().unwrap_or("???"),
        )
    }
}

// ============================================================================
// Introspect - the stack capture capability
// ============================================================================

/// Capability to look at the calling thread's own stack.
///
/// [`NativeStack`] is the real implementation. Other implementations are
/// useful in tests, or on targets where symbol resolution is unavailable.
pub trait Introspect {
    /// Resolve the single frame `skip` levels up the stack, where `0` is the
    /// function calling `capture`.
    ///
    /// Returns `None` if the stack is shallower than that or cannot be walked.
    fn capture(&self, skip: usize) -> Option<Frame>;

    /// Resolve every frame from `skip` levels up the stack outward, innermost
    /// first. `0` starts at the function calling `capture_all`.
    fn capture_all(&self, skip: usize) -> Vec<Frame>;
}

/// [`Introspect`] over the native call stack, via the `backtrace` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeStack;

impl Introspect for NativeStack {
    #[inline(never)]
    fn capture(&self, skip: usize) -> Option<Frame> {
        walk(skip.saturating_add(1), 1).into_iter().next()
    }

    #[inline(never)]
    fn capture_all(&self, skip: usize) -> Vec<Frame> {
        walk(skip.saturating_add(1), usize::MAX)
    }
}

/// Resolve up to `limit` logical frames, starting `skip` frames above the
/// caller of `walk`.
///
/// The walk is anchored on this function's own symbol address, which makes the
/// count independent of how many frames the unwinder itself contributes.
#[inline(never)]
fn walk(skip: usize, limit: usize) -> Vec<Frame> {
    let anchor = walk as fn(usize, usize) -> Vec<Frame> as usize;
    let mut anchored = false;
    let mut raw = Vec::new();
    backtrace::trace(|frame| {
        if anchored {
            raw.push(frame.clone());
        } else if frame.symbol_address() as usize == anchor {
            anchored = true;
        }
        true
    });

    let wanted = skip.saturating_add(limit);
    let mut frames = Vec::new();
    for frame in &raw {
        let before = frames.len();
        // Inlined calls resolve to several symbols, innermost first.
        backtrace::resolve_frame(frame, |symbol| frames.push(Frame::from_symbol(symbol)));
        if frames.len() == before {
            frames.push(Frame::unresolved());
        }
        if frames.len() >= wanted {
            break;
        }
    }
    frames.into_iter().skip(skip).take(limit).collect()
}

// ============================================================================
// Call-site capturer
// ============================================================================

/// Placeholder used when the call site cannot be resolved.
pub const UNKNOWN_CALL_SITE: &str = "???: ";

/// Format the call site `skip` levels above the caller as
/// `"<file>:<line>: <function>() "` (note the trailing space).
///
/// With `skip = 0` the file and line come from the compiler's caller
/// location and are always known; only the function name needs symbols.
/// Further out, everything is read from the native stack, and
/// [`UNKNOWN_CALL_SITE`] is returned when the frame cannot be resolved. This
/// function never fails.
///
/// ```rust
/// fn here() -> String {
///     errtrace::call_site(0)
/// }
///
/// let site = here();
/// assert!(site.ends_with("() "));
/// assert_ne!(site, errtrace::UNKNOWN_CALL_SITE);
/// ```
#[track_caller]
#[inline(never)]
pub fn call_site(skip: usize) -> String {
    let caller = if skip == 0 { Some(Location::caller()) } else { None };
    site_of(&NativeStack, skip.saturating_add(1), caller)
}

/// Like [`call_site`], but resolving through the given [`Introspect`].
///
/// No caller location is used here: file and line come from `stack` alone.
#[inline(never)]
pub fn call_site_in<S: Introspect + ?Sized>(stack: &S, skip: usize) -> String {
    site_of(stack, skip.saturating_add(1), None)
}

/// Format the frame `skip` levels above the caller of `site_of`.
///
/// A `caller` location, when given, supplies file and line; `stack` then only
/// contributes the function name.
#[inline(never)]
pub(crate) fn site_of<S: Introspect + ?Sized>(
    stack: &S,
    skip: usize,
    caller: Option<&Location<'_>>,
) -> String {
    let frame = stack.capture(skip.saturating_add(1));
    if let Some(loc) = caller {
        let function = frame.as_ref().and_then(Frame::function).unwrap_or("???");
        return format!("{}:{}: {}() ", loc.file(), loc.line(), function);
    }
    match frame {
        Some(frame) if frame.has_location() => format!(
            "{}:{}: {}() ",
            frame.file().unwrap_or("???"),
            frame.line().unwrap_or(0),
            frame.function().unwrap_or("???"),
        ),
        _ => {
            tracing::trace!(skip, "call site unavailable, using placeholder");
            UNKNOWN_CALL_SITE.to_string()
        }
    }
}
