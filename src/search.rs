//! Searching an error's source chain.
//!
//! These are thin wrappers over [`Error::source`] and [`Error::downcast_ref`]:
//! they look at the error itself, then at whatever it wraps, and so on.
//! Nodes produced by [`annotate!`](crate::annotate!) and by panic recovery
//! are ordinary links in that chain, so neither hides the original error.

use std::error::Error;

/// Iterator over an error and its sources, newest first.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Chain<'a> {
    /// Start iterating at `err`.
    pub fn new(err: &'a (dyn Error + 'static)) -> Self {
        Self { next: Some(err) }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Report whether `target` appears anywhere in `err`'s chain, `err` included.
///
/// Each link of type `T` is compared by value with `T`'s `PartialEq`, which
/// is also the hook for custom equality. This is meant for your own error
/// types: [`Annotated`](crate::Annotated) has no `PartialEq`, so to look for
/// an annotation layer use [`find`] and inspect its
/// [`message`](crate::Annotated::message) instead.
///
/// ```rust
/// use errtrace::{annotate, matches};
///
/// #[derive(Debug, Clone, PartialEq, thiserror::Error)]
/// #[error("quota exceeded")]
/// struct QuotaExceeded;
///
/// let err = annotate!(Some(QuotaExceeded), "upload failed").unwrap();
/// assert!(matches(&err, &QuotaExceeded));
/// ```
pub fn matches<T>(err: &(dyn Error + 'static), target: &T) -> bool
where
    T: Error + PartialEq + 'static,
{
    Chain::new(err).any(|e| e.downcast_ref::<T>() == Some(target))
}

/// Find the first link in `err`'s chain that is a `T`.
pub fn find<'a, T: Error + 'static>(err: &'a (dyn Error + 'static)) -> Option<&'a T> {
    Chain::new(err).find_map(|e| e.downcast_ref::<T>())
}

/// Copy the first link of type `T` in `err`'s chain into `slot`.
///
/// Returns `false`, leaving `slot` untouched, when there is no such link.
///
/// ```rust
/// use errtrace::{annotate, extract_as};
///
/// #[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
/// #[error("http status {0}")]
/// struct Status(u16);
///
/// let err = annotate!(Some(Status(503)), "fetch").unwrap();
/// let mut status = Status::default();
/// assert!(extract_as(&err, &mut status));
/// assert_eq!(status, Status(503));
/// ```
pub fn extract_as<T>(err: &(dyn Error + 'static), slot: &mut T) -> bool
where
    T: Error + Clone + 'static,
{
    match find::<T>(err) {
        Some(found) => {
            slot.clone_from(found);
            true
        }
        None => false,
    }
}
