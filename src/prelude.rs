//! Convenient re-exports for common usage.
//!
//! ## Usage
//!
//! ```rust
//! use errtrace::prelude::*;
//!
//! fn inner() -> Result<(), Annotated> {
//!     Err(reason!("disk full"))
//! }
//!
//! fn outer() -> Result<(), Annotated> {
//!     inner().annotate("saving report")
//! }
//! # assert!(outer().is_err());
//! ```

pub use crate::Annotated;
pub use crate::ResultExt;
pub use crate::{annotate, catch, raise, reason};
