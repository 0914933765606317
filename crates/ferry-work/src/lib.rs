//! # ferry-work
//!
//! The mutable per-change context that Ferry transformations operate on.
//!
//! One [`TransformWork`] is built for every change being migrated. It owns
//! the checkout directory, the change message, the author and the list of
//! source changes folded into this migration. Transformations mutate it in
//! place, one after another.
//!
//! ## Key components
//!
//! - [`TransformWork`] — checkout root, message, author and change history.
//! - [`labels`] — pure functions over the trailing `KEY=VALUE` footer of a
//!   message. Every label operation on [`TransformWork`] goes through them.
//! - [`Glob`] — include/exclude path patterns, with an [`Glob::all_files`]
//!   sentinel and re-rooting via [`Glob::relative_to`].
//! - [`CheckoutPath`] — a validated checkout-relative path with
//!   parent/sibling navigation.
//! - [`Console`] — the progress/warning sink supplied by the caller.

pub mod author;
pub mod change;
pub mod console;
pub mod error;
pub mod glob;
pub mod labels;
pub mod path;
pub mod work;

pub use author::Author;
pub use change::{Changes, SourceChange};
pub use console::{CapturingConsole, Console, ConsoleMessage, LogConsole};
pub use error::WorkError;
pub use glob::{Glob, GlobMatcher};
pub use path::CheckoutPath;
pub use work::TransformWork;
