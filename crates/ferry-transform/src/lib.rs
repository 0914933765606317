//! # ferry-transform
//!
//! Reversible transformations applied to a migration's work context.
//!
//! A pipeline is a list of [`Transformation`] values. Running it forward
//! migrates a change from origin to destination; [`reverse_all`] builds the
//! pipeline that goes the other way.
//!
//! ## Key components
//!
//! - [`Transformation`] — the closed set of transformations, with
//!   `transform`, `reverse` and `describe`.
//! - [`Move`] — rename a file or directory, optionally filtered by a glob.
//! - [`Scripted`] — run a function supplied by an embedded scripting engine.
//! - [`RestoreOriginalAuthor`] / [`SaveOriginalAuthor`] — carry the real
//!   author through a message label.
//! - [`PipelineConfig`] — build a pipeline from `ferry.toml`.

pub mod config;
pub mod error;
pub mod metadata;
pub mod moves;
pub mod options;
pub mod scripted;
pub mod transformation;

pub use config::{ConfigError, PipelineConfig, TransformationConfig};
pub use error::{Result, TransformError};
pub use metadata::{RestoreOriginalAuthor, SaveOriginalAuthor};
pub use moves::Move;
pub use options::{NoopPolicy, WorkflowOptions};
pub use scripted::{FnScript, ScriptError, ScriptFunction, Scripted};
pub use transformation::{reverse_all, ExplicitReversal, Sequence, Transformation};
