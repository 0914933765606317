//! Pipeline configuration from `ferry.toml`
//!
//! ```toml
//! [options]
//! noop = "warn"
//!
//! [[transformations]]
//! type = "move"
//! before = "src"
//! after = "lib"
//! paths = { include = ["**/*.rs"], exclude = ["gen/**"] }
//!
//! [[transformations]]
//! type = "restore_author"
//! label = "ORIGINAL_AUTHOR"
//! ```
//!
//! Scripted transformations are not described here; callers that embed a
//! scripting engine add them to the built pipeline themselves.

use std::fs;
use std::path::{Path, PathBuf};

use ferry_work::Glob;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::{RestoreOriginalAuthor, SaveOriginalAuthor};
use crate::moves::Move;
use crate::options::WorkflowOptions;
use crate::transformation::{Sequence, Transformation};

/// Label used by the author pair when none is configured.
pub const DEFAULT_AUTHOR_LABEL: &str = "ORIGINAL_AUTHOR";

/// Errors loading or building a pipeline configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("transformation #{index} is invalid: {reason}")]
    Invalid { index: usize, reason: String },
}

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Options shared by every transformation
    #[serde(default)]
    pub options: WorkflowOptions,

    /// Transformations, applied in order
    #[serde(default)]
    pub transformations: Vec<TransformationConfig>,
}

/// One entry of `[[transformations]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformationConfig {
    Move {
        before: String,
        after: String,
        /// Only move matching files (relative to `before`)
        #[serde(default)]
        paths: Option<GlobConfig>,
    },
    RestoreAuthor {
        #[serde(default = "default_author_label")]
        label: String,
    },
    SaveAuthor {
        #[serde(default = "default_author_label")]
        label: String,
    },
    Noop,
}

/// Include/exclude patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobConfig {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_author_label() -> String {
    DEFAULT_AUTHOR_LABEL.to_string()
}

impl PipelineConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Turn the configuration into transformations
    pub fn build(&self) -> Result<Vec<Transformation>, ConfigError> {
        self.transformations
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .build(self.options)
                    .map_err(|reason| ConfigError::Invalid { index, reason })
            })
            .collect()
    }

    /// Build the whole pipeline as a single [`Sequence`]
    pub fn build_sequence(&self) -> Result<Sequence, ConfigError> {
        Ok(Sequence::new(self.build()?))
    }
}

impl TransformationConfig {
    fn build(&self, options: WorkflowOptions) -> Result<Transformation, String> {
        match self {
            TransformationConfig::Move {
                before,
                after,
                paths,
            } => {
                let glob = match paths {
                    Some(paths) => {
                        Glob::new(&paths.include, &paths.exclude).map_err(|e| e.to_string())?
                    }
                    None => Glob::all_files(),
                };
                let moved = Move::new(before, after, glob, options).map_err(|e| e.to_string())?;
                Ok(Transformation::Move(moved))
            }
            TransformationConfig::RestoreAuthor { label } => Ok(Transformation::RestoreAuthor(
                RestoreOriginalAuthor::new(label.clone()),
            )),
            TransformationConfig::SaveAuthor { label } => Ok(Transformation::SaveAuthor(
                SaveOriginalAuthor::new(label.clone()),
            )),
            TransformationConfig::Noop => Ok(Transformation::Noop),
        }
    }
}
