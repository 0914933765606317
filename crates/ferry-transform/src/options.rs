// options.rs — Workflow-wide options shared by transformations.

use ferry_work::Console;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};

/// What to do when a transformation finds nothing to do.
///
/// Source trees legitimately differ between changes, so the default is to
/// warn and carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoopPolicy {
    /// Print a warning and continue.
    #[default]
    Warn,
    /// Fail the current change.
    Fail,
}

/// Options that apply to every transformation in a workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOptions {
    #[serde(default)]
    pub noop: NoopPolicy,
}

impl WorkflowOptions {
    pub fn new(noop: NoopPolicy) -> Self {
        Self { noop }
    }

    /// Report that a transformation didn't change anything.
    pub fn report_noop(&self, console: &dyn Console, message: &str) -> Result<()> {
        match self.noop {
            NoopPolicy::Warn => {
                console.warn(message);
                Ok(())
            }
            NoopPolicy::Fail => Err(TransformError::Noop(message.to_string())),
        }
    }
}
