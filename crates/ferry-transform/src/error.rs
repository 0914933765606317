// error.rs — Error types for transformations.

use std::path::PathBuf;

use ferry_work::WorkError;
use thiserror::Error;

/// Errors that can occur while applying or reversing a transformation.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A user-fixable configuration or input problem. Aborts the current
    /// change's pipeline.
    #[error("{0}")]
    Validation(String),

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `reverse()` was requested on a one-directional transformation.
    #[error("transformation is not reversible: {0}")]
    NonReversible(String),

    /// A transformation found nothing to do and the workflow is configured
    /// to fail on no-ops.
    #[error("{0}")]
    Noop(String),

    /// The transformation was interrupted from outside. Never converted
    /// into any other error.
    #[error("transformation '{name}' was cancelled")]
    Cancelled { name: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransformError::IoError {
            path: path.into(),
            source,
        }
    }

    /// Problems the user can fix by changing config or input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TransformError::Validation(_)
                | TransformError::NonReversible(_)
                | TransformError::Noop(_)
        )
    }

    /// Errors that must stop the whole run, not just the current change.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransformError::Cancelled { .. })
    }
}

impl From<WorkError> for TransformError {
    fn from(err: WorkError) -> Self {
        match err {
            WorkError::IoError { path, source } => TransformError::IoError { path, source },
            other => TransformError::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_io_errors_stay_io() {
        let err: TransformError = WorkError::IoError {
            path: PathBuf::from("/x"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        assert!(matches!(err, TransformError::IoError { .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn work_path_errors_become_validation() {
        let err: TransformError = WorkError::InvalidPath {
            path: "../x".into(),
            reason: "path escapes the checkout".into(),
        }
        .into();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "'../x' is not a valid path: path escapes the checkout"
        );
    }

    #[test]
    fn only_cancellation_is_fatal() {
        assert!(TransformError::Cancelled { name: "f".into() }.is_fatal());
        assert!(!TransformError::Validation("x".into()).is_fatal());
        assert!(!TransformError::NonReversible("x".into()).is_fatal());
    }
}
