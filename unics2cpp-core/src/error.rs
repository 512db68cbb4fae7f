use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

/// Fatal failures of the in-editor build step.
///
/// Unresolved optional settings are never errors; only the mandatory
/// selector and the build itself can abort the invocation.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no {selector} could be resolved from the command line")]
    MissingSelector { selector: &'static str },

    #[error("player build failed: {0}")]
    Pipeline(String),

    #[error("failed to {operation} {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EditorError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        EditorError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
