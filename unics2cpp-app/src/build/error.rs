use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Fatal orchestration failures. Each aborts the run; the workspace is
/// still removed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to {operation} {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("helper binary {name} not found next to the executable or in configuration")]
    HelperMissing { name: &'static str },

    #[error("failed to start toolchain {}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("destination {} already exists", path.display())]
    DestinationExists { path: PathBuf },

    #[error("invalid toolchain configuration: {0}")]
    Config(String),

    #[error("failed to parse toolchain configuration {}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl BuildError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
