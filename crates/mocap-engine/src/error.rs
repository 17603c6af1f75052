use std::path::PathBuf;

use mocap_io::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{engine} does not support {operation}")]
    Unsupported {
        engine: &'static str,
        operation: &'static str,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("{tool} finished but did not produce {path}")]
    MissingOutput { tool: &'static str, path: PathBuf },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {document}: {message}")]
    Xml {
        document: &'static str,
        message: String,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
