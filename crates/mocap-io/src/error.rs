//! Error types for reading and writing pipeline text files.

use std::path::PathBuf;

use mocap_model::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: header sentinel '{sentinel}' not found")]
    MissingSentinel {
        path: PathBuf,
        sentinel: &'static str,
    },

    #[error("{path}: no column label line starting with 'time' after the header")]
    MissingLabelLine { path: PathBuf },

    #[error("{path}, line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

impl FormatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
