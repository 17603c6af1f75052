use std::path::PathBuf;

use mocap_engine::EngineError;
use mocap_io::FormatError;
use mocap_model::TableError;
use mocap_transform::NumericError;
use thiserror::Error;

/// Expected inputs that are not on disk. Logged, and the affected stage or
/// trial is skipped.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no capture files found in {folder}")]
    NoCaptureFiles { folder: PathBuf },

    #[error("no static trial found (pattern: '{pattern}')")]
    NoStaticTrial { pattern: String },

    #[error("no marker files to process (excluding static trials)")]
    NoMarkerFiles,

    #[error("no inverse kinematics results found")]
    NoKinematics,

    #[error("scaled model not found at {path}; run scaling first")]
    MissingScaledModel { path: PathBuf },

    #[error("no GRF file for trial {trial} ({expected})")]
    MissingForces { trial: String, expected: String },

    #[error("{path} contains no frames")]
    EmptyTrial { path: PathBuf },
}

/// Failure of one stage or one trial within a stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Numeric(#[from] NumericError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
