use thiserror::Error;

/// Errors raised while building or mutating a table.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    #[error("timestamps must be strictly increasing ({previous} then {time})")]
    NonIncreasingTime { previous: f64, time: f64 },

    #[error("duplicate column label: {label}")]
    DuplicateLabel { label: String },

    #[error("label count mismatch: table has {expected} columns, got {actual} labels")]
    LabelCountMismatch { expected: usize, actual: usize },
}
