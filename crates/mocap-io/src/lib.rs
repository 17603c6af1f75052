//! Text file formats exchanged between pipeline stages.
//!
//! - **trc**: marker trajectories
//! - **storage**: generic scalar time series (`.mot` / `.sto`)
//! - **header**: canonical rewrite of a storage file's metadata header

pub mod error;
pub mod header;
pub mod storage;
pub mod trc;

pub use error::FormatError;
pub use header::{HeaderSummary, normalize_header, normalize_header_text};
pub use storage::{read_storage, write_storage};
pub use trc::{read_trc, write_trc};

/// Line terminating a storage file's metadata header.
pub const END_HEADER: &str = "endheader";

pub(crate) fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
