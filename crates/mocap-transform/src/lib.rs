//! Data-level transformations applied between the engine's read and write
//! calls.
//!
//! - **coordinate**: frame remap of 3-D point tables
//! - **gap_fill**: spline reconstruction of short marker dropouts
//! - **relabel**: force-plate channel names to model GRF naming
//! - **missing**: per-column missing-sample counts

pub mod coordinate;
pub mod error;
pub mod gap_fill;
pub mod missing;
pub mod relabel;
mod spline;

pub use coordinate::{CoordinateTransform, transform_points};
pub use error::NumericError;
pub use gap_fill::{GapFillReport, fill_gaps};
pub use missing::count_missing;
pub use relabel::{relabel_force_columns, relabel_grf_label};
