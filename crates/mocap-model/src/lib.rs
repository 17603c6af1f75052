//! Shared data model for the motion-capture processing pipeline.
//!
//! - **geometry**: 3-D points, homogeneous transform matrices, time ranges
//! - **table**: frame-indexed point tables (markers, raw force vectors) and
//!   flattened scalar tables (GRF channels, joint angles, moments)
//! - **records**: structured rows of the three tabular config files
//! - **artifacts**: the per-trial file naming contract shared by all stages

pub mod artifacts;
pub mod error;
pub mod geometry;
pub mod records;
pub mod table;

pub use artifacts::{ArtifactKind, SCALED_MODEL_FILE, parse_artifact_name};
pub use error::TableError;
pub use geometry::{DEFAULT_TRANSFORM, TimeRange, TransformMatrix, Vec3};
pub use records::{ExternalLoadDefinition, MarkerPair, MarkerWeight, ScalingMeasurement};
pub use table::{ForceTable, MarkerTable, PointTable, ScalarTable, TableMeta};
