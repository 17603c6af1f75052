//! The seven operations the pipeline needs from a biomechanical engine.

use std::path::{Path, PathBuf};

use mocap_model::{
    ExternalLoadDefinition, MarkerTable, MarkerWeight, PointTable, ScalarTable, ScalingMeasurement,
    TimeRange, Vec3,
};

use crate::error::EngineError;

/// Force group excluded from inverse dynamics so only external and joint
/// level generalized forces remain in the output.
pub const MUSCLES_FORCE_GROUP: &str = "Muscles";

/// Tables read from one capture file.
#[derive(Debug, Clone)]
pub struct Capture {
    pub markers: MarkerTable,
    /// Force-plate vectors (force, point, moment per platform); `None` when the
    /// capture has no analog force data.
    pub forces: Option<PointTable>,
}

/// Inputs for model scaling from a static trial.
#[derive(Debug, Clone)]
pub struct ScaleRequest<'a> {
    /// Tool name; also the stem of the generated setup file.
    pub name: &'a str,
    pub generic_model: &'a Path,
    pub marker_file: &'a Path,
    pub time_range: TimeRange,
    pub subject_mass: f64,
    pub measurements: &'a [ScalingMeasurement],
    pub marker_weights: &'a [MarkerWeight],
    pub output_model: &'a Path,
}

/// Inputs for inverse kinematics of one trial.
#[derive(Debug, Clone)]
pub struct IkRequest<'a> {
    pub trial: &'a str,
    pub model: &'a Path,
    pub marker_file: &'a Path,
    pub marker_weights: &'a [MarkerWeight],
    pub time_range: TimeRange,
    /// Joint-angle file to produce (`<trial>_ik.mot`).
    pub output: &'a Path,
}

/// Inputs for inverse dynamics of one trial.
#[derive(Debug, Clone)]
pub struct IdRequest<'a> {
    pub trial: &'a str,
    pub model: &'a Path,
    pub coordinates_file: &'a Path,
    pub forces_file: &'a Path,
    pub external_loads: &'a [ExternalLoadDefinition],
    pub excluded_forces: &'a [&'a str],
    pub low_pass_cutoff: f64,
    pub time_range: TimeRange,
    /// Generalized-force file to produce (`<trial>_id.sto`).
    pub output: &'a Path,
}

impl IdRequest<'_> {
    /// Directory results are written into.
    pub fn results_dir(&self) -> &Path {
        self.output.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Location of the generated external-load descriptor.
    pub fn external_loads_file(&self) -> PathBuf {
        self.results_dir()
            .join(format!("{}_external_loads.xml", self.trial))
    }
}

/// One frame of generalized coordinates, angles in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateFrame {
    pub time: f64,
    pub values: Vec<(String, f64)>,
}

/// Operations the pipeline delegates to the external engine.
///
/// Implementations own file formats and solvers; callers only pass tables,
/// paths and config records.
pub trait BiomechEngine {
    /// Read markers and, when present, force-plate data from a capture file.
    fn read_capture(&self, path: &Path) -> Result<Capture, EngineError>;

    /// Write a marker table as a TRC file.
    fn write_markers(&self, table: &MarkerTable, path: &Path) -> Result<(), EngineError>;

    /// Write a scalar table as a storage (`.mot`/`.sto`) file.
    fn write_time_series(&self, table: &ScalarTable, path: &Path) -> Result<(), EngineError>;

    /// Scale the generic model; returns the scaled model path.
    fn scale_model(&self, request: &ScaleRequest<'_>) -> Result<PathBuf, EngineError>;

    /// Solve joint angles; returns the produced `_ik` file.
    fn solve_ik(&self, request: &IkRequest<'_>) -> Result<PathBuf, EngineError>;

    /// Solve joint moments; returns the produced `_id` file.
    fn solve_id(&self, request: &IdRequest<'_>) -> Result<PathBuf, EngineError>;

    /// Pose `model` at `frame` and return the whole-body mass center.
    fn mass_center(&self, model: &Path, frame: &CoordinateFrame) -> Result<Vec3, EngineError>;
}
