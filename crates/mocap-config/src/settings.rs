//! Run configuration (TOML).
//!
//! Every relative path is resolved against the directory containing the
//! configuration file, so a config and its tables can move together.
//!
//! ```toml
//! coordinate_transform = [[0, 0, -1, 0], [-1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 0, 1]]
//!
//! [subject]
//! mass = 72.5
//!
//! [paths]
//! c3d_folder = "data"
//! output_folder = "output"
//!
//! [steps]
//! inverse_dynamics = false
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use mocap_model::{DEFAULT_TRANSFORM, TimeRange, TransformMatrix};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::pattern::StaticPattern;

const DEFAULT_MASS_KG: f64 = 79.0;
const DEFAULT_STATIC_PATTERN: &str = "*static*";
const DEFAULT_LOW_PASS_HZ: f64 = 6.0;
const DEFAULT_ENGINE: &str = "opensim-cmd";

/// Processing stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Export,
    Scaling,
    InverseKinematics,
    InverseDynamics,
    CenterOfMass,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Export,
        Stage::Scaling,
        Stage::InverseKinematics,
        Stage::InverseDynamics,
        Stage::CenterOfMass,
    ];

    /// Key under `[steps]` in the configuration file.
    pub const fn config_key(self) -> &'static str {
        match self {
            Stage::Export => "c3d_export",
            Stage::Scaling => "scaling",
            Stage::InverseKinematics => "inverse_kinematics",
            Stage::InverseDynamics => "inverse_dynamics",
            Stage::CenterOfMass => "center_of_mass",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stage::Export => "export",
            Stage::Scaling => "scaling",
            Stage::InverseKinematics => "ik",
            Stage::InverseDynamics => "id",
            Stage::CenterOfMass => "com",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved, absolute filesystem locations.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPaths {
    pub capture_folder: PathBuf,
    pub output_folder: PathBuf,
    pub generic_model: PathBuf,
    pub scaling_measurements: PathBuf,
    pub marker_weights: PathBuf,
    pub external_loads: PathBuf,
}

/// Typed, resolved run settings. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub subject_mass: f64,
    pub paths: ConfigPaths,
    pub stages: BTreeMap<Stage, bool>,
    pub static_pattern: StaticPattern,
    pub coordinate_transform: TransformMatrix,
    pub ik_time_range: Option<TimeRange>,
    pub id_time_range: Option<TimeRange>,
    pub low_pass_cutoff: f64,
    pub max_gap_frames: usize,
    pub engine_executable: PathBuf,
}

impl PipelineConfig {
    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.stages.get(&stage).copied().unwrap_or(false)
    }

    pub fn enabled_stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|stage| self.is_enabled(*stage))
    }

    /// Parse a TOML document, resolving relative paths against `base_dir`.
    pub fn from_toml_str(contents: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents).map_err(|e| ConfigError::Toml {
            path: base_dir.to_path_buf(),
            source: e,
        })?;
        raw.resolve(base_dir)
    }
}

/// Load and validate the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let absolute = std::fs::canonicalize(path).map_err(|e| ConfigError::io(path, e))?;
    let base_dir = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));
    PipelineConfig::from_toml_str(&contents, &base_dir).map_err(|err| match err {
        ConfigError::Toml { source, .. } => ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    subject: RawSubject,
    #[serde(default)]
    paths: RawPaths,
    #[serde(default)]
    steps: RawSteps,
    #[serde(default)]
    trials: RawTrials,
    coordinate_transform: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    inverse_kinematics: RawInverseKinematics,
    #[serde(default)]
    inverse_dynamics: RawInverseDynamics,
    #[serde(default)]
    gap_fill: RawGapFill,
    #[serde(default)]
    engine: RawEngine,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSubject {
    #[serde(default = "default_mass")]
    mass: f64,
}

impl Default for RawSubject {
    fn default() -> Self {
        Self {
            mass: default_mass(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPaths {
    c3d_folder: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    generic_model: Option<PathBuf>,
    scaling_measurements_tsv: Option<PathBuf>,
    ik_marker_weights_tsv: Option<PathBuf>,
    external_loads_tsv: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSteps {
    c3d_export: Option<bool>,
    scaling: Option<bool>,
    inverse_kinematics: Option<bool>,
    inverse_dynamics: Option<bool>,
    center_of_mass: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTrials {
    static_pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInverseKinematics {
    time_range: Option<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInverseDynamics {
    low_pass_cutoff_frequency: Option<f64>,
    time_range: Option<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGapFill {
    #[serde(default)]
    max_gap_frames: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngine {
    executable: Option<PathBuf>,
}

fn default_mass() -> f64 {
    DEFAULT_MASS_KG
}

impl RawConfig {
    fn resolve(self, base_dir: &Path) -> Result<PipelineConfig, ConfigError> {
        let mass = self.subject.mass;
        if !mass.is_finite() || mass <= 0.0 {
            return Err(ConfigError::invalid(format!(
                "subject.mass must be a positive number, got {mass}"
            )));
        }

        let resolve = |value: Option<PathBuf>, default: &str| -> PathBuf {
            resolve_path(base_dir, &value.unwrap_or_else(|| PathBuf::from(default)))
        };
        let paths = ConfigPaths {
            capture_folder: resolve(self.paths.c3d_folder, "data"),
            output_folder: resolve(self.paths.output_folder, "output"),
            generic_model: resolve(
                self.paths.generic_model,
                "model/RajagopalLaiUhlrich2023.osim",
            ),
            scaling_measurements: resolve(
                self.paths.scaling_measurements_tsv,
                "config_tables/scaling_measurements.tsv",
            ),
            marker_weights: resolve(
                self.paths.ik_marker_weights_tsv,
                "config_tables/ik_marker_weights.tsv",
            ),
            external_loads: resolve(
                self.paths.external_loads_tsv,
                "config_tables/external_loads.tsv",
            ),
        };

        let stages = BTreeMap::from([
            (Stage::Export, self.steps.c3d_export.unwrap_or(true)),
            (Stage::Scaling, self.steps.scaling.unwrap_or(true)),
            (
                Stage::InverseKinematics,
                self.steps.inverse_kinematics.unwrap_or(true),
            ),
            (
                Stage::InverseDynamics,
                self.steps.inverse_dynamics.unwrap_or(true),
            ),
            (Stage::CenterOfMass, self.steps.center_of_mass.unwrap_or(true)),
        ]);

        let static_pattern = StaticPattern::new(
            self.trials
                .static_pattern
                .as_deref()
                .unwrap_or(DEFAULT_STATIC_PATTERN),
        )?;

        let coordinate_transform = match self.coordinate_transform {
            Some(rows) => parse_transform(&rows)?,
            None => DEFAULT_TRANSFORM,
        };

        let low_pass_cutoff = self
            .inverse_dynamics
            .low_pass_cutoff_frequency
            .unwrap_or(DEFAULT_LOW_PASS_HZ);
        if !low_pass_cutoff.is_finite() {
            return Err(ConfigError::invalid(
                "inverse_dynamics.low_pass_cutoff_frequency must be finite",
            ));
        }

        let engine_executable = match self.engine.executable {
            Some(path) if path.components().count() > 1 => resolve_path(base_dir, &path),
            Some(path) => path,
            None => PathBuf::from(DEFAULT_ENGINE),
        };

        Ok(PipelineConfig {
            subject_mass: mass,
            paths,
            stages,
            static_pattern,
            coordinate_transform,
            ik_time_range: parse_time_range(
                "inverse_kinematics.time_range",
                self.inverse_kinematics.time_range,
            )?,
            id_time_range: parse_time_range(
                "inverse_dynamics.time_range",
                self.inverse_dynamics.time_range,
            )?,
            low_pass_cutoff,
            max_gap_frames: self.gap_fill.max_gap_frames,
            engine_executable,
        })
    }
}

fn parse_transform(rows: &[Vec<f64>]) -> Result<TransformMatrix, ConfigError> {
    if rows.len() != 4 || rows.iter().any(|row| row.len() != 4) {
        return Err(ConfigError::invalid(
            "coordinate_transform must be a 4x4 matrix",
        ));
    }
    let mut matrix = [[0.0; 4]; 4];
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(ConfigError::invalid(format!(
                    "coordinate_transform[{i}][{j}] is not finite"
                )));
            }
            matrix[i][j] = *value;
        }
    }
    Ok(matrix)
}

fn parse_time_range(key: &str, range: Option<[f64; 2]>) -> Result<Option<TimeRange>, ConfigError> {
    let Some([start, end]) = range else {
        return Ok(None);
    };
    if !start.is_finite() || !end.is_finite() || start > end {
        return Err(ConfigError::invalid(format!(
            "{key} must be [start, end] with start <= end"
        )));
    }
    Ok(Some(TimeRange::new(start, end)))
}

/// Join `path` onto `base_dir` when relative and fold `.`/`..` lexically.
fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = PipelineConfig::from_toml_str("", Path::new("/lab/session")).unwrap();

        assert_eq!(config.subject_mass, 79.0);
        assert_eq!(config.paths.capture_folder, PathBuf::from("/lab/session/data"));
        assert_eq!(
            config.paths.marker_weights,
            PathBuf::from("/lab/session/config_tables/ik_marker_weights.tsv")
        );
        assert!(Stage::ALL.iter().all(|stage| config.is_enabled(*stage)));
        assert_eq!(config.static_pattern.as_str(), "*static*");
        assert_eq!(config.coordinate_transform, DEFAULT_TRANSFORM);
        assert_eq!(config.low_pass_cutoff, 6.0);
        assert_eq!(config.max_gap_frames, 0);
        assert_eq!(config.engine_executable, PathBuf::from("opensim-cmd"));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let doc = r#"
            [paths]
            c3d_folder = "../raw/c3d"
            output_folder = "/abs/out"
        "#;
        let config = PipelineConfig::from_toml_str(doc, Path::new("/lab/session")).unwrap();
        assert_eq!(config.paths.capture_folder, PathBuf::from("/lab/raw/c3d"));
        assert_eq!(config.paths.output_folder, PathBuf::from("/abs/out"));
    }

    #[test]
    fn steps_can_be_disabled() {
        let doc = "[steps]\nscaling = false\ncenter_of_mass = false\n";
        let config = PipelineConfig::from_toml_str(doc, Path::new("/x")).unwrap();
        let enabled: Vec<Stage> = config.enabled_stages().collect();
        assert_eq!(
            enabled,
            vec![
                Stage::Export,
                Stage::InverseKinematics,
                Stage::InverseDynamics
            ]
        );
    }

    #[test]
    fn integer_matrix_entries_are_accepted() {
        let doc = "coordinate_transform = [[1, 0, 0, 5], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]\n";
        let config = PipelineConfig::from_toml_str(doc, Path::new("/x")).unwrap();
        assert_eq!(config.coordinate_transform[0], [1.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn rejects_non_square_transform() {
        let doc = "coordinate_transform = [[1, 0, 0], [0, 1, 0], [0, 0, 1]]\n";
        let err = PipelineConfig::from_toml_str(doc, Path::new("/x")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = PipelineConfig::from_toml_str("[subject]\nmass = 0\n", Path::new("/x"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = PipelineConfig::from_toml_str("[steps]\nscalling = true\n", Path::new("/x"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn parses_time_ranges_and_gap_fill() {
        let doc = r#"
            [inverse_kinematics]
            time_range = [0.5, 2.0]

            [inverse_dynamics]
            low_pass_cutoff_frequency = 10.0

            [gap_fill]
            max_gap_frames = 12
        "#;
        let config = PipelineConfig::from_toml_str(doc, Path::new("/x")).unwrap();
        assert_eq!(config.ik_time_range, Some(TimeRange::new(0.5, 2.0)));
        assert_eq!(config.id_time_range, None);
        assert_eq!(config.low_pass_cutoff, 10.0);
        assert_eq!(config.max_gap_frames, 12);
    }

    #[test]
    fn rejects_reversed_time_range() {
        let doc = "[inverse_kinematics]\ntime_range = [2.0, 1.0]\n";
        assert!(PipelineConfig::from_toml_str(doc, Path::new("/x")).is_err());
    }

    #[test]
    fn engine_executable_with_directory_is_resolved() {
        let doc = "[engine]\nexecutable = \"bin/opensim-cmd\"\n";
        let config = PipelineConfig::from_toml_str(doc, Path::new("/lab")).unwrap();
        assert_eq!(config.engine_executable, PathBuf::from("/lab/bin/opensim-cmd"));
    }
}
