//! Parsers for the three tab-delimited configuration tables.
//!
//! Each table has a header row; column order is free. Values are trimmed and
//! fully blank rows are ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use mocap_model::records::DEFAULT_AXES;
use mocap_model::{ExternalLoadDefinition, MarkerPair, MarkerWeight, ScalingMeasurement};
use tracing::debug;

use crate::error::ConfigError;
use crate::settings::{PipelineConfig, Stage};

/// Parsed config tables for the enabled stages.
#[derive(Debug, Clone, Default)]
pub struct ConfigTables {
    pub measurements: Vec<ScalingMeasurement>,
    pub marker_weights: Vec<MarkerWeight>,
    pub external_loads: Vec<ExternalLoadDefinition>,
}

impl ConfigTables {
    /// Parse only the tables the enabled stages consume.
    pub fn load_for(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let mut tables = Self::default();
        if config.is_enabled(Stage::Scaling) {
            tables.measurements = parse_scaling_measurements(&config.paths.scaling_measurements)?;
        }
        if config.is_enabled(Stage::Scaling) || config.is_enabled(Stage::InverseKinematics) {
            tables.marker_weights = parse_marker_weights(&config.paths.marker_weights)?;
        }
        if config.is_enabled(Stage::InverseDynamics) {
            tables.external_loads = parse_external_loads(&config.paths.external_loads)?;
        }
        Ok(tables)
    }
}

/// A header-indexed view over one TSV file.
struct TsvTable {
    path: PathBuf,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl TsvTable {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|e| ConfigError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| ConfigError::Tsv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .iter()
            .map(|h| h.trim().trim_matches('\u{feff}').to_string())
            .collect();
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ConfigError::Tsv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            if record.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            records.push(record);
        }
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            records,
        })
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    fn require(&self, column: &str) -> Result<usize, ConfigError> {
        self.position(column)
            .ok_or_else(|| ConfigError::MissingColumn {
                path: self.path.clone(),
                column: column.to_string(),
            })
    }

    fn cell<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
        index.and_then(|i| record.get(i)).unwrap_or("").trim()
    }

    fn required_value(
        &self,
        record: &StringRecord,
        row: usize,
        column: &str,
        index: usize,
    ) -> Result<String, ConfigError> {
        let value = Self::cell(record, Some(index));
        if value.is_empty() {
            return Err(ConfigError::MissingValue {
                path: self.path.clone(),
                row,
                column: column.to_string(),
            });
        }
        Ok(value.to_string())
    }
}

/// Parse scaling measurements: `measurement, marker1, marker2, bodies, axes`.
///
/// Rows sharing a measurement name add marker pairs to it; measurement order
/// is first-seen order. A row with blank `bodies`/`axes` inherits the most
/// recently stated values (axes default to `X Y Z`).
pub fn parse_scaling_measurements(path: &Path) -> Result<Vec<ScalingMeasurement>, ConfigError> {
    let table = TsvTable::read(path)?;
    let name_idx = table.require("measurement")?;
    let marker1_idx = table.require("marker1")?;
    let marker2_idx = table.require("marker2")?;
    let bodies_idx = table.position("bodies");
    let axes_idx = table.position("axes");

    let mut measurements: Vec<ScalingMeasurement> = Vec::new();
    let mut by_name: BTreeMap<String, usize> = BTreeMap::new();
    let mut current_bodies: Vec<String> = Vec::new();
    let mut current_axes: Option<String> = None;

    for (offset, record) in table.records.iter().enumerate() {
        let row = offset + 1;
        let name = table.required_value(record, row, "measurement", name_idx)?;
        let first = table.required_value(record, row, "marker1", marker1_idx)?;
        let second = table.required_value(record, row, "marker2", marker2_idx)?;

        let bodies = TsvTable::cell(record, bodies_idx);
        if !bodies.is_empty() {
            current_bodies = bodies
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect();
        }
        let axes = TsvTable::cell(record, axes_idx);
        if !axes.is_empty() {
            current_axes = Some(axes.to_string());
        }

        let index = *by_name.entry(name.clone()).or_insert_with(|| {
            measurements.push(ScalingMeasurement {
                name: name.clone(),
                marker_pairs: Vec::new(),
                bodies: current_bodies.clone(),
                axes: current_axes
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AXES.to_string()),
            });
            measurements.len() - 1
        });
        measurements[index]
            .marker_pairs
            .push(MarkerPair::new(first, second));
    }

    debug!(
        path = %path.display(),
        count = measurements.len(),
        "parsed scaling measurements"
    );
    Ok(measurements)
}

/// Parse marker weights: `marker, weight, apply`.
///
/// `apply` is true unless its cell holds something other than `true`
/// (case-insensitive); a missing column or blank cell means true.
pub fn parse_marker_weights(path: &Path) -> Result<Vec<MarkerWeight>, ConfigError> {
    let table = TsvTable::read(path)?;
    let marker_idx = table.require("marker")?;
    let weight_idx = table.require("weight")?;
    let apply_idx = table.position("apply");

    let mut weights = Vec::with_capacity(table.records.len());
    for (offset, record) in table.records.iter().enumerate() {
        let row = offset + 1;
        let marker = table.required_value(record, row, "marker", marker_idx)?;
        let raw_weight = TsvTable::cell(record, Some(weight_idx));
        let weight = raw_weight
            .parse::<f64>()
            .ok()
            .filter(|w| w.is_finite() && *w >= 0.0)
            .ok_or_else(|| ConfigError::InvalidNumber {
                path: table.path.clone(),
                row,
                column: "weight".to_string(),
                value: raw_weight.to_string(),
            })?;
        let apply = match TsvTable::cell(record, apply_idx) {
            "" => true,
            value => value.eq_ignore_ascii_case("true"),
        };
        weights.push(MarkerWeight {
            marker,
            weight,
            apply,
        });
    }

    debug!(path = %path.display(), count = weights.len(), "parsed marker weights");
    Ok(weights)
}

/// Parse external loads:
/// `name, body, force_identifier, point_identifier, torque_identifier`.
pub fn parse_external_loads(path: &Path) -> Result<Vec<ExternalLoadDefinition>, ConfigError> {
    const COLUMNS: [&str; 5] = [
        "name",
        "body",
        "force_identifier",
        "point_identifier",
        "torque_identifier",
    ];
    let table = TsvTable::read(path)?;
    let indices = COLUMNS
        .iter()
        .map(|column| table.require(column))
        .collect::<Result<Vec<_>, _>>()?;

    let mut loads = Vec::with_capacity(table.records.len());
    for (offset, record) in table.records.iter().enumerate() {
        let row = offset + 1;
        let mut values = COLUMNS
            .iter()
            .zip(&indices)
            .map(|(column, index)| table.required_value(record, row, column, *index))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();
        let mut next = || values.next().unwrap_or_default();
        loads.push(ExternalLoadDefinition {
            name: next(),
            body: next(),
            force_identifier: next(),
            point_identifier: next(),
            torque_identifier: next(),
        });
    }

    debug!(path = %path.display(), count = loads.len(), "parsed external loads");
    Ok(loads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tsv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn measurement_rows_inherit_bodies_and_axes() {
        let file = tsv(
            "measurement\tmarker1\tmarker2\tbodies\taxes\n\
             torso\tC7\tCLAV\tTorso\tX Y Z\n\
             torso\tT10\tSTRN\t\t\n\
             pelvis\tRASI\tLASI\t\t\n",
        );
        let measurements = parse_scaling_measurements(file.path()).unwrap();

        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0].name, "torso");
        assert_eq!(
            measurements[0].marker_pairs,
            vec![MarkerPair::new("C7", "CLAV"), MarkerPair::new("T10", "STRN")]
        );
        assert_eq!(measurements[1].name, "pelvis");
        assert_eq!(measurements[1].bodies, vec!["Torso".to_string()]);
        assert_eq!(measurements[1].axes, "X Y Z");
    }

    #[test]
    fn measurement_order_is_first_seen() {
        let file = tsv(
            "measurement\tmarker1\tmarker2\tbodies\taxes\n\
             zeta\tA\tB\tfemur_r\tY\n\
             alpha\tC\tD\ttibia_r,talus_r\t\n\
             zeta\tE\tF\t\t\n",
        );
        let measurements = parse_scaling_measurements(file.path()).unwrap();
        let names: Vec<&str> = measurements.iter().map(|m| m.name.as_str()).collect();

        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(measurements[0].marker_pairs.len(), 2);
        assert_eq!(measurements[1].bodies, vec!["tibia_r", "talus_r"]);
        assert_eq!(measurements[1].axes, "Y");
    }

    #[test]
    fn measurement_axes_default_when_never_stated() {
        let file = tsv("measurement\tmarker1\tmarker2\nhead\tLFHD\tRFHD\n");
        let measurements = parse_scaling_measurements(file.path()).unwrap();
        assert!(measurements[0].bodies.is_empty());
        assert_eq!(measurements[0].axes, DEFAULT_AXES);
    }

    #[test]
    fn measurement_requires_marker_columns() {
        let file = tsv("measurement\tmarker1\nhead\tLFHD\n");
        let err = parse_scaling_measurements(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingColumn { column, .. } if column == "marker2"));
    }

    #[test]
    fn marker_weights_parse_apply_flag() {
        let file = tsv(
            "marker\tweight\tapply\n\
             RASI\t10\tTRUE\n\
             LASI\t2.5\tfalse\n\
             C7\t1\t\n",
        );
        let weights = parse_marker_weights(file.path()).unwrap();
        assert_eq!(weights.len(), 3);
        assert!(weights[0].apply);
        assert_eq!(weights[0].weight, 10.0);
        assert!(!weights[1].apply);
        assert!(weights[2].apply);
    }

    #[test]
    fn marker_weights_default_apply_without_column() {
        let file = tsv("marker\tweight\nRASI\t1\n");
        let weights = parse_marker_weights(file.path()).unwrap();
        assert!(weights[0].apply);
    }

    #[test]
    fn marker_weights_reject_bad_numbers() {
        let file = tsv("marker\tweight\nRASI\theavy\n");
        let err = parse_marker_weights(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { row: 1, ref value, .. } if value == "heavy"
        ));

        let negative = tsv("marker\tweight\nRASI\t-1\n");
        assert!(parse_marker_weights(negative.path()).is_err());
    }

    #[test]
    fn external_loads_parse_all_columns() {
        let file = tsv(
            "name\tbody\tforce_identifier\tpoint_identifier\ttorque_identifier\n\
             right\tcalcn_r\tground_force_1_v\tground_force_1_p\tground_torque_1_\n",
        );
        let loads = parse_external_loads(file.path()).unwrap();
        assert_eq!(
            loads,
            vec![ExternalLoadDefinition {
                name: "right".to_string(),
                body: "calcn_r".to_string(),
                force_identifier: "ground_force_1_v".to_string(),
                point_identifier: "ground_force_1_p".to_string(),
                torque_identifier: "ground_torque_1_".to_string(),
            }]
        );
    }

    #[test]
    fn external_loads_require_every_column() {
        let file = tsv("name\tbody\tforce_identifier\tpoint_identifier\nright\tcalcn_r\ta\tb\n");
        let err = parse_external_loads(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingColumn { ref column, .. } if column == "torque_identifier"
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = parse_marker_weights(Path::new("/nonexistent/weights.tsv")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
