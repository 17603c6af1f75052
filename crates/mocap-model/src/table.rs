//! Frame-indexed tables.
//!
//! Both table kinds share the same temporal structure: a strictly increasing
//! timestamp per frame and a fixed, ordered set of labelled columns. Labels
//! are fixed at creation; only [`ScalarTable::set_labels`] may rename them.

use std::collections::BTreeSet;

use crate::error::TableError;
use crate::geometry::Vec3;

/// File-level metadata carried alongside a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMeta {
    /// Sampling rate in Hz.
    pub data_rate: Option<f64>,
    /// Length unit of point data (e.g. `mm`).
    pub units: Option<String>,
    /// Whether angular columns are expressed in degrees.
    pub in_degrees: Option<bool>,
}

/// Table of 3-D points; `None` marks a missing sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointTable {
    labels: Vec<String>,
    times: Vec<f64>,
    rows: Vec<Vec<Option<Vec3>>>,
    pub meta: TableMeta,
}

/// Marker trajectories.
pub type MarkerTable = PointTable;

/// Table of scalar channels; NaN marks a missing sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarTable {
    labels: Vec<String>,
    times: Vec<f64>,
    rows: Vec<Vec<f64>>,
    pub meta: TableMeta,
}

/// Flattened force-plate channels.
pub type ForceTable = ScalarTable;

fn check_unique(labels: &[String]) -> Result<(), TableError> {
    let mut seen = BTreeSet::new();
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(TableError::DuplicateLabel {
                label: label.clone(),
            });
        }
    }
    Ok(())
}

fn check_time(times: &[f64], time: f64) -> Result<(), TableError> {
    if let Some(&previous) = times.last() {
        if time <= previous {
            return Err(TableError::NonIncreasingTime { previous, time });
        }
    }
    Ok(())
}

impl PointTable {
    pub fn new(labels: Vec<String>) -> Result<Self, TableError> {
        check_unique(&labels)?;
        Ok(Self {
            labels,
            ..Self::default()
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    pub fn num_columns(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn push_frame(&mut self, time: f64, row: Vec<Option<Vec3>>) -> Result<(), TableError> {
        if row.len() != self.labels.len() {
            return Err(TableError::RowLengthMismatch {
                expected: self.labels.len(),
                actual: row.len(),
            });
        }
        check_time(&self.times, time)?;
        self.times.push(time);
        self.rows.push(row);
        Ok(())
    }

    pub fn row(&self, frame: usize) -> &[Option<Vec3>] {
        &self.rows[frame]
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Copy of one column, frame by frame.
    pub fn column(&self, column: usize) -> Vec<Option<Vec3>> {
        self.rows.iter().map(|row| row[column]).collect()
    }

    pub fn get(&self, frame: usize, column: usize) -> Option<Vec3> {
        self.rows[frame][column]
    }

    pub fn set(&mut self, frame: usize, column: usize, value: Option<Vec3>) {
        self.rows[frame][column] = value;
    }

    /// Mutable access to every cell in row-major order.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Option<Vec3>> {
        self.rows.iter_mut().flat_map(|row| row.iter_mut())
    }

    /// Split every point column into three scalar columns `<label>_1`,
    /// `<label>_2`, `<label>_3`. Missing points become NaN.
    pub fn flatten(&self) -> ScalarTable {
        let labels = self
            .labels
            .iter()
            .flat_map(|label| (1..=3).map(move |component| format!("{label}_{component}")))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .flat_map(|cell| match cell {
                        Some(point) => point.to_array(),
                        None => [f64::NAN; 3],
                    })
                    .collect()
            })
            .collect();
        ScalarTable {
            labels,
            times: self.times.clone(),
            rows,
            meta: self.meta.clone(),
        }
    }
}

impl ScalarTable {
    pub fn new(labels: Vec<String>) -> Result<Self, TableError> {
        check_unique(&labels)?;
        Ok(Self {
            labels,
            ..Self::default()
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Replace every column label; count must match and labels stay unique.
    pub fn set_labels(&mut self, labels: Vec<String>) -> Result<(), TableError> {
        if labels.len() != self.labels.len() {
            return Err(TableError::LabelCountMismatch {
                expected: self.labels.len(),
                actual: labels.len(),
            });
        }
        check_unique(&labels)?;
        self.labels = labels;
        Ok(())
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn num_frames(&self) -> usize {
        self.times.len()
    }

    pub fn num_columns(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn push_frame(&mut self, time: f64, row: Vec<f64>) -> Result<(), TableError> {
        if row.len() != self.labels.len() {
            return Err(TableError::RowLengthMismatch {
                expected: self.labels.len(),
                actual: row.len(),
            });
        }
        check_time(&self.times, time)?;
        self.times.push(time);
        self.rows.push(row);
        Ok(())
    }

    pub fn row(&self, frame: usize) -> &[f64] {
        &self.rows[frame]
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn column(&self, column: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[column]).collect()
    }
}
