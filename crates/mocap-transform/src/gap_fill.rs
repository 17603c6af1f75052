//! Reconstruction of short marker dropouts.
//!
//! Each marker column is handled independently. Every maximal run of
//! missing frames no longer than the threshold is filled from a natural
//! cubic spline per axis, fitted through all valid samples of that column
//! over the whole trial. The spline abscissa is the frame index, so the
//! trial is assumed to be uniformly sampled.

use mocap_model::{PointTable, Vec3};
use tracing::debug;

use crate::spline::NaturalSpline;

/// Minimum number of valid samples (and frames) needed to fit a spline.
pub const MIN_VALID_SAMPLES: usize = 4;

/// Frames filled per marker, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapFillReport {
    pub filled: Vec<(String, usize)>,
}

impl GapFillReport {
    pub fn total(&self) -> usize {
        self.filled.iter().map(|(_, count)| count).sum()
    }

    pub fn filled_for(&self, marker: &str) -> usize {
        self.filled
            .iter()
            .find(|(label, _)| label == marker)
            .map_or(0, |(_, count)| *count)
    }
}

/// Fill gaps of at most `max_gap` frames in every column of `table`.
///
/// Longer gaps, columns with fewer than four valid samples and tables with
/// fewer than four frames are left untouched.
pub fn fill_gaps(table: &mut PointTable, max_gap: usize) -> GapFillReport {
    let mut report = GapFillReport::default();
    let eligible = max_gap > 0 && table.num_frames() >= MIN_VALID_SAMPLES;

    for column in 0..table.num_columns() {
        let label = table.labels()[column].clone();
        let filled = if eligible {
            fill_column(table, column, max_gap)
        } else {
            0
        };
        if filled > 0 {
            debug!(marker = %label, frames = filled, "filled marker gaps");
        }
        report.filled.push((label, filled));
    }
    report
}

fn is_valid(cell: Option<Vec3>) -> bool {
    cell.is_some_and(|point| point.is_finite())
}

/// Maximal runs of invalid frames as `(start, len)`.
fn missing_runs(cells: &[Option<Vec3>]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (frame, cell) in cells.iter().enumerate() {
        match (is_valid(*cell), start) {
            (false, None) => start = Some(frame),
            (true, Some(begin)) => {
                runs.push((begin, frame - begin));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        runs.push((begin, cells.len() - begin));
    }
    runs
}

fn fill_column(table: &mut PointTable, column: usize, max_gap: usize) -> usize {
    let cells = table.column(column);
    let fillable: Vec<(usize, usize)> = missing_runs(&cells)
        .into_iter()
        .filter(|(_, len)| *len <= max_gap)
        .collect();
    if fillable.is_empty() {
        return 0;
    }

    let mut frames = Vec::new();
    let mut axes: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (frame, cell) in cells.iter().enumerate() {
        if let Some(point) = cell.filter(|p| p.is_finite()) {
            frames.push(frame as f64);
            for (axis, value) in axes.iter_mut().zip(point.to_array()) {
                axis.push(value);
            }
        }
    }
    if frames.len() < MIN_VALID_SAMPLES {
        return 0;
    }

    let Some(splines) = axes
        .iter()
        .map(|values| NaturalSpline::fit(&frames, values))
        .collect::<Option<Vec<_>>>()
    else {
        return 0;
    };

    let mut filled = 0;
    for (start, len) in fillable {
        for frame in start..start + len {
            let t = frame as f64;
            let point = Vec3::new(splines[0].eval(t), splines[1].eval(t), splines[2].eval(t));
            table.set(frame, column, Some(point));
            filled += 1;
        }
    }
    filled
}
