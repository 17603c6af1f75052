//! TRC marker trajectory files.

use std::collections::BTreeMap;
use std::path::Path;

use mocap_model::{MarkerTable, Vec3};
use tracing::debug;

use crate::error::FormatError;
use crate::file_name_of;

const DEFAULT_UNITS: &str = "mm";

fn data_rate(table: &MarkerTable) -> f64 {
    if let Some(rate) = table.meta.data_rate {
        return rate;
    }
    let times = table.times();
    match (times.first(), times.last()) {
        (Some(first), Some(last)) if times.len() > 1 && last > first => {
            (times.len() - 1) as f64 / (last - first)
        }
        _ => 0.0,
    }
}

fn format_cell(cell: Option<Vec3>) -> String {
    match cell {
        Some(p) => format!("{}\t{}\t{}", p.x, p.y, p.z),
        None => "\t\t".to_string(),
    }
}

/// Write `table` as a TRC file. Missing points are written as empty fields.
pub fn write_trc(table: &MarkerTable, path: &Path) -> Result<(), FormatError> {
    let frames = table.num_frames();
    let markers = table.num_columns();
    let rate = data_rate(table);
    let units = table.meta.units.as_deref().unwrap_or(DEFAULT_UNITS);

    let mut out = String::new();
    out.push_str(&format!("PathFileType\t4\t(X/Y/Z)\t{}\n", file_name_of(path)));
    out.push_str(
        "DataRate\tCameraRate\tNumFrames\tNumMarkers\tUnits\tOrigDataRate\tOrigDataStartFrame\tOrigNumFrames\n",
    );
    out.push_str(&format!("{rate}\t{rate}\t{frames}\t{markers}\t{units}\t{rate}\t1\t{frames}\n"));

    out.push_str("Frame#\tTime");
    for label in table.labels() {
        out.push_str(&format!("\t{label}\t\t"));
    }
    out.push_str("\n\t");
    for index in 1..=markers {
        out.push_str(&format!("\tX{index}\tY{index}\tZ{index}"));
    }
    out.push_str("\n\n");

    for frame in 0..frames {
        out.push_str(&format!("{}\t{}", frame + 1, table.times()[frame]));
        for cell in table.row(frame) {
            out.push('\t');
            out.push_str(&format_cell(*cell));
        }
        out.push('\n');
    }

    std::fs::write(path, out).map_err(|e| FormatError::io(path, e))?;
    debug!(path = %path.display(), frames, markers, "wrote trc");
    Ok(())
}

fn parse_value(raw: Option<&str>) -> Option<f64> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read a TRC file. Empty or non-finite coordinates become missing points.
pub fn read_trc(path: &Path) -> Result<MarkerTable, FormatError> {
    let contents = std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < 5 {
        return Err(FormatError::parse(path, lines.len(), "truncated TRC header"));
    }

    let keys: Vec<&str> = lines[1].split('\t').map(str::trim).collect();
    let values: Vec<&str> = lines[2].split('\t').map(str::trim).collect();
    let header: BTreeMap<&str, &str> = keys.into_iter().zip(values).collect();

    let labels: Vec<String> = lines[3]
        .split('\t')
        .skip(2)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();
    let markers = labels.len();
    let mut table = MarkerTable::new(labels).map_err(|source| FormatError::Table {
        path: path.to_path_buf(),
        source,
    })?;
    table.meta.data_rate = header.get("DataRate").and_then(|v| v.parse().ok());
    table.meta.units = header
        .get("Units")
        .filter(|v| !v.is_empty())
        .map(|v| (*v).to_string());

    for (index, line) in lines.iter().enumerate().skip(5) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let time = parse_value(fields.get(1).copied())
            .ok_or_else(|| FormatError::parse(path, index + 1, "invalid time value"))?;
        let row = (0..markers)
            .map(|marker| {
                let base = 2 + marker * 3;
                let x = parse_value(fields.get(base).copied())?;
                let y = parse_value(fields.get(base + 1).copied())?;
                let z = parse_value(fields.get(base + 2).copied())?;
                Some(Vec3::new(x, y, z))
            })
            .collect();
        table
            .push_frame(time, row)
            .map_err(|source| FormatError::Table {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(table)
}
