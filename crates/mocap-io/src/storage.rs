//! Storage (`.mot` / `.sto`) scalar time series.

use std::path::Path;

use mocap_model::ScalarTable;
use tracing::debug;

use crate::error::FormatError;
use crate::{END_HEADER, file_name_of};

/// Write `table` with a canonical header; NaN values are written as `NaN`.
pub fn write_storage(table: &ScalarTable, path: &Path) -> Result<(), FormatError> {
    let in_degrees = if table.meta.in_degrees.unwrap_or(false) {
        "yes"
    } else {
        "no"
    };
    let mut out = String::new();
    out.push_str(&format!("{}\n", file_name_of(path)));
    out.push_str("version=1\n");
    out.push_str(&format!("nRows={}\n", table.num_frames()));
    out.push_str(&format!("nColumns={}\n", table.num_columns() + 1));
    out.push_str(&format!("inDegrees={in_degrees}\n"));
    out.push_str(&format!("{END_HEADER}\n"));

    out.push_str("time");
    for label in table.labels() {
        out.push_str(&format!("\t{label}"));
    }
    out.push('\n');
    for (frame, time) in table.times().iter().enumerate() {
        out.push_str(&time.to_string());
        for value in table.row(frame) {
            out.push_str(&format!("\t{value}"));
        }
        out.push('\n');
    }

    std::fs::write(path, out).map_err(|e| FormatError::io(path, e))?;
    debug!(
        path = %path.display(),
        rows = table.num_frames(),
        columns = table.num_columns(),
        "wrote storage"
    );
    Ok(())
}

/// Read a storage file.
///
/// The header is scanned for `inDegrees=yes|no`; the first non-blank line
/// after `endheader` holds the column labels, its first column being time.
pub fn read_storage(path: &Path) -> Result<ScalarTable, FormatError> {
    let contents = std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
    let mut lines = contents.lines().enumerate();

    let mut in_degrees = None;
    let mut found_end = false;
    for (_, line) in lines.by_ref() {
        let line = line.trim();
        if line == END_HEADER {
            found_end = true;
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim().eq_ignore_ascii_case("inDegrees") {
                in_degrees = Some(value.trim().eq_ignore_ascii_case("yes"));
            }
        }
    }
    if !found_end {
        return Err(FormatError::MissingSentinel {
            path: path.to_path_buf(),
            sentinel: END_HEADER,
        });
    }

    let Some((_, label_line)) = lines.by_ref().find(|(_, line)| !line.trim().is_empty()) else {
        return Err(FormatError::MissingLabelLine {
            path: path.to_path_buf(),
        });
    };
    let mut columns = label_line.trim_end().split('\t');
    if !columns
        .next()
        .is_some_and(|first| first.trim().eq_ignore_ascii_case("time"))
    {
        return Err(FormatError::MissingLabelLine {
            path: path.to_path_buf(),
        });
    }
    let labels: Vec<String> = columns.map(|label| label.trim().to_string()).collect();
    let mut table = ScalarTable::new(labels).map_err(|source| FormatError::Table {
        path: path.to_path_buf(),
        source,
    })?;
    table.meta.in_degrees = in_degrees;

    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let values = line
            .split('\t')
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| FormatError::parse(path, index + 1, e.to_string()))?;
        let Some((time, row)) = values.split_first() else {
            continue;
        };
        table
            .push_frame(*time, row.to_vec())
            .map_err(|source| FormatError::Table {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(table)
}
