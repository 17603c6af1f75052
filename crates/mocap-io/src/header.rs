//! Canonical storage-file headers.
//!
//! Writers upstream dump arbitrary metadata into the header, which breaks
//! consumers that read the header's first line as the data source name.
//! [`normalize_header`] replaces the whole header with six fixed lines and
//! re-emits the label line and data lines byte for byte.

use std::path::Path;

use crate::error::FormatError;
use crate::{END_HEADER, file_name_of};

/// Counts written into a normalized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSummary {
    pub rows: usize,
    pub columns: usize,
}

/// Rewrite the header of the storage file at `path` in place.
///
/// Idempotent: normalizing an already normalized file leaves it unchanged.
pub fn normalize_header(path: &Path) -> Result<HeaderSummary, FormatError> {
    let contents = std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
    let (normalized, summary) = normalize_header_text(path, &file_name_of(path), &contents)?;
    std::fs::write(path, normalized).map_err(|e| FormatError::io(path, e))?;
    Ok(summary)
}

/// Normalize storage text; `path` is only used for error context.
pub fn normalize_header_text(
    path: &Path,
    file_name: &str,
    contents: &str,
) -> Result<(String, HeaderSummary), FormatError> {
    let lines: Vec<&str> = contents.split_inclusive('\n').collect();
    let header_end = lines
        .iter()
        .position(|line| line.trim() == END_HEADER)
        .ok_or_else(|| FormatError::MissingSentinel {
            path: path.to_path_buf(),
            sentinel: END_HEADER,
        })?;
    let after_header = &lines[header_end + 1..];
    let label_index = after_header
        .iter()
        .position(|line| line.starts_with("time\t"))
        .ok_or_else(|| FormatError::MissingLabelLine {
            path: path.to_path_buf(),
        })?;
    let label_line = after_header[label_index];
    let data_lines = &after_header[label_index + 1..];
    let summary = HeaderSummary {
        rows: data_lines.len(),
        columns: label_line.trim().split('\t').count(),
    };

    let mut out = String::with_capacity(contents.len());
    out.push_str(&format!("{file_name}\n"));
    out.push_str("version=1\n");
    out.push_str(&format!("nRows={}\n", summary.rows));
    out.push_str(&format!("nColumns={}\n", summary.columns));
    out.push_str("inDegrees=yes\n");
    out.push_str(END_HEADER);
    out.push('\n');
    out.push_str(label_line);
    for line in data_lines {
        out.push_str(line);
    }
    Ok((out, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "walk01.mot\n\
                       DataRate=1000.000000\n\
                       CalibrationMatrices=...\n\
                       nRows=0\n\
                       endheader\n\
                       time\tground_force_1_vx\tground_force_1_vy\n\
                       0.000\t1.5\t2.5\n\
                       0.001\t1.6\t2.6\n";

    #[test]
    fn rewrites_header_and_keeps_data() {
        let (text, summary) =
            normalize_header_text(Path::new("walk01.mot"), "walk01.mot", RAW).unwrap();

        assert_eq!(summary, HeaderSummary { rows: 2, columns: 3 });
        assert_eq!(
            text,
            "walk01.mot\nversion=1\nnRows=2\nnColumns=3\ninDegrees=yes\nendheader\n\
             time\tground_force_1_vx\tground_force_1_vy\n\
             0.000\t1.5\t2.5\n\
             0.001\t1.6\t2.6\n"
        );
    }

    #[test]
    fn second_pass_is_identity() {
        let (once, _) = normalize_header_text(Path::new("a"), "walk01.mot", RAW).unwrap();
        let (twice, _) = normalize_header_text(Path::new("a"), "walk01.mot", &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn skips_lines_between_sentinel_and_labels() {
        let raw = "x\nendheader\n\nnote\ntime\tcom_x\n0\t1\n";
        let (text, summary) = normalize_header_text(Path::new("a"), "c.sto", raw).unwrap();
        assert_eq!(summary.rows, 1);
        assert!(text.ends_with("endheader\ntime\tcom_x\n0\t1\n"));
    }

    #[test]
    fn keeps_missing_final_newline() {
        let raw = "x\nendheader\ntime\ta\n0\t1";
        let (text, _) = normalize_header_text(Path::new("a"), "c.sto", raw).unwrap();
        assert!(text.ends_with("time\ta\n0\t1"));
    }

    #[test]
    fn missing_sentinel_is_a_format_error() {
        let err = normalize_header_text(Path::new("a"), "a", "time\tx\n0\t1\n").unwrap_err();
        assert!(matches!(err, FormatError::MissingSentinel { .. }));
    }

    #[test]
    fn missing_label_line_is_a_format_error() {
        let err = normalize_header_text(Path::new("a"), "a", "h\nendheader\n0\t1\n").unwrap_err();
        assert!(matches!(err, FormatError::MissingLabelLine { .. }));
    }
}
