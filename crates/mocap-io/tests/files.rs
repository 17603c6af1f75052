//! File-level tests for TRC and storage handling.

use std::fs;

use mocap_io::{FormatError, normalize_header, read_storage, read_trc, write_storage, write_trc};
use mocap_model::{MarkerTable, ScalarTable, Vec3};
use tempfile::TempDir;

fn marker_table() -> MarkerTable {
    let mut table = MarkerTable::new(vec!["RASI".to_string(), "LASI".to_string()]).unwrap();
    table.meta.units = Some("mm".to_string());
    table
        .push_frame(
            0.0,
            vec![Some(Vec3::new(1.5, -2.0, 300.25)), Some(Vec3::new(4.0, 5.0, 6.0))],
        )
        .unwrap();
    table
        .push_frame(0.01, vec![None, Some(Vec3::new(4.5, 5.5, 6.5))])
        .unwrap();
    table
}

#[test]
fn trc_preserves_labels_missing_points_and_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("walk01.trc");

    write_trc(&marker_table(), &path).unwrap();
    let table = read_trc(&path).unwrap();

    assert_eq!(table.labels(), &["RASI", "LASI"]);
    assert_eq!(table.times(), &[0.0, 0.01]);
    assert_eq!(table.get(0, 0), Some(Vec3::new(1.5, -2.0, 300.25)));
    assert_eq!(table.get(1, 0), None);
    assert_eq!(table.get(1, 1), Some(Vec3::new(4.5, 5.5, 6.5)));
    assert_eq!(table.meta.units.as_deref(), Some("mm"));
    let rate = table.meta.data_rate.unwrap();
    assert!((rate - 100.0).abs() < 1e-9);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("PathFileType\t4\t(X/Y/Z)\twalk01.trc\n"));
}

#[test]
fn trc_reads_nan_as_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nan.trc");
    fs::write(
        &path,
        "PathFileType\t4\t(X/Y/Z)\tnan.trc\n\
         DataRate\tCameraRate\tNumFrames\tNumMarkers\tUnits\n\
         100\t100\t1\t1\tmm\n\
         Frame#\tTime\tC7\t\t\n\
         \t\tX1\tY1\tZ1\n\
         1\t0.0\tnan\tnan\tnan\n",
    )
    .unwrap();

    let table = read_trc(&path).unwrap();

    assert_eq!(table.num_frames(), 1);
    assert_eq!(table.get(0, 0), None);
}

#[test]
fn storage_writer_emits_canonical_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("walk01.mot");
    let mut table = ScalarTable::new(vec!["ground_force_vx".to_string()]).unwrap();
    table.push_frame(0.0, vec![0.5]).unwrap();
    table.push_frame(0.01, vec![f64::NAN]).unwrap();

    write_storage(&table, &path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "walk01.mot\nversion=1\nnRows=2\nnColumns=2\ninDegrees=no\nendheader\n\
         time\tground_force_vx\n0\t0.5\n0.01\tNaN\n"
    );
}

#[test]
fn normalized_storage_reads_back_in_degrees() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("walk01_com.sto");
    let mut table =
        ScalarTable::new(vec!["com_x".to_string(), "com_y".to_string(), "com_z".to_string()])
            .unwrap();
    table.push_frame(0.0, vec![0.1, 0.9, f64::NAN]).unwrap();
    table.push_frame(0.01, vec![0.2, 0.95, 0.0]).unwrap();

    write_storage(&table, &path).unwrap();
    let summary = normalize_header(&path).unwrap();
    let first = fs::read(&path).unwrap();
    normalize_header(&path).unwrap();
    let second = fs::read(&path).unwrap();
    let read = read_storage(&path).unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.columns, 4);
    assert_eq!(first, second);
    assert_eq!(read.meta.in_degrees, Some(true));
    assert_eq!(read.labels(), &["com_x", "com_y", "com_z"]);
    assert!(read.row(0)[2].is_nan());
    assert_eq!(read.row(1), &[0.2, 0.95, 0.0]);
}

#[test]
fn storage_without_sentinel_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.mot");
    fs::write(&path, "time\ta\n0\t1\n").unwrap();

    assert!(matches!(
        read_storage(&path),
        Err(FormatError::MissingSentinel { .. })
    ));
    assert!(matches!(
        normalize_header(&path),
        Err(FormatError::MissingSentinel { .. })
    ));
}

#[test]
fn storage_reader_reports_bad_numbers_with_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.sto");
    fs::write(&path, "bad\nendheader\ntime\ta\n0\tx\n").unwrap();

    let err = read_storage(&path).unwrap_err();
    assert!(matches!(err, FormatError::Parse { line: 4, .. }));
}
