//! Capture export: markers to TRC, force plates to MOT.

use std::path::{Path, PathBuf};

use mocap_engine::Capture;
use mocap_io::normalize_header;
use mocap_model::{ArtifactKind, PointTable};
use mocap_transform::{CoordinateTransform, count_missing, fill_gaps, relabel_force_columns};
use tracing::{debug, info, warn};

use crate::discovery::{list_capture_files, trial_name};
use crate::error::{DiscoveryError, StageError};
use crate::manifest::ArtifactManifest;
use crate::pipeline::PipelineContext;
use crate::types::StageReport;

pub fn run(context: &PipelineContext<'_>, manifest: &mut ArtifactManifest, report: &mut StageReport) {
    let folder = &context.config.paths.capture_folder;
    let captures = match list_capture_files(folder) {
        Ok(files) if files.is_empty() => {
            report.blocked(&DiscoveryError::NoCaptureFiles {
                folder: folder.clone(),
            }
            .into());
            return;
        }
        Ok(files) => files,
        Err(error) => {
            report.blocked(&error.into());
            return;
        }
    };
    info!(count = captures.len(), folder = %folder.display(), "capture files found");

    let transform = match CoordinateTransform::new(&context.config.coordinate_transform) {
        Ok(transform) => transform,
        Err(error) => {
            report.blocked(&error.into());
            return;
        }
    };

    let trials: Vec<(String, PathBuf)> = captures
        .into_iter()
        .map(|path| (trial_name(&path), path))
        .collect();
    super::for_each_trial(&trials, report, |trial, capture_path, report| {
        let capture = context.engine.read_capture(capture_path)?;
        let Capture { mut markers, forces } = capture;
        prepare_markers(&mut markers, context.config.max_gap_frames);
        transform.apply_to_table(&mut markers);

        let trc = manifest.path_for(trial, ArtifactKind::Markers);
        context.engine.write_markers(&markers, &trc)?;
        manifest.record(trial, ArtifactKind::Markers, trc.clone());

        let mot = manifest.path_for(trial, ArtifactKind::Forces);
        match forces {
            None => {
                warn!("no force data (TRC only)");
                report.completed(trial, vec![trc]);
            }
            Some(forces) => match export_forces(context, &transform, forces, &mot) {
                Ok(true) => {
                    manifest.record(trial, ArtifactKind::Forces, mot.clone());
                    report.completed(trial, vec![trc, mot]);
                }
                Ok(false) => {
                    info!("force table is empty (TRC only)");
                    report.completed(trial, vec![trc]);
                }
                Err(error) => {
                    warn!("no forces exported: {error}");
                    report.completed_with_warning(
                        trial,
                        vec![trc],
                        format!("no forces exported: {error}"),
                    );
                }
            },
        }
        Ok(())
    });
}

/// Fill short marker gaps when enabled and log what remains missing.
fn prepare_markers(markers: &mut PointTable, max_gap: usize) {
    if max_gap > 0 {
        let filled = fill_gaps(markers, max_gap);
        if filled.total() > 0 {
            info!(
                frames = filled.total(),
                markers = filled.filled.len(),
                max_gap,
                "filled marker gaps"
            );
        }
    }
    for (marker, missing) in count_missing(markers)
        .into_iter()
        .filter(|(_, missing)| *missing > 0)
    {
        debug!(marker = %marker, missing, "marker still has missing frames");
    }
}

/// Transform, flatten and relabel force-plate data, then write and normalize
/// the MOT file. Returns `false` when there was nothing to write.
fn export_forces(
    context: &PipelineContext<'_>,
    transform: &CoordinateTransform,
    mut forces: PointTable,
    mot: &Path,
) -> Result<bool, StageError> {
    transform.apply_to_table(&mut forces);
    let mut flat = forces.flatten();
    if flat.num_frames() == 0 || flat.num_columns() == 0 {
        return Ok(false);
    }
    relabel_force_columns(&mut flat)?;
    context.engine.write_time_series(&flat, mot)?;
    normalize_header(mot)?;
    Ok(true)
}
