//! Whole-body center of mass replayed from inverse kinematics results.

use std::path::Path;

use mocap_engine::CoordinateFrame;
use mocap_io::{normalize_header, read_storage};
use mocap_model::{ArtifactKind, ScalarTable};
use tracing::{debug, info};

use super::require_scaled_model;
use crate::error::{DiscoveryError, StageError};
use crate::manifest::ArtifactManifest;
use crate::pipeline::PipelineContext;
use crate::types::StageReport;

/// Output column labels.
pub const COM_LABELS: [&str; 3] = ["com_x", "com_y", "com_z"];

const TRANSLATION_SUFFIXES: [&str; 3] = ["_tx", "_ty", "_tz"];

/// Whether a generalized coordinate is a translation (never converted to radians).
pub fn is_translation(coordinate: &str) -> bool {
    TRANSLATION_SUFFIXES
        .iter()
        .any(|suffix| coordinate.ends_with(suffix))
}

pub fn run(context: &PipelineContext<'_>, manifest: &mut ArtifactManifest, report: &mut StageReport) {
    let model = match require_scaled_model(manifest) {
        Ok(model) => model,
        Err(error) => {
            report.blocked(&error);
            return;
        }
    };
    let trials = manifest.trials_with(ArtifactKind::Kinematics);
    if trials.is_empty() {
        report.blocked(&DiscoveryError::NoKinematics.into());
        return;
    }
    info!(count = trials.len(), "kinematics files for center of mass");

    super::for_each_trial(&trials, report, |trial, kinematics, report| {
        let angles = read_storage(kinematics)?;
        let com = mass_center_series(context, &model, &angles)?;
        let output = manifest.path_for(trial, ArtifactKind::CenterOfMass);
        context.engine.write_time_series(&com, &output)?;
        normalize_header(&output)?;
        manifest.record(trial, ArtifactKind::CenterOfMass, output.clone());
        report.completed(trial, vec![output]);
        Ok(())
    });
}

/// Pose the model at every frame of `angles` and collect the mass center.
fn mass_center_series(
    context: &PipelineContext<'_>,
    model: &Path,
    angles: &ScalarTable,
) -> Result<ScalarTable, StageError> {
    let in_degrees = angles.meta.in_degrees == Some(true);
    if in_degrees {
        debug!("converting rotational coordinates from degrees to radians");
    }
    let mut com = ScalarTable::new(COM_LABELS.iter().map(|label| (*label).to_string()).collect())?;
    for (frame, &time) in angles.times().iter().enumerate() {
        let values = angles
            .labels()
            .iter()
            .zip(angles.row(frame))
            .map(|(coordinate, &value)| {
                let value = if in_degrees && !is_translation(coordinate) {
                    value.to_radians()
                } else {
                    value
                };
                (coordinate.clone(), value)
            })
            .collect();
        let position = context
            .engine
            .mass_center(model, &CoordinateFrame { time, values })?;
        com.push_frame(time, position.to_array().to_vec())?;
    }
    Ok(com)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translations_are_recognized_by_suffix() {
        assert!(is_translation("pelvis_tx"));
        assert!(is_translation("pelvis_tz"));
        assert!(!is_translation("pelvis_tilt"));
        assert!(!is_translation("knee_angle_r"));
        assert!(!is_translation("tx"));
    }
}
