//! Inverse kinematics for every non-static trial.

use mocap_engine::IkRequest;
use mocap_io::read_trc;
use mocap_model::ArtifactKind;
use tracing::info;

use super::{full_range, require_scaled_model};
use crate::error::DiscoveryError;
use crate::manifest::ArtifactManifest;
use crate::pipeline::PipelineContext;
use crate::types::StageReport;

pub fn run(context: &PipelineContext<'_>, manifest: &mut ArtifactManifest, report: &mut StageReport) {
    let config = context.config;
    let model = match require_scaled_model(manifest) {
        Ok(model) => model,
        Err(error) => {
            report.blocked(&error);
            return;
        }
    };
    let trials: Vec<_> = manifest
        .trials_with(ArtifactKind::Markers)
        .into_iter()
        .filter(|(trial, _)| !config.static_pattern.matches_trial(trial))
        .collect();
    if trials.is_empty() {
        report.blocked(&DiscoveryError::NoMarkerFiles.into());
        return;
    }
    info!(count = trials.len(), "marker files for inverse kinematics");

    super::for_each_trial(&trials, report, |trial, trc, report| {
        let time_range = match config.ik_time_range {
            Some(range) => range,
            None => full_range(read_trc(trc)?.times(), trc)?,
        };
        let output = manifest.path_for(trial, ArtifactKind::Kinematics);
        let request = IkRequest {
            trial,
            model: &model,
            marker_file: trc,
            marker_weights: &context.tables.marker_weights,
            time_range,
            output: &output,
        };
        let produced = context.engine.solve_ik(&request)?;
        manifest.record(trial, ArtifactKind::Kinematics, produced.clone());
        report.completed(trial, vec![produced]);
        Ok(())
    });
}
