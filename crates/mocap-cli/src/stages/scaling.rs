//! Model scaling from the static calibration trial.

use mocap_engine::ScaleRequest;
use mocap_io::read_trc;
use mocap_model::ArtifactKind;
use tracing::info;

use super::full_range;
use crate::error::DiscoveryError;
use crate::manifest::ArtifactManifest;
use crate::pipeline::PipelineContext;
use crate::types::StageReport;

pub fn run(context: &PipelineContext<'_>, manifest: &mut ArtifactManifest, report: &mut StageReport) {
    let config = context.config;
    let Some((trial, trc)) = manifest
        .trials_with(ArtifactKind::Markers)
        .into_iter()
        .find(|(trial, _)| config.static_pattern.matches_trial(trial))
    else {
        report.blocked(
            &DiscoveryError::NoStaticTrial {
                pattern: config.static_pattern.as_str().to_string(),
            }
            .into(),
        );
        return;
    };
    info!(static_trial = %trial, "scaling with static trial");

    let output_model = manifest.scaled_model_path();
    let name = output_model
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let trials = vec![(trial, trc)];
    super::for_each_trial(&trials, report, |trial, trc, report| {
        let markers = read_trc(trc)?;
        let request = ScaleRequest {
            name: &name,
            generic_model: &config.paths.generic_model,
            marker_file: trc,
            time_range: full_range(markers.times(), trc)?,
            subject_mass: config.subject_mass,
            measurements: &context.tables.measurements,
            marker_weights: &context.tables.marker_weights,
            output_model: &output_model,
        };
        let scaled = context.engine.scale_model(&request)?;
        manifest.record_scaled_model(scaled.clone());
        report.completed(trial, vec![scaled]);
        Ok(())
    });
}
