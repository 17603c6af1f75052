//! Inverse dynamics for every trial with kinematics and force data.

use std::path::Path;

use mocap_engine::{IdRequest, MUSCLES_FORCE_GROUP};
use mocap_io::read_storage;
use mocap_model::ArtifactKind;
use tracing::info;

use super::{full_range, require_scaled_model};
use crate::error::DiscoveryError;
use crate::manifest::ArtifactManifest;
use crate::pipeline::PipelineContext;
use crate::types::StageReport;

const EXCLUDED_FORCES: [&str; 1] = [MUSCLES_FORCE_GROUP];

pub fn run(context: &PipelineContext<'_>, manifest: &mut ArtifactManifest, report: &mut StageReport) {
    let config = context.config;
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
    info!(count = trials.len(), "kinematics files for inverse dynamics");

    super::for_each_trial(&trials, report, |trial, kinematics, report| {
        let Some(forces) = manifest.get(trial, ArtifactKind::Forces).map(Path::to_path_buf)
        else {
            return Err(DiscoveryError::MissingForces {
                trial: trial.to_string(),
                expected: ArtifactKind::Forces.file_name(trial),
            }
            .into());
        };
        let time_range = match config.id_time_range {
            Some(range) => range,
            None => full_range(read_storage(kinematics)?.times(), kinematics)?,
        };
        let output = manifest.path_for(trial, ArtifactKind::Dynamics);
        let request = IdRequest {
            trial,
            model: &model,
            coordinates_file: kinematics,
            forces_file: &forces,
            external_loads: &context.tables.external_loads,
            excluded_forces: &EXCLUDED_FORCES,
            low_pass_cutoff: config.low_pass_cutoff,
            time_range,
            output: &output,
        };
        let produced = context.engine.solve_id(&request)?;
        manifest.record(trial, ArtifactKind::Dynamics, produced.clone());
        report.completed(trial, vec![produced]);
        Ok(())
    });
}
