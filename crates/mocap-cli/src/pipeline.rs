//! Runs the enabled stages in their fixed order.

use std::fs;

use mocap_config::{ConfigTables, PipelineConfig, Stage};
use mocap_engine::BiomechEngine;
use tracing::{debug, info, info_span};

use crate::error::StageError;
use crate::manifest::ArtifactManifest;
use crate::stages;
use crate::types::{RunReport, StageReport, TrialStatus};

/// Read-only inputs shared by every stage of a run.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a> {
    pub config: &'a PipelineConfig,
    pub tables: &'a ConfigTables,
    pub engine: &'a dyn BiomechEngine,
}

/// Execute every enabled stage.
///
/// Only failing to prepare the output folder aborts the run; stage and trial
/// failures are recorded in the returned report.
pub fn run_pipeline(
    config: &PipelineConfig,
    tables: &ConfigTables,
    engine: &dyn BiomechEngine,
) -> Result<RunReport, StageError> {
    let output_dir = &config.paths.output_folder;
    fs::create_dir_all(output_dir).map_err(|source| StageError::CreateDir {
        path: output_dir.clone(),
        source,
    })?;
    let mut manifest = ArtifactManifest::scan(output_dir)?;
    let context = PipelineContext {
        config,
        tables,
        engine,
    };

    let mut report = RunReport::new(output_dir.clone());
    for stage in Stage::ALL {
        if !config.is_enabled(stage) {
            debug!(stage = stage.label(), "stage disabled");
            continue;
        }
        let span = info_span!("stage", stage = stage.label());
        let stage_report = span.in_scope(|| run_stage(stage, &context, &mut manifest));
        info!(
            stage = stage.label(),
            completed = stage_report.count(TrialStatus::Completed),
            skipped = stage_report.count(TrialStatus::Skipped),
            failed = stage_report.count(TrialStatus::Failed),
            "stage finished"
        );
        report.stages.push(stage_report);
    }
    info!(failed_trials = report.failed_trials(), "pipeline complete");
    Ok(report)
}

fn run_stage(
    stage: Stage,
    context: &PipelineContext<'_>,
    manifest: &mut ArtifactManifest,
) -> StageReport {
    let mut report = StageReport::new(stage);
    match stage {
        Stage::Export => stages::export::run(context, manifest, &mut report),
        Stage::Scaling => stages::scaling::run(context, manifest, &mut report),
        Stage::InverseKinematics => stages::ik::run(context, manifest, &mut report),
        Stage::InverseDynamics => stages::id::run(context, manifest, &mut report),
        Stage::CenterOfMass => stages::com::run(context, manifest, &mut report),
    }
    report
}
