use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use mocap_cli::{RunReport, run_pipeline};
use mocap_config::{ConfigTables, Stage, load_config};
use mocap_engine::OpenSimCmdEngine;

/// Load the configuration and its tables, then run every enabled stage.
///
/// Configuration errors abort before any stage executes.
pub fn run(config_path: &Path) -> Result<RunReport> {
    let span = info_span!("run", config = %config_path.display());
    let _guard = span.enter();

    let config = load_config(config_path)
        .with_context(|| format!("load configuration {}", config_path.display()))?;
    let tables = ConfigTables::load_for(&config).context("load configuration tables")?;
    let stages: Vec<&str> = config.enabled_stages().map(Stage::label).collect();
    info!(
        output = %config.paths.output_folder.display(),
        stages = %stages.join(", "),
        "configuration loaded"
    );

    let engine = OpenSimCmdEngine::new(&config.engine_executable);
    let report = run_pipeline(&config, &tables, &engine).context("run pipeline")?;
    Ok(report)
}
