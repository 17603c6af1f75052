//! One module per pipeline stage.
//!
//! Every stage follows the same shape: check stage-level prerequisites
//! (recorded with [`StageReport::blocked`]), then process trials one at a
//! time in name order, catching each trial's error so siblings still run.

use std::path::{Path, PathBuf};

use mocap_model::TimeRange;
use tracing::{info, info_span};

use crate::error::{DiscoveryError, StageError};
use crate::manifest::ArtifactManifest;
use crate::types::StageReport;

pub mod com;
pub mod export;
pub mod id;
pub mod ik;
pub mod scaling;

/// The scaled model every post-scaling stage depends on.
pub(crate) fn require_scaled_model(manifest: &ArtifactManifest) -> Result<PathBuf, StageError> {
    manifest
        .scaled_model()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            DiscoveryError::MissingScaledModel {
                path: manifest.scaled_model_path(),
            }
            .into()
        })
}

/// Full extent of a time column, or an error for an empty file.
pub(crate) fn full_range(times: &[f64], path: &Path) -> Result<TimeRange, StageError> {
    TimeRange::spanning(times).ok_or_else(|| {
        DiscoveryError::EmptyTrial {
            path: path.to_path_buf(),
        }
        .into()
    })
}

/// Run `process` for each trial inside its own span, recording the outcome.
pub(crate) fn for_each_trial<F>(
    trials: &[(String, PathBuf)],
    report: &mut StageReport,
    mut process: F,
) where
    F: FnMut(&str, &Path, &mut StageReport) -> Result<(), StageError>,
{
    for (trial, input) in trials {
        let span = info_span!("trial", trial = %trial);
        let _guard = span.enter();
        info!(input = %input.display(), "processing");
        match process(trial, input, report) {
            Ok(()) => {}
            Err(error @ StageError::Discovery(_)) => report.skipped(trial, &error),
            Err(error) => report.failed(trial, &error),
        }
    }
}
