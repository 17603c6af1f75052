//! Run reporting threaded through every stage.

use std::path::PathBuf;

use mocap_config::Stage;
use tracing::{error, info, warn};

use crate::error::{DiscoveryError, StageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub trial: String,
    pub status: TrialStatus,
    pub artifacts: Vec<PathBuf>,
    /// Failure or skip reason, or a warning attached to a completed trial.
    pub message: Option<String>,
}

/// Everything one stage did. A stage-level error means the trial loop never ran.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub trials: Vec<TrialOutcome>,
    pub error: Option<String>,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            trials: Vec::new(),
            error: None,
        }
    }

    pub fn completed(&mut self, trial: &str, artifacts: Vec<PathBuf>) {
        for artifact in &artifacts {
            info!(trial, artifact = %artifact.display(), "produced");
        }
        self.trials.push(TrialOutcome {
            trial: trial.to_string(),
            status: TrialStatus::Completed,
            artifacts,
            message: None,
        });
    }

    /// Completed trial whose optional output could not be produced.
    pub fn completed_with_warning(&mut self, trial: &str, artifacts: Vec<PathBuf>, warning: String) {
        self.completed(trial, artifacts);
        if let Some(outcome) = self.trials.last_mut() {
            outcome.message = Some(warning);
        }
    }

    pub fn skipped(&mut self, trial: &str, reason: &StageError) {
        warn!(trial, "skipping: {reason}");
        self.trials.push(TrialOutcome {
            trial: trial.to_string(),
            status: TrialStatus::Skipped,
            artifacts: Vec::new(),
            message: Some(reason.to_string()),
        });
    }

    pub fn failed(&mut self, trial: &str, error: &StageError) {
        error!(trial, "{} failed: {error}", self.stage.label());
        self.trials.push(TrialOutcome {
            trial: trial.to_string(),
            status: TrialStatus::Failed,
            artifacts: Vec::new(),
            message: Some(error.to_string()),
        });
    }

    /// Stage-level precondition failure; missing prerequisites are errors,
    /// nothing-to-do conditions are warnings.
    pub fn blocked(&mut self, reason: &StageError) {
        match reason {
            StageError::Discovery(
                DiscoveryError::MissingScaledModel { .. }
                | DiscoveryError::DirectoryNotFound { .. }
                | DiscoveryError::DirectoryRead { .. },
            ) => error!("{} skipped: {reason}", self.stage.label()),
            _ => warn!("{} skipped: {reason}", self.stage.label()),
        }
        self.error = Some(reason.to_string());
    }

    pub fn count(&self, status: TrialStatus) -> usize {
        self.trials
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    pub fn artifact_count(&self) -> usize {
        self.trials.iter().map(|outcome| outcome.artifacts.len()).sum()
    }

    pub fn outcome(&self, trial: &str) -> Option<&TrialOutcome> {
        self.trials.iter().find(|outcome| outcome.trial == trial)
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            stages: Vec::new(),
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    pub fn failed_trials(&self) -> usize {
        self.stages
            .iter()
            .map(|report| report.count(TrialStatus::Failed))
            .sum()
    }

    /// Every failure, skip reason, and completion warning, prefixed with its
    /// stage and trial.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for report in &self.stages {
            let label = report.stage.label();
            if let Some(error) = &report.error {
                problems.push(format!("{label}: {error}"));
            }
            for outcome in &report.trials {
                let Some(message) = &outcome.message else {
                    continue;
                };
                let prefix = match outcome.status {
                    TrialStatus::Completed => "warning: ",
                    TrialStatus::Skipped | TrialStatus::Failed => "",
                };
                problems.push(format!("{label} [{}]: {prefix}{message}", outcome.trial));
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problems_include_completion_warnings() {
        let mut export = StageReport::new(Stage::Export);
        export.completed("walk01", vec![PathBuf::from("out/walk01.trc")]);
        export.completed_with_warning(
            "walk02",
            vec![PathBuf::from("out/walk02.trc")],
            "no forces exported: bad plate".to_string(),
        );
        let mut report = RunReport::new(PathBuf::from("out"));
        report.stages.push(export);

        assert_eq!(
            report.problems(),
            vec!["export [walk02]: warning: no forces exported: bad plate".to_string()]
        );
        assert_eq!(report.stages[0].count(TrialStatus::Completed), 2);
    }

    #[test]
    fn problems_list_stage_errors_and_failed_trials() {
        let mut ik = StageReport::new(Stage::InverseKinematics);
        ik.error = Some("scaled model not found".to_string());
        ik.trials.push(TrialOutcome {
            trial: "walk01".to_string(),
            status: TrialStatus::Failed,
            artifacts: Vec::new(),
            message: Some("tool exited with 1".to_string()),
        });
        let mut report = RunReport::new(PathBuf::from("out"));
        report.stages.push(ik);

        let problems = report.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems[1].ends_with("[walk01]: tool exited with 1"));
    }
}
