//! In-memory record of per-trial artifacts in the output folder.
//!
//! The manifest is seeded from the directory contents, so results of earlier
//! runs are picked up, and then updated with every file a stage produces.
//! Stages read their inputs from it instead of re-listing the directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mocap_model::{ArtifactKind, SCALED_MODEL_FILE, parse_artifact_name};
use tracing::debug;

use crate::error::DiscoveryError;

#[derive(Debug, Clone)]
pub struct ArtifactManifest {
    output_dir: PathBuf,
    scaled_model: Option<PathBuf>,
    trials: BTreeMap<String, BTreeMap<ArtifactKind, PathBuf>>,
}

impl ArtifactManifest {
    /// Empty manifest for `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            scaled_model: None,
            trials: BTreeMap::new(),
        }
    }

    /// Build a manifest from the files already present in `output_dir`.
    pub fn scan(output_dir: &Path) -> Result<Self, DiscoveryError> {
        let mut manifest = Self::new(output_dir);
        if !output_dir.is_dir() {
            return Err(DiscoveryError::DirectoryNotFound {
                path: output_dir.to_path_buf(),
            });
        }
        let entries = std::fs::read_dir(output_dir).map_err(|e| DiscoveryError::DirectoryRead {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        for entry_result in entries {
            let entry = entry_result.map_err(|e| DiscoveryError::DirectoryRead {
                path: output_dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if file_name == SCALED_MODEL_FILE {
                manifest.scaled_model = Some(path);
                continue;
            }
            if let Some((trial, kind)) = parse_artifact_name(file_name) {
                manifest.record(&trial, kind, path);
            }
        }
        debug!(
            output_dir = %output_dir.display(),
            trials = manifest.trials.len(),
            scaled_model = manifest.scaled_model.is_some(),
            "scanned output folder"
        );
        Ok(manifest)
    }

    /// Where the artifact of `kind` for `trial` lives (whether or not it exists).
    pub fn path_for(&self, trial: &str, kind: ArtifactKind) -> PathBuf {
        self.output_dir.join(kind.file_name(trial))
    }

    /// Where the scaled model is written.
    pub fn scaled_model_path(&self) -> PathBuf {
        self.output_dir.join(SCALED_MODEL_FILE)
    }

    /// The scaled model, if one exists or was produced in this run.
    pub fn scaled_model(&self) -> Option<&Path> {
        self.scaled_model.as_deref()
    }

    pub fn record_scaled_model(&mut self, path: PathBuf) {
        self.scaled_model = Some(path);
    }

    pub fn record(&mut self, trial: &str, kind: ArtifactKind, path: PathBuf) {
        self.trials
            .entry(trial.to_string())
            .or_default()
            .insert(kind, path);
    }

    pub fn get(&self, trial: &str, kind: ArtifactKind) -> Option<&Path> {
        self.trials
            .get(trial)
            .and_then(|artifacts| artifacts.get(&kind))
            .map(PathBuf::as_path)
    }

    /// Trials that have an artifact of `kind`, in lexicographic trial order.
    pub fn trials_with(&self, kind: ArtifactKind) -> Vec<(String, PathBuf)> {
        self.trials
            .iter()
            .filter_map(|(trial, artifacts)| {
                artifacts
                    .get(&kind)
                    .map(|path| (trial.clone(), path.clone()))
            })
            .collect()
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scan_classifies_artifacts_by_suffix() {
        let dir = TempDir::new().unwrap();
        for name in [
            "walk01.trc",
            "walk01.mot",
            "walk01_ik.mot",
            "walk02.trc",
            "walk02_ik_setup.xml",
            "scaled_model.osim",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let manifest = ArtifactManifest::scan(dir.path()).unwrap();

        assert_eq!(manifest.trial_count(), 2);
        assert_eq!(
            manifest.get("walk01", ArtifactKind::Kinematics),
            Some(dir.path().join("walk01_ik.mot").as_path())
        );
        assert!(manifest.get("walk01", ArtifactKind::Forces).is_some());
        assert!(manifest.get("walk02", ArtifactKind::Forces).is_none());
        assert_eq!(
            manifest.scaled_model(),
            Some(dir.path().join("scaled_model.osim").as_path())
        );
        let markers: Vec<String> = manifest
            .trials_with(ArtifactKind::Markers)
            .into_iter()
            .map(|(trial, _)| trial)
            .collect();
        assert_eq!(markers, vec!["walk01", "walk02"]);
    }

    #[test]
    fn recorded_artifacts_are_visible_to_later_lookups() {
        let mut manifest = ArtifactManifest::new("/out");
        assert!(manifest.trials_with(ArtifactKind::Kinematics).is_empty());

        let path = manifest.path_for("run", ArtifactKind::Kinematics);
        manifest.record("run", ArtifactKind::Kinematics, path);

        assert_eq!(
            manifest.get("run", ArtifactKind::Kinematics),
            Some(Path::new("/out/run_ik.mot"))
        );
        assert_eq!(manifest.scaled_model_path(), PathBuf::from("/out/scaled_model.osim"));
        assert!(manifest.scaled_model().is_none());
    }
}
