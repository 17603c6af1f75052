//! Per-trial artifact naming.
//!
//! File names are the only contract between stages: every stage finds its
//! inputs by the suffix convention below.

/// File name of the scaled model in the output folder.
pub const SCALED_MODEL_FILE: &str = "scaled_model.osim";

/// Kinds of per-trial artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// Marker trajectories, `<trial>.trc`.
    Markers,
    /// Ground reaction forces, `<trial>.mot`.
    Forces,
    /// Joint angles, `<trial>_ik.mot`.
    Kinematics,
    /// Joint moments, `<trial>_id.sto`.
    Dynamics,
    /// Whole-body center of mass, `<trial>_com.sto`.
    CenterOfMass,
}

impl ArtifactKind {
    /// Suffix appended to the trial name, extension included.
    pub const fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Markers => ".trc",
            ArtifactKind::Forces => ".mot",
            ArtifactKind::Kinematics => "_ik.mot",
            ArtifactKind::Dynamics => "_id.sto",
            ArtifactKind::CenterOfMass => "_com.sto",
        }
    }

    pub fn file_name(self, trial: &str) -> String {
        format!("{trial}{}", self.suffix())
    }
}

/// Classify a file name into `(trial, kind)`.
///
/// Longer suffixes win, so `walk_ik.mot` is kinematics for `walk` rather
/// than forces for `walk_ik`.
pub fn parse_artifact_name(file_name: &str) -> Option<(String, ArtifactKind)> {
    const BY_PRIORITY: [ArtifactKind; 5] = [
        ArtifactKind::Kinematics,
        ArtifactKind::Dynamics,
        ArtifactKind::CenterOfMass,
        ArtifactKind::Markers,
        ArtifactKind::Forces,
    ];
    BY_PRIORITY.iter().find_map(|kind| {
        file_name
            .strip_suffix(kind.suffix())
            .filter(|trial| !trial.is_empty())
            .map(|trial| (trial.to_string(), *kind))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_suffix_convention() {
        assert_eq!(ArtifactKind::Markers.file_name("walk01"), "walk01.trc");
        assert_eq!(ArtifactKind::Forces.file_name("walk01"), "walk01.mot");
        assert_eq!(ArtifactKind::Kinematics.file_name("walk01"), "walk01_ik.mot");
        assert_eq!(ArtifactKind::Dynamics.file_name("walk01"), "walk01_id.sto");
        assert_eq!(ArtifactKind::CenterOfMass.file_name("walk01"), "walk01_com.sto");
    }

    #[test]
    fn parses_longest_suffix_first() {
        assert_eq!(
            parse_artifact_name("walk01_ik.mot"),
            Some(("walk01".to_string(), ArtifactKind::Kinematics))
        );
        assert_eq!(
            parse_artifact_name("walk01.mot"),
            Some(("walk01".to_string(), ArtifactKind::Forces))
        );
        assert_eq!(
            parse_artifact_name("walk01_com.sto"),
            Some(("walk01".to_string(), ArtifactKind::CenterOfMass))
        );
        assert_eq!(parse_artifact_name("scaled_model.osim"), None);
        assert_eq!(parse_artifact_name("walk01_external_loads.xml"), None);
        assert_eq!(parse_artifact_name(".trc"), None);
    }
}
