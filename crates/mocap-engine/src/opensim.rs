//! Adapter that drives OpenSim through its command-line tool runner.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use mocap_io::{write_storage, write_trc};
use mocap_model::{MarkerTable, ScalarTable, Vec3};
use tracing::debug;

use crate::engine::{BiomechEngine, Capture, CoordinateFrame, IdRequest, IkRequest, ScaleRequest};
use crate::error::EngineError;
use crate::setup::{render_external_loads, render_id_setup, render_ik_setup, render_scale_setup};

const ENGINE_NAME: &str = "opensim-cmd";

/// Runs ScaleTool, InverseKinematicsTool and InverseDynamicsTool as
/// `<executable> run-tool <setup.xml>`.
///
/// Setup documents are written next to the outputs they describe so a failed
/// run can be reproduced by hand. Reading binary captures and posing a model
/// frame by frame need an in-process binding; this adapter reports them as
/// unsupported.
#[derive(Debug, Clone)]
pub struct OpenSimCmdEngine {
    executable: PathBuf,
}

impl OpenSimCmdEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn write_setup(&self, path: &Path, contents: &str) -> Result<(), EngineError> {
        fs::write(path, contents).map_err(|e| EngineError::io(path, e))?;
        debug!(path = %path.display(), "wrote setup document");
        Ok(())
    }

    fn run_tool(
        &self,
        tool: &'static str,
        setup: &Path,
        expected: &Path,
    ) -> Result<PathBuf, EngineError> {
        debug!(
            tool,
            executable = %self.executable.display(),
            setup = %setup.display(),
            "running tool"
        );
        let mut command = Command::new(&self.executable);
        command.arg("run-tool").arg(setup);
        if let Some(dir) = setup.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            command.current_dir(dir);
        }
        let output = command.output().map_err(|source| EngineError::Spawn {
            program: self.executable.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(EngineError::ToolFailed {
                tool,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !expected.is_file() {
            return Err(EngineError::MissingOutput {
                tool,
                path: expected.to_path_buf(),
            });
        }
        Ok(expected.to_path_buf())
    }
}

impl BiomechEngine for OpenSimCmdEngine {
    fn read_capture(&self, _path: &Path) -> Result<Capture, EngineError> {
        Err(EngineError::Unsupported {
            engine: ENGINE_NAME,
            operation: "reading capture files",
        })
    }

    fn write_markers(&self, table: &MarkerTable, path: &Path) -> Result<(), EngineError> {
        write_trc(table, path)?;
        Ok(())
    }

    fn write_time_series(&self, table: &ScalarTable, path: &Path) -> Result<(), EngineError> {
        write_storage(table, path)?;
        Ok(())
    }

    fn scale_model(&self, request: &ScaleRequest<'_>) -> Result<PathBuf, EngineError> {
        let setup = request
            .output_model
            .with_file_name(format!("{}_scale_setup.xml", request.name));
        self.write_setup(&setup, &render_scale_setup(request)?)?;
        self.run_tool("ScaleTool", &setup, request.output_model)
    }

    fn solve_ik(&self, request: &IkRequest<'_>) -> Result<PathBuf, EngineError> {
        let setup = request
            .output
            .with_file_name(format!("{}_ik_setup.xml", request.trial));
        self.write_setup(&setup, &render_ik_setup(request)?)?;
        self.run_tool("InverseKinematicsTool", &setup, request.output)
    }

    fn solve_id(&self, request: &IdRequest<'_>) -> Result<PathBuf, EngineError> {
        self.write_setup(
            &request.external_loads_file(),
            &render_external_loads(request)?,
        )?;
        let setup = request
            .output
            .with_file_name(format!("{}_id_setup.xml", request.trial));
        self.write_setup(&setup, &render_id_setup(request)?)?;
        self.run_tool("InverseDynamicsTool", &setup, request.output)
    }

    fn mass_center(&self, _model: &Path, _frame: &CoordinateFrame) -> Result<Vec3, EngineError> {
        Err(EngineError::Unsupported {
            engine: ENGINE_NAME,
            operation: "posing a model",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocap_model::{MarkerWeight, TimeRange};
    use tempfile::TempDir;

    fn ik_request<'a>(dir: &'a Path, output: &'a Path, weights: &'a [MarkerWeight]) -> IkRequest<'a> {
        IkRequest {
            trial: "walk01",
            model: dir,
            marker_file: dir,
            marker_weights: weights,
            time_range: TimeRange::new(0.0, 1.0),
            output,
        }
    }

    #[test]
    fn capture_reading_is_unsupported() {
        let engine = OpenSimCmdEngine::new("opensim-cmd");
        let err = engine.read_capture(Path::new("walk01.c3d")).unwrap_err();
        assert!(matches!(err, EngineError::Unsupported { .. }));
    }

    #[test]
    fn missing_executable_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("walk01_ik.mot");
        let engine = OpenSimCmdEngine::new(dir.path().join("no-such-opensim"));

        let err = engine
            .solve_ik(&ik_request(dir.path(), &output, &[]))
            .unwrap_err();

        assert!(matches!(err, EngineError::Spawn { .. }));
        assert!(dir.path().join("walk01_ik_setup.xml").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_is_reported() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("walk01_ik.mot");
        let engine = OpenSimCmdEngine::new("false");

        let err = engine
            .solve_ik(&ik_request(dir.path(), &output, &[]))
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::ToolFailed {
                tool: "InverseKinematicsTool",
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn successful_tool_without_output_is_reported() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("walk01_ik.mot");
        let engine = OpenSimCmdEngine::new("true");

        let err = engine
            .solve_ik(&ik_request(dir.path(), &output, &[]))
            .unwrap_err();

        assert!(matches!(err, EngineError::MissingOutput { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn id_writes_external_loads_descriptor() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("walk01_id.sto");
        fs::write(&output, "").unwrap();
        let engine = OpenSimCmdEngine::new("true");
        let request = IdRequest {
            trial: "walk01",
            model: dir.path(),
            coordinates_file: dir.path(),
            forces_file: dir.path(),
            external_loads: &[],
            excluded_forces: &[crate::MUSCLES_FORCE_GROUP],
            low_pass_cutoff: 6.0,
            time_range: TimeRange::new(0.0, 1.0),
            output: &output,
        };

        let produced = engine.solve_id(&request).unwrap();

        assert_eq!(produced, output);
        assert!(dir.path().join("walk01_external_loads.xml").is_file());
        assert!(dir.path().join("walk01_id_setup.xml").is_file());
    }
}
