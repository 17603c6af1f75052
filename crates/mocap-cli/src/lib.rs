//! Stage orchestration for the motion-capture pipeline.
//!
//! The binary wires configuration, logging and the OpenSim adapter together;
//! everything it runs lives here so the stage sequence can be exercised with
//! any [`mocap_engine::BiomechEngine`].

pub mod discovery;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use error::{DiscoveryError, StageError};
pub use manifest::ArtifactManifest;
pub use pipeline::{PipelineContext, run_pipeline};
pub use types::{RunReport, StageReport, TrialOutcome, TrialStatus};
