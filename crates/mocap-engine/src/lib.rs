//! Interface to the external biomechanical engine.
//!
//! The pipeline never inspects how markers become joint angles or moments;
//! it only talks to a [`BiomechEngine`]. [`OpenSimCmdEngine`] drives the
//! `opensim-cmd` tool runner through generated setup documents.

pub mod engine;
pub mod error;
pub mod opensim;
pub mod setup;

pub use engine::{
    BiomechEngine, Capture, CoordinateFrame, IdRequest, IkRequest, MUSCLES_FORCE_GROUP,
    ScaleRequest,
};
pub use error::EngineError;
pub use opensim::OpenSimCmdEngine;
