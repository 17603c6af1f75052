#![deny(unsafe_code)]

pub mod error;
pub mod pattern;
pub mod settings;
pub mod tables;

pub use crate::error::ConfigError;
pub use crate::pattern::StaticPattern;
pub use crate::settings::{ConfigPaths, PipelineConfig, Stage, load_config};
pub use crate::tables::{
    ConfigTables, parse_external_loads, parse_marker_weights, parse_scaling_measurements,
};
