//! Records parsed from the tab-delimited configuration tables.

/// Default scaling axes when a measurement table never states any.
pub const DEFAULT_AXES: &str = "X Y Z";

/// Two markers whose distance contributes to a scaling measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    pub first: String,
    pub second: String,
}

impl MarkerPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// A named rule that scales body segments by marker-distance ratios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingMeasurement {
    pub name: String,
    pub marker_pairs: Vec<MarkerPair>,
    pub bodies: Vec<String>,
    /// Axis names as written in the table, e.g. `"X Y Z"`.
    pub axes: String,
}

impl ScalingMeasurement {
    /// Individual axis names (`"X Y"` -> `["X", "Y"]`).
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.split_whitespace()
    }
}

/// Per-marker tracking weight used by scaling and inverse kinematics.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerWeight {
    pub marker: String,
    pub weight: f64,
    pub apply: bool,
}

/// One external force applied to a model body, sourced from GRF columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLoadDefinition {
    pub name: String,
    pub body: String,
    pub force_identifier: String,
    pub point_identifier: String,
    pub torque_identifier: String,
}
