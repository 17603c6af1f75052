/// A point or vector in 3-D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(value: [f64; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

/// Row-major 4x4 homogeneous transform.
pub type TransformMatrix = [[f64; 4]; 4];

/// Default lab-to-model coordinate remap.
pub const DEFAULT_TRANSFORM: TransformMatrix = [
    [0.0, 0.0, -1.0, 0.0],
    [-1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Closed time interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Full extent of a strictly increasing timestamp column.
    pub fn spanning(times: &[f64]) -> Option<Self> {
        match (times.first(), times.last()) {
            (Some(&start), Some(&end)) => Some(Self { start, end }),
            _ => None,
        }
    }
}
