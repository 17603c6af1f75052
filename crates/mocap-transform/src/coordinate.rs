//! Coordinate-frame remapping of point tables.
//!
//! Points are multiplied by the inverse of the configured homogeneous
//! matrix with the fourth coordinate fixed at 0. The translation column of
//! the inverse therefore never contributes: only the 3x3 linear block of the
//! matrix acts on the data.

use mocap_model::{PointTable, TransformMatrix, Vec3};
use nalgebra::{Matrix4, Vector4};

use crate::error::NumericError;

/// Inverse of a homogeneous transform, computed once and applied to many points.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTransform {
    inverse: Matrix4<f64>,
}

impl CoordinateTransform {
    pub fn new(matrix: &TransformMatrix) -> Result<Self, NumericError> {
        let forward = Matrix4::from_fn(|i, j| matrix[i][j]);
        let singular = || NumericError::SingularTransform {
            determinant: forward.determinant(),
        };
        let inverse = forward.try_inverse().ok_or_else(singular)?;
        if inverse.iter().any(|value| !value.is_finite()) {
            return Err(singular());
        }
        Ok(Self { inverse })
    }

    pub fn apply(&self, point: Vec3) -> Vec3 {
        let mapped = self.inverse * Vector4::new(point.x, point.y, point.z, 0.0);
        Vec3::new(mapped.x, mapped.y, mapped.z)
    }

    /// Remap every present point of `table` in place.
    pub fn apply_to_table(&self, table: &mut PointTable) {
        for cell in table.cells_mut() {
            if let Some(point) = cell {
                *point = self.apply(*point);
            }
        }
    }
}

/// Remap all points of `table` in place using the inverse of `matrix`.
///
/// Shape and labels are unchanged; missing samples stay missing.
pub fn transform_points(table: &mut PointTable, matrix: &TransformMatrix) -> Result<(), NumericError> {
    CoordinateTransform::new(matrix)?.apply_to_table(table);
    Ok(())
}
