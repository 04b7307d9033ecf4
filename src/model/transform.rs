//! Affine transforms as stored in 3MF documents

use nalgebra::Matrix4;

use crate::error::{Error, Result};

/// Size of a 3MF transformation matrix (4x3 affine transform in row-major order)
pub const TRANSFORM_MATRIX_SIZE: usize = 12;

/// A 3MF affine transform
///
/// Stored as the 12 values of the `transform` attribute:
/// `m00 m01 m02 m10 m11 m12 m20 m21 m22 m30 m31 m32`.
///
/// 3MF multiplies row vectors from the left, so the first three rows are the
/// linear part and the last row is the translation:
///
/// ```text
///            | m00 m01 m02 0 |
/// [x y z 1]  | m10 m11 m12 0 |
///            | m20 m21 m22 0 |
///            | m30 m31 m32 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(pub [f64; TRANSFORM_MATRIX_SIZE]);

impl Transform {
    /// The identity transform
    pub const IDENTITY: Transform = Transform([
        1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0,
    ]);

    /// A pure translation
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut values = Self::IDENTITY.0;
        values[9] = x;
        values[10] = y;
        values[11] = z;
        Transform(values)
    }

    /// Parse the whitespace-separated value list of a `transform` attribute
    ///
    /// The list must hold exactly 12 finite numbers.
    ///
    /// # Example
    ///
    /// ```
    /// use threemf_scene::Transform;
    ///
    /// let t = Transform::parse("1 0 0 0 1 0 0 0 1 10 20 30").unwrap();
    /// assert_eq!(t, Transform::translation(10.0, 20.0, 30.0));
    /// assert!(Transform::parse("1 0 0").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        let mut values = [0.0; TRANSFORM_MATRIX_SIZE];
        let mut count = 0;

        for token in value.split_whitespace() {
            if count == TRANSFORM_MATRIX_SIZE {
                return Err(Error::parse_error_with_context(
                    "transform",
                    value,
                    "12 space-separated numbers",
                ));
            }
            let number = token.parse::<f64>().map_err(|_| {
                Error::parse_error_with_context("transform", value, "12 space-separated numbers")
            })?;
            if !number.is_finite() {
                return Err(Error::parse_error_with_context(
                    "transform",
                    value,
                    "finite numbers",
                ));
            }
            values[count] = number;
            count += 1;
        }

        if count != TRANSFORM_MATRIX_SIZE {
            return Err(Error::parse_error_with_context(
                "transform",
                value,
                "12 space-separated numbers",
            ));
        }

        Ok(Transform(values))
    }

    /// The equivalent 4x4 matrix acting on column vectors
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let m = &self.0;
        Matrix4::new(
            m[0], m[3], m[6], m[9], //
            m[1], m[4], m[7], m[10], //
            m[2], m[5], m[8], m[11], //
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
