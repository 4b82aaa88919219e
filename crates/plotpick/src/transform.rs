//! Pixel-to-plot transform application.

use nalgebra::Matrix3;

use crate::dlt::project;
use crate::error::CalibrationError;
use crate::point::Point;
use crate::scaling::AxisScaling;

/// Map a source-image pixel point into plot-value space.
///
/// Implement this trait to feed calibrated output from something other than
/// a [`ReferenceCalibrator`](crate::ReferenceCalibrator). Return
/// [`CalibrationError::NoValidTransform`] when no mapping is available.
///
/// # Example
///
/// ```
/// use plotpick::{CalibrationError, Point, PointTransformer};
///
/// struct Halve;
///
/// impl PointTransformer for Halve {
///     fn scale_point(&self, p: Point) -> Result<Point, CalibrationError> {
///         Ok(Point::new(p.x * 0.5, p.y * 0.5))
///     }
/// }
/// ```
pub trait PointTransformer {
    fn scale_point(&self, pixel: Point) -> Result<Point, CalibrationError>;
}

/// Projective pixel-to-plot mapping plus per-axis logarithmic flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix3<f64>,
    scaling: AxisScaling,
}

impl Transform {
    pub fn new(matrix: Matrix3<f64>, scaling: AxisScaling) -> Self {
        Self { matrix, scaling }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Row-major copy of the matrix.
    pub fn matrix_rows(&self) -> [[f64; 3]; 3] {
        let m = &self.matrix;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    pub fn scaling(&self) -> AxisScaling {
        self.scaling
    }

    pub fn x_is_logarithmic(&self) -> bool {
        self.scaling.x_is_logarithmic()
    }

    pub fn y_is_logarithmic(&self) -> bool {
        self.scaling.y_is_logarithmic()
    }

    /// Pixel → plot value: perspective division, then `10^v` on log axes.
    ///
    /// Pixels on the line at infinity map to NaN.
    pub fn apply(&self, pixel: Point) -> Point {
        self.scaling.inverse(project(&self.matrix, pixel))
    }

    /// Plot value → pixel.
    ///
    /// Returns `None` for values outside a log axis domain (≤ 0) or when the
    /// matrix is not invertible.
    pub fn unscale_point(&self, value: Point) -> Option<Point> {
        if !self.scaling.admits(&[value]) {
            return None;
        }
        let inv = self.matrix.try_inverse()?;
        let p = project(&inv, self.scaling.forward(value));
        p.is_finite().then_some(p)
    }
}

impl PointTransformer for Transform {
    fn scale_point(&self, pixel: Point) -> Result<Point, CalibrationError> {
        Ok(self.apply(pixel))
    }
}

/// Affine helper converting one widget-reported ordinate into source-image
/// pixels.
pub fn scale_ordinate(value: f64, scale: f64, offset: f64) -> f64 {
    value * scale + offset
}

/// Per-axis display scale and offset between a widget and the source image.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayMapping {
    pub scale: [f64; 2],
    pub offset: [f64; 2],
}

impl Default for DisplayMapping {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DisplayMapping {
    pub const IDENTITY: DisplayMapping = DisplayMapping {
        scale: [1.0, 1.0],
        offset: [0.0, 0.0],
    };

    pub fn new(scale: [f64; 2], offset: [f64; 2]) -> Self {
        Self { scale, offset }
    }

    /// Raw widget coordinate → source-image pixel.
    pub fn to_image(&self, raw: Point) -> Point {
        Point::new(
            scale_ordinate(raw.x, self.scale[0], self.offset[0]),
            scale_ordinate(raw.y, self.scale[1], self.offset[1]),
        )
    }
}
