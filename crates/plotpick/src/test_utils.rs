//! Shared helpers for synthetic calibration data in unit tests.

use nalgebra::Matrix3;

use crate::point::{Point, ReferencePair};

/// Scale + translate + mild perspective.
pub(crate) fn make_test_homography() -> Matrix3<f64> {
    Matrix3::new(
        3.5, 0.1, 640.0,
        -0.05, 3.3, 480.0,
        0.0001, -0.00005, 1.0,
    )
}

/// `nx × ny` lattice of pixels with spacing `step`, starting at the origin.
pub(crate) fn grid_pixels(nx: usize, ny: usize, step: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            out.push(Point::new(i as f64 * step, j as f64 * step));
        }
    }
    out
}

/// Pair each pixel with the value produced by `f`.
pub(crate) fn pairs_from(pixels: &[Point], f: impl Fn(Point) -> Point) -> Vec<ReferencePair> {
    pixels
        .iter()
        .map(|&p| ReferencePair::new(p, f(p)))
        .collect()
}
