//! Pixel-to-value homography estimation via DLT on per-axis normalized points.
//!
//! Provides:
//! - Direct Linear Transform (DLT) from ≥4 point correspondences, solved as
//!   the null space of the coefficient matrix through SVD.
//! - Rank and conditioning checks that reject degenerate reference sets.
//! - Forward projection and squared reconstruction error.

use nalgebra::{DMatrix, Matrix3, Vector3};

use crate::config::MIN_REFERENCES;
use crate::error::CalibrationError;
use crate::point::Point;

/// Unknowns in the flattened 3×3 matrix.
const DLT_UNKNOWNS: usize = 9;

const SVD_MAX_ITERS: usize = 1000;

// ── Projection ───────────────────────────────────────────────────────────

/// Map `p` through `h` and divide out the homogeneous weight.
///
/// Points mapped to infinity come back as NaN.
pub fn project(h: &Matrix3<f64>, p: Point) -> Point {
    let q = h * Vector3::new(p.x, p.y, 1.0);
    if q[2].abs() < 1e-15 {
        return Point::new(f64::NAN, f64::NAN);
    }
    Point::new(q[0] / q[2], q[1] / q[2])
}

// ── Conditioning ─────────────────────────────────────────────────────────

/// Centre and scale one coordinate axis to unit RMS spread.
///
/// An axis without spread (relative to its magnitude) keeps unit scale so the
/// rank checks still see the collapse.
fn axis_normalization(coords: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = coords.clone().count() as f64;
    let centre = coords.clone().sum::<f64>() / n;
    let rms = (coords.map(|c| (c - centre).powi(2)).sum::<f64>() / n).sqrt();
    let scale = if rms > 1e-12 * centre.abs() && rms.is_finite() {
        1.0 / rms
    } else {
        1.0
    };
    (centre, scale)
}

/// Condition a point set axis by axis before the DLT.
///
/// Each axis gets its own scale, so plot values whose x and y ranges differ
/// by many orders of magnitude stay well conditioned. Returns the affine map
/// `T` together with `T · p` for every point.
fn normalize_points(pts: &[Point]) -> (Matrix3<f64>, Vec<Point>) {
    let (cx, sx) = axis_normalization(pts.iter().map(|p| p.x));
    let (cy, sy) = axis_normalization(pts.iter().map(|p| p.y));

    let t = Matrix3::new(sx, 0.0, -sx * cx, 0.0, sy, -sy * cy, 0.0, 0.0, 1.0);
    let normalized = pts
        .iter()
        .map(|p| Point::new(sx * (p.x - cx), sy * (p.y - cy)))
        .collect();
    (t, normalized)
}

// ── DLT ──────────────────────────────────────────────────────────────────

/// Build the 2N×9 coefficient matrix for `dst ≈ H · src`.
///
/// When 2N < 9 the matrix is padded with zero rows so that the SVD exposes
/// all nine right singular vectors.
fn build_system(src: &[Point], dst: &[Point]) -> DMatrix<f64> {
    let n = src.len();
    let rows = (2 * n).max(DLT_UNKNOWNS);
    let mut a = DMatrix::zeros(rows, DLT_UNKNOWNS);
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        let (sx, sy) = (s.x, s.y);
        let (dx, dy) = (d.x, d.y);

        // Row 2i:   [  0  0  0 | -sx -sy -1 | dy*sx  dy*sy  dy ]
        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        // Row 2i+1: [ sx  sy  1 |  0  0  0 | -dx*sx -dx*sy -dx ]
        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }
    a
}

/// Estimate the homography H with `dst ≈ project(H, src)` from ≥4
/// correspondences.
///
/// `src`: pixel coordinates. `dst`: values in fitting space.
///
/// The solution is the right singular vector of the smallest singular value.
/// The fit is rejected as [`CalibrationError::DegenerateReferences`] when the
/// null space is not one-dimensional (second-smallest singular value below
/// `tolerance` relative to the largest) or when the normalized matrix is
/// singular by the same relative measure.
pub fn estimate_homography(
    src: &[Point],
    dst: &[Point],
    tolerance: f64,
) -> Result<Matrix3<f64>, CalibrationError> {
    let n = src.len().min(dst.len());
    if n < MIN_REFERENCES {
        return Err(CalibrationError::InsufficientReferences {
            needed: MIN_REFERENCES,
            got: n,
        });
    }
    if src.len() != dst.len() || !src.iter().chain(dst).all(Point::is_finite) {
        return Err(CalibrationError::DegenerateReferences);
    }

    let (t_src, src_n) = normalize_points(src);
    let (t_dst, dst_n) = normalize_points(dst);

    let a = build_system(&src_n, &dst_n);
    let svd = a
        .try_svd(false, true, f64::EPSILON, SVD_MAX_ITERS)
        .ok_or(CalibrationError::DegenerateReferences)?;
    let v_t = svd.v_t.ok_or(CalibrationError::DegenerateReferences)?;
    let sv = &svd.singular_values;

    // First strict minimum keeps the choice deterministic on ties.
    let mut min_idx = 0;
    for i in 1..sv.len() {
        if sv[i] < sv[min_idx] {
            min_idx = i;
        }
    }

    let mut sorted: Vec<f64> = sv.iter().copied().collect();
    sorted.sort_by(f64::total_cmp);
    let largest = sorted[sorted.len() - 1];
    if largest <= 0.0 || sorted[1] <= tolerance * largest {
        tracing::debug!(
            "DLT null space is not one-dimensional (sigma_2/sigma_max = {:.3e})",
            if largest > 0.0 { sorted[1] / largest } else { 0.0 }
        );
        return Err(CalibrationError::DegenerateReferences);
    }

    let h = v_t.row(min_idx);
    let h_norm = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);
    let h_sv = h_norm
        .try_svd(false, false, f64::EPSILON, SVD_MAX_ITERS)
        .ok_or(CalibrationError::DegenerateReferences)?
        .singular_values;
    let h_max = h_sv.max();
    if h_max <= 0.0 || h_sv.min() <= tolerance * h_max {
        tracing::debug!(
            "normalized homography is singular (sigma_min/sigma_max = {:.3e})",
            if h_max > 0.0 { h_sv.min() / h_max } else { 0.0 }
        );
        return Err(CalibrationError::DegenerateReferences);
    }

    // Denormalize: H = T_dst^-1 * H_norm * T_src
    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or(CalibrationError::DegenerateReferences)?;
    let h = t_dst_inv * h_norm * t_src;

    // Normalize so h[2][2] = 1 (if possible)
    let scale = h[(2, 2)];
    if scale.abs() < 1e-15 {
        Ok(h)
    } else {
        Ok(h / scale)
    }
}

/// Sum of squared distances between `project(H, src)` and `dst`.
///
/// `to_value` maps the projected point back into the space of `dst`.
pub fn sum_squared_error(
    h: &Matrix3<f64>,
    src: &[Point],
    dst: &[Point],
    to_value: impl Fn(Point) -> Point,
) -> f64 {
    let total: f64 = src
        .iter()
        .zip(dst)
        .map(|(s, d)| to_value(project(h, *s)).distance_sq(d))
        .sum();
    if total.is_finite() {
        total
    } else {
        f64::INFINITY
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
