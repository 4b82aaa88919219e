//! Reference-pair bookkeeping and best-transform selection.
//!
//! Every change to the reference set refits the pixel → value homography
//! from scratch under each admissible [`AxisScaling`] hypothesis and keeps the
//! one with the lowest reconstruction error, biased toward lin-lin by
//! [`CalibrationConfig::lin_log_error_ratio`].

use nalgebra::Matrix3;

use crate::config::{CalibrationConfig, MIN_REFERENCES};
use crate::dlt::{estimate_homography, sum_squared_error};
use crate::error::CalibrationError;
use crate::point::{Point, ReferencePair};
use crate::scaling::AxisScaling;
use crate::transform::{PointTransformer, Transform};

/// Reconstruction error of one fitted scaling hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HypothesisFit {
    pub scaling: AxisScaling,
    /// Sum of squared distances in plot-value space over all references.
    pub error: f64,
}

/// Fit the homography for one scaling hypothesis and measure its error.
///
/// Log axes are fitted on `log10(value)`; the error is measured after mapping
/// projections back with `10^v`.
pub fn compute_transformation(
    references: &[ReferencePair],
    scaling: AxisScaling,
    tolerance: f64,
) -> Result<(Matrix3<f64>, f64), CalibrationError> {
    let pixels: Vec<Point> = references.iter().map(|r| r.image).collect();
    let values: Vec<Point> = references.iter().map(|r| r.value).collect();
    let fitted: Vec<Point> = values.iter().map(|v| scaling.forward(*v)).collect();

    let h = estimate_homography(&pixels, &fitted, tolerance)?;
    let error = sum_squared_error(&h, &pixels, &values, |p| scaling.inverse(p));
    Ok((h, error))
}

/// Index of the winning hypothesis in `fits`.
///
/// `fits` must be in [`AxisScaling::PREFERENCE_ORDER`]; a later entry wins
/// only with a strictly smaller effective error. Non-linear errors are
/// weighted by `lin_log_error_ratio`.
pub fn select_hypothesis(fits: &[HypothesisFit], lin_log_error_ratio: f64) -> Option<usize> {
    let effective = |f: &HypothesisFit| {
        if f.scaling.is_linear() {
            f.error
        } else {
            lin_log_error_ratio * f.error
        }
    };

    let mut best: Option<(usize, f64)> = None;
    for (i, fit) in fits.iter().enumerate() {
        let e = effective(fit);
        let better = match best {
            Some((_, best_e)) => e < best_e,
            None => true,
        };
        if better {
            best = Some((i, e));
        }
    }
    best.map(|(i, _)| i)
}

/// Owns the reference pairs and the transform derived from them.
#[derive(Debug, Clone)]
pub struct ReferenceCalibrator {
    config: CalibrationConfig,
    references: Vec<ReferencePair>,
    fit: Result<Transform, CalibrationError>,
    last_valid: Option<Transform>,
    hypotheses: Vec<HypothesisFit>,
}

impl Default for ReferenceCalibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl ReferenceCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            references: Vec::new(),
            fit: Err(CalibrationError::InsufficientReferences {
                needed: MIN_REFERENCES,
                got: 0,
            }),
            last_valid: None,
            hypotheses: Vec::new(),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Replace the configuration and refit.
    pub fn set_config(&mut self, config: CalibrationConfig) {
        self.config = config;
        self.refit();
    }

    pub fn add_reference(&mut self, image: Point, value: Point) {
        self.references.push(ReferencePair::new(image, value));
        self.refit();
    }

    /// Remove the pair at `index` and refit.
    pub fn remove_reference(&mut self, index: usize) -> Result<ReferencePair, CalibrationError> {
        if index >= self.references.len() {
            return Err(CalibrationError::IndexOutOfRange {
                index,
                len: self.references.len(),
            });
        }
        let removed = self.references.remove(index);
        self.refit();
        Ok(removed)
    }

    /// Drop every reference and the retained transform.
    pub fn reset(&mut self) {
        self.references.clear();
        self.last_valid = None;
        self.refit();
    }

    pub fn references(&self) -> &[ReferencePair] {
        &self.references
    }

    /// Plot-value side of every reference, in insertion order.
    pub fn reference_values(&self) -> Vec<Point> {
        self.references.iter().map(|r| r.value).collect()
    }

    /// Current transform, or [`CalibrationError::NoValidTransform`] while the
    /// reference set does not yield a valid fit.
    pub fn transform(&self) -> Result<&Transform, CalibrationError> {
        self.fit
            .as_ref()
            .map_err(|_| CalibrationError::NoValidTransform)
    }

    /// Most recent successful transform, kept across later failures.
    pub fn last_valid_transform(&self) -> Option<&Transform> {
        self.last_valid.as_ref()
    }

    /// Why the current reference set has no transform.
    pub fn error(&self) -> Option<&CalibrationError> {
        self.fit.as_ref().err()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Per-hypothesis errors from the latest fit, in preference order.
    pub fn hypotheses(&self) -> &[HypothesisFit] {
        &self.hypotheses
    }

    /// Refit from the full reference set.
    ///
    /// The stored result is replaced as a whole; on failure the previous
    /// successful transform stays available through
    /// [`last_valid_transform`](Self::last_valid_transform).
    pub fn recompute(&mut self) -> Result<&Transform, CalibrationError> {
        self.refit();
        self.fit.as_ref().map_err(Clone::clone)
    }

    fn refit(&mut self) {
        let (fit, hypotheses) = fit_references(&self.references, &self.config);
        if let Ok(t) = &fit {
            self.last_valid = Some(t.clone());
        }
        self.fit = fit;
        self.hypotheses = hypotheses;
    }
}

impl PointTransformer for ReferenceCalibrator {
    fn scale_point(&self, pixel: Point) -> Result<Point, CalibrationError> {
        Ok(self.transform()?.apply(pixel))
    }
}

fn fit_references(
    references: &[ReferencePair],
    config: &CalibrationConfig,
) -> (Result<Transform, CalibrationError>, Vec<HypothesisFit>) {
    let n = references.len();
    if n < MIN_REFERENCES {
        return (
            Err(CalibrationError::InsufficientReferences {
                needed: MIN_REFERENCES,
                got: n,
            }),
            Vec::new(),
        );
    }

    // Four pairs determine a homography exactly, so every hypothesis would
    // fit with zero error.
    let candidates: &[AxisScaling] = if n == MIN_REFERENCES || !config.detect_log_axes {
        &[AxisScaling::Linear]
    } else {
        &AxisScaling::PREFERENCE_ORDER
    };

    let values: Vec<Point> = references.iter().map(|r| r.value).collect();
    let mut fits = Vec::with_capacity(candidates.len());
    let mut matrices = Vec::with_capacity(candidates.len());
    for &scaling in candidates {
        if !scaling.admits(&values) {
            tracing::debug!("skipping {} fit: non-positive values on a log axis", scaling);
            continue;
        }
        match compute_transformation(references, scaling, config.degeneracy_tolerance) {
            Ok((h, error)) => {
                tracing::debug!("{} fit: squared error {:.6e}", scaling, error);
                fits.push(HypothesisFit { scaling, error });
                matrices.push(h);
            }
            // A set that does not span the plot in linear space is rejected
            // outright; log axes may not stand in for it.
            Err(e) if scaling.is_linear() => {
                tracing::warn!("calibration failed with {} references: {}", n, e);
                return (Err(e), fits);
            }
            Err(e) => {
                tracing::debug!("{} fit failed: {}", scaling, e);
            }
        }
    }

    let Some(best) = select_hypothesis(&fits, config.lin_log_error_ratio) else {
        tracing::warn!("calibration failed with {} references: no hypothesis fitted", n);
        return (Err(CalibrationError::DegenerateReferences), fits);
    };

    let chosen = fits[best];
    tracing::info!(
        "calibrated {} references as {} (squared error {:.3e})",
        n,
        chosen.scaling,
        chosen.error
    );
    (Ok(Transform::new(matrices[best], chosen.scaling)), fits)
}
