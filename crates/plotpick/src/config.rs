//! Tuning knobs for transform fitting and scaling selection.

use std::path::Path;

/// Minimum number of correspondences for a projective fit.
pub const MIN_REFERENCES: usize = 4;

/// Configuration for [`ReferenceCalibrator`](crate::ReferenceCalibrator).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Bias toward linear axes.
    ///
    /// A logarithmic hypothesis replaces the linear one only when
    /// `lin_log_error_ratio * log_error < linear_error`. `1.0` keeps linear on
    /// ties; larger values demand a proportionally better log fit. This is a
    /// heuristic, not a derived threshold.
    pub lin_log_error_ratio: f64,
    /// Relative singular-value threshold below which the normalized DLT system
    /// is treated as rank-deficient.
    pub degeneracy_tolerance: f64,
    /// Compare semi-log and log-log hypotheses against lin-lin.
    ///
    /// When disabled only the linear fit is computed.
    pub detect_log_axes: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            lin_log_error_ratio: 1.0,
            degeneracy_tolerance: 1e-9,
            detect_log_axes: true,
        }
    }
}

impl CalibrationConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data).map_err(Into::into)
    }

    pub fn from_json_str(data: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(data).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.lin_log_error_ratio.is_finite() || self.lin_log_error_ratio <= 0.0 {
            return Err(format!(
                "lin_log_error_ratio must be finite and > 0, got {}",
                self.lin_log_error_ratio
            ));
        }
        if !self.degeneracy_tolerance.is_finite() || self.degeneracy_tolerance < 0.0 {
            return Err(format!(
                "degeneracy_tolerance must be finite and >= 0, got {}",
                self.degeneracy_tolerance
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = CalibrationConfig::from_json_str(r#"{"lin_log_error_ratio": 2.5}"#)
            .expect("valid config");
        assert_eq!(cfg.lin_log_error_ratio, 2.5);
        assert_eq!(
            cfg.degeneracy_tolerance,
            CalibrationConfig::default().degeneracy_tolerance
        );
        assert!(cfg.detect_log_axes);
    }

    #[test]
    fn rejects_non_positive_ratio() {
        let err = CalibrationConfig::from_json_str(r#"{"lin_log_error_ratio": 0.0}"#)
            .expect_err("expected error");
        assert!(err.contains("lin_log_error_ratio"));
    }

    #[test]
    fn rejects_negative_tolerance() {
        assert!(CalibrationConfig::from_json_str(r#"{"degeneracy_tolerance": -1.0}"#).is_err());
    }
}
