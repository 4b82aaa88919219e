//! Axis-scaling hypotheses.

use crate::point::Point;

/// How each plot axis relates to the fitted projective space.
///
/// A logarithmic axis is fitted in `log10(value)` space and mapped back with
/// `10^v` after projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScaling {
    /// Both axes linear.
    Linear,
    /// Logarithmic x, linear y.
    SemiLogX,
    /// Linear x, logarithmic y.
    SemiLogY,
    /// Both axes logarithmic.
    LogLog,
}

impl AxisScaling {
    /// Candidates in tie-break order: on equal error the earlier entry wins.
    pub const PREFERENCE_ORDER: [AxisScaling; 4] = [
        AxisScaling::Linear,
        AxisScaling::SemiLogY,
        AxisScaling::SemiLogX,
        AxisScaling::LogLog,
    ];

    pub fn from_flags(x_log: bool, y_log: bool) -> Self {
        match (x_log, y_log) {
            (false, false) => Self::Linear,
            (true, false) => Self::SemiLogX,
            (false, true) => Self::SemiLogY,
            (true, true) => Self::LogLog,
        }
    }

    pub fn x_is_logarithmic(self) -> bool {
        matches!(self, Self::SemiLogX | Self::LogLog)
    }

    pub fn y_is_logarithmic(self) -> bool {
        matches!(self, Self::SemiLogY | Self::LogLog)
    }

    pub fn is_linear(self) -> bool {
        self == Self::Linear
    }

    /// Whether every value can be represented under this scaling
    /// (log axes need strictly positive values).
    pub fn admits(self, values: &[Point]) -> bool {
        let x_ok = !self.x_is_logarithmic() || values.iter().all(|v| v.x > 0.0);
        let y_ok = !self.y_is_logarithmic() || values.iter().all(|v| v.y > 0.0);
        x_ok && y_ok
    }

    /// Plot value -> fitting space.
    pub fn forward(self, value: Point) -> Point {
        Point {
            x: if self.x_is_logarithmic() {
                value.x.log10()
            } else {
                value.x
            },
            y: if self.y_is_logarithmic() {
                value.y.log10()
            } else {
                value.y
            },
        }
    }

    /// Fitting space -> plot value.
    pub fn inverse(self, fitted: Point) -> Point {
        Point {
            x: if self.x_is_logarithmic() {
                10f64.powf(fitted.x)
            } else {
                fitted.x
            },
            y: if self.y_is_logarithmic() {
                10f64.powf(fitted.y)
            } else {
                fitted.y
            },
        }
    }
}

impl std::fmt::Display for AxisScaling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Linear => "lin-lin",
            Self::SemiLogX => "log-lin",
            Self::SemiLogY => "lin-log",
            Self::LogLog => "log-log",
        };
        f.write_str(name)
    }
}
