//! plotpick — calibrate scanned plot images and digitize their curves.
//!
//! The user clicks known axis locations on an image and types their plot
//! values; those correspondences define a pixel → plot mapping that is then
//! applied to picked curve points. The stages are:
//!
//! 1. **References** – (pixel, value) pairs collected by a
//!    [`ReferenceCalibrator`].
//! 2. **Fit** – a projective DLT fit over ≥4 pairs, solved through SVD, with
//!    per-axis normalization and rank checks against degenerate input.
//! 3. **Scaling selection** – lin-lin, semi-log and log-log hypotheses are
//!    fitted and the lowest reconstruction error wins, biased toward linear.
//! 4. **Curves** – picked pixels are stored raw in a [`CurveStore`] and mapped
//!    through the current [`Transform`] when read.
//!
//! # Public API
//! - [`PickerSession`] — click-driven façade for a GUI host
//! - [`ReferenceCalibrator`], [`CurveStore`], [`Transform`] for direct use
//! - [`ValuePrompt`] / [`ClipboardSink`] ports implemented by the host
//!
//! # Example
//!
//! ```
//! use plotpick::{Point, PointTransformer, ReferenceCalibrator};
//!
//! let mut cal = ReferenceCalibrator::default();
//! cal.add_reference(Point::new(0.0, 0.0), Point::new(0.0, 0.0));
//! cal.add_reference(Point::new(100.0, 0.0), Point::new(10.0, 0.0));
//! cal.add_reference(Point::new(0.0, 100.0), Point::new(0.0, 10.0));
//! cal.add_reference(Point::new(100.0, 100.0), Point::new(10.0, 10.0));
//!
//! let v = cal.scale_point(Point::new(50.0, 50.0)).unwrap();
//! assert!((v.x - 5.0).abs() < 1e-9 && (v.y - 5.0).abs() < 1e-9);
//! ```

mod calibrator;
mod config;
mod curves;
mod dlt;
mod error;
mod point;
mod ports;
mod scaling;
mod session;
mod transform;

#[cfg(test)]
pub(crate) mod test_utils;

pub use calibrator::{compute_transformation, select_hypothesis, HypothesisFit, ReferenceCalibrator};
pub use config::{CalibrationConfig, MIN_REFERENCES};
pub use curves::CurveStore;
pub use dlt::{estimate_homography, project};
pub use error::CalibrationError;
pub use point::{Point, ReferencePair};
pub use ports::{ClipMode, ClipboardSink, NoClipboard, ValuePrompt};
pub use scaling::AxisScaling;
pub use session::{ClickOutcome, PickMode, PickerSession};
pub use transform::{scale_ordinate, DisplayMapping, PointTransformer, Transform};

pub use nalgebra::Matrix3;
