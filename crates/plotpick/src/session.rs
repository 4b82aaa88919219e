//! Click-driven picking session.
//!
//! [`PickerSession`] is the surface a GUI host talks to: it owns the
//! [`ReferenceCalibrator`], the [`CurveStore`] and the current picking mode,
//! and routes each image click to the right place.

use crate::calibrator::ReferenceCalibrator;
use crate::config::CalibrationConfig;
use crate::curves::CurveStore;
use crate::error::CalibrationError;
use crate::point::{Point, ReferencePair};
use crate::ports::{ClipMode, ClipboardSink, ValuePrompt};
use crate::transform::{DisplayMapping, PointTransformer};

/// What an image click is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickMode {
    /// Clicks only feed the clipboard.
    #[default]
    Inactive,
    /// Clicks become reference pairs after prompting for the plot value.
    Reference,
    /// Clicks are appended to the selected curve.
    Curve,
}

/// Result of [`PickerSession::handle_click`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Nothing recorded (inactive mode).
    Ignored,
    /// The value prompt was dismissed; no state changed.
    Cancelled,
    /// A reference pair was added and the calibration refitted.
    ReferenceAdded(ReferencePair),
    /// A point was appended to `curve` at position `index`.
    CurvePointAdded { curve: usize, index: usize },
}

/// Calibration, curve data and mode state for one loaded image.
#[derive(Debug, Clone, Default)]
pub struct PickerSession {
    calibrator: ReferenceCalibrator,
    curves: CurveStore,
    mode: PickMode,
    curve_index: usize,
    clip_mode: ClipMode,
}

impl PickerSession {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            calibrator: ReferenceCalibrator::new(config),
            ..Self::default()
        }
    }

    pub fn calibrator(&self) -> &ReferenceCalibrator {
        &self.calibrator
    }

    pub fn curves(&self) -> &CurveStore {
        &self.curves
    }

    pub fn mode(&self) -> PickMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PickMode) {
        self.mode = mode;
    }

    /// Curve that receives clicks in [`PickMode::Curve`].
    pub fn curve_index(&self) -> usize {
        self.curve_index
    }

    pub fn set_curve_index(&mut self, index: usize) {
        self.curve_index = index;
    }

    pub fn clip_mode(&self) -> ClipMode {
        self.clip_mode
    }

    pub fn set_clip_mode(&mut self, mode: ClipMode) {
        self.clip_mode = mode;
    }

    /// Route one raw widget click.
    ///
    /// The click is first mapped to source-image pixels through `display`.
    /// If clipboard copying is enabled the pixel text goes to `clipboard`
    /// regardless of mode.
    pub fn handle_click<P, C>(
        &mut self,
        raw: Point,
        display: &DisplayMapping,
        prompt: &mut P,
        clipboard: &mut C,
    ) -> ClickOutcome
    where
        P: ValuePrompt + ?Sized,
        C: ClipboardSink + ?Sized,
    {
        let pixel = display.to_image(raw);
        if let Some(text) = self.clip_mode.format(pixel) {
            clipboard.copy_text(&text);
        }

        match self.mode {
            PickMode::Inactive => ClickOutcome::Ignored,
            PickMode::Reference => match prompt.request_value(pixel) {
                Some(value) => {
                    self.add_reference(pixel, value);
                    ClickOutcome::ReferenceAdded(ReferencePair::new(pixel, value))
                }
                None => {
                    tracing::debug!("reference prompt cancelled at ({}, {})", pixel.x, pixel.y);
                    ClickOutcome::Cancelled
                }
            },
            PickMode::Curve => {
                let curve = self.curve_index;
                self.append_curve_point(curve, pixel);
                let index = self.curves.curve(curve).map_or(0, |c| c.len() - 1);
                ClickOutcome::CurvePointAdded { curve, index }
            }
        }
    }

    pub fn add_reference(&mut self, image: Point, value: Point) {
        self.calibrator.add_reference(image, value);
    }

    pub fn remove_reference(&mut self, index: usize) -> Result<ReferencePair, CalibrationError> {
        self.calibrator.remove_reference(index)
    }

    pub fn reset_references(&mut self) {
        self.calibrator.reset();
    }

    /// Plot values of all references, for tabular display.
    pub fn references(&self) -> Vec<Point> {
        self.calibrator.reference_values()
    }

    pub fn append_curve_point(&mut self, curve_index: usize, pixel: Point) {
        self.curves.append_point(curve_index, pixel);
    }

    /// Every curve mapped through the current transform.
    pub fn calibrated_curves(&self) -> Result<Vec<Vec<Point>>, CalibrationError> {
        self.curves.calibrated_curves(&self.calibrator)
    }

    /// Drop the points of curve `index`, keeping its slot.
    pub fn reset_curve(&mut self, index: usize) -> Result<(), CalibrationError> {
        self.curves.clear_curve(index)
    }

    pub fn remove_curve(&mut self, index: usize) -> Result<Vec<Point>, CalibrationError> {
        self.curves.remove_curve(index)
    }

    /// Clear references, curves and the selected curve index.
    pub fn reset_all(&mut self) {
        self.calibrator.reset();
        self.curves.reset();
        self.curve_index = 0;
    }

    pub fn error_message(&self) -> Option<String> {
        self.calibrator.error_message()
    }

    /// Live readout: raw widget coordinate → image pixel → plot value.
    pub fn scale_single_point(
        &self,
        raw: Point,
        display: &DisplayMapping,
    ) -> Result<Point, CalibrationError> {
        self.calibrator.scale_point(display.to_image(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NoClipboard;
    use approx::assert_relative_eq;

    fn no_prompt(_: Point) -> Option<Point> {
        None
    }

    /// Session calibrated so that value = pixel / 10.
    fn calibrated_session() -> PickerSession {
        let mut s = PickerSession::default();
        for (px, py) in [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0), (50.0, 20.0)] {
            s.add_reference(Point::new(px, py), Point::new(px / 10.0, py / 10.0));
        }
        s
    }

    #[test]
    fn reference_clicks_prompt_for_values() {
        let mut s = PickerSession::default();
        s.set_mode(PickMode::Reference);
        let display = DisplayMapping::new([2.0, 2.0], [0.0, 0.0]);

        let mut prompt = |p: Point| Some(Point::new(p.x / 10.0, p.y / 10.0));
        for (x, y) in [(0.0, 0.0), (50.0, 0.0), (0.0, 50.0), (50.0, 50.0)] {
            let outcome = s.handle_click(Point::new(x, y), &display, &mut prompt, &mut NoClipboard);
            assert!(matches!(outcome, ClickOutcome::ReferenceAdded(_)));
        }

        assert!(s.error_message().is_none());
        assert_eq!(s.references().len(), 4);
        assert_eq!(s.references()[3], Point::new(10.0, 10.0));
        let v = s
            .scale_single_point(Point::new(25.0, 25.0), &display)
            .unwrap();
        assert_relative_eq!(v.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(v.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn cancelled_prompt_changes_nothing() {
        let mut s = PickerSession::default();
        s.set_mode(PickMode::Reference);
        let outcome = s.handle_click(
            Point::new(1.0, 1.0),
            &DisplayMapping::IDENTITY,
            &mut no_prompt,
            &mut NoClipboard,
        );
        assert_eq!(outcome, ClickOutcome::Cancelled);
        assert!(s.references().is_empty());
    }

    #[test]
    fn curve_clicks_go_to_selected_curve() {
        let mut s = calibrated_session();
        s.set_mode(PickMode::Curve);
        s.set_curve_index(1);

        let mut copied: Vec<String> = Vec::new();
        let mut clip = |t: &str| copied.push(t.to_string());
        s.set_clip_mode(ClipMode::Both);

        let display = DisplayMapping::new([1.0, 1.0], [10.0, 0.0]);
        let a = s.handle_click(Point::new(20.0, 30.0), &display, &mut no_prompt, &mut clip);
        let b = s.handle_click(Point::new(40.0, 50.0), &display, &mut no_prompt, &mut clip);
        assert_eq!(a, ClickOutcome::CurvePointAdded { curve: 1, index: 0 });
        assert_eq!(b, ClickOutcome::CurvePointAdded { curve: 1, index: 1 });
        assert_eq!(copied, vec!["30, 30", "50, 50"]);

        let curves = s.calibrated_curves().unwrap();
        assert_eq!(curves.len(), 2);
        assert!(curves[0].is_empty());
        assert_relative_eq!(curves[1][0].x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(curves[1][1].y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn inactive_mode_only_copies() {
        let mut s = PickerSession::default();
        s.set_clip_mode(ClipMode::X);
        let mut copied = String::new();
        let mut clip = |t: &str| copied.push_str(t);
        let outcome = s.handle_click(
            Point::new(7.0, 9.0),
            &DisplayMapping::IDENTITY,
            &mut no_prompt,
            &mut clip,
        );
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(copied, "7");
        assert_eq!(s.curves().curve_count(), 0);
    }

    #[test]
    fn curves_use_transform_current_at_query_time() {
        let mut s = PickerSession::default();
        s.append_curve_point(0, Point::new(100.0, 100.0));
        assert_eq!(s.calibrated_curves(), Err(CalibrationError::NoValidTransform));

        for (px, py) in [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)] {
            s.add_reference(Point::new(px, py), Point::new(px, py));
        }
        s.append_curve_point(0, Point::new(50.0, 50.0));
        let before = s.calibrated_curves().unwrap();
        assert_relative_eq!(before[0][0].x, 100.0, epsilon = 1e-9);

        // Swap to a half-scale calibration: both points follow it.
        s.reset_references();
        for (px, py) in [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)] {
            s.add_reference(Point::new(px, py), Point::new(px / 2.0, py / 2.0));
        }
        let after = s.calibrated_curves().unwrap();
        assert_relative_eq!(after[0][0].x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(after[0][1].y, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn round_trip_recovers_pixel() {
        let mut s = calibrated_session();
        let pixel = Point::new(37.0, 81.0);
        s.append_curve_point(0, pixel);
        let value = s.calibrated_curves().unwrap()[0][0];
        let back = s
            .calibrator()
            .transform()
            .unwrap()
            .unscale_point(value)
            .unwrap();
        assert_relative_eq!(back.x, pixel.x, epsilon = 1e-6);
        assert_relative_eq!(back.y, pixel.y, epsilon = 1e-6);
    }

    #[test]
    fn removing_references_reports_error_state() {
        let mut s = calibrated_session();
        assert!(s.scale_single_point(Point::new(1.0, 1.0), &DisplayMapping::IDENTITY).is_ok());
        s.remove_reference(0).unwrap();
        s.remove_reference(0).unwrap();
        assert_eq!(
            s.error_message().as_deref(),
            Some("not enough reference points: need 4, got 3")
        );
        assert_eq!(
            s.scale_single_point(Point::new(1.0, 1.0), &DisplayMapping::IDENTITY),
            Err(CalibrationError::NoValidTransform)
        );
        assert!(matches!(
            s.remove_reference(9),
            Err(CalibrationError::IndexOutOfRange { index: 9, len: 3 })
        ));
    }

    #[test]
    fn reset_all_wipes_session() {
        let mut s = calibrated_session();
        s.set_curve_index(3);
        s.append_curve_point(3, Point::new(1.0, 2.0));
        assert!(s.reset_curve(3).is_ok());
        assert!(s.reset_curve(4).is_err());
        assert_eq!(s.remove_curve(3).map(|c| c.len()), Ok(0));

        s.reset_all();
        assert!(s.references().is_empty());
        assert_eq!(s.curves().curve_count(), 0);
        assert_eq!(s.curve_index(), 0);
        assert_eq!(s.calibrated_curves(), Ok(Vec::new()));
    }
}
