//! Uncalibrated curve storage.
//!
//! Points are kept in source-image pixels and only mapped to plot values when
//! read, so every point goes through whatever transform is current at query
//! time.

use crate::error::CalibrationError;
use crate::point::Point;
use crate::transform::PointTransformer;

/// Ragged per-index lists of picked pixel points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveStore {
    curves: Vec<Vec<Point>>,
}

impl CurveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to curve `curve_index`, creating empty curves up to it as needed.
    pub fn append_point(&mut self, curve_index: usize, pixel: Point) {
        if curve_index >= self.curves.len() {
            self.curves.resize_with(curve_index + 1, Vec::new);
        }
        self.curves[curve_index].push(pixel);
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Total number of points across all curves.
    pub fn point_count(&self) -> usize {
        self.curves.iter().map(Vec::len).sum()
    }

    pub fn curve(&self, index: usize) -> Option<&[Point]> {
        self.curves.get(index).map(Vec::as_slice)
    }

    pub fn raw_curves(&self) -> &[Vec<Point>] {
        &self.curves
    }

    /// Most recently appended point of curve `index`.
    pub fn last_point(&self, index: usize) -> Option<Point> {
        self.curves.get(index).and_then(|c| c.last().copied())
    }

    /// Map every stored point through `transformer`.
    ///
    /// Fails as a whole on the first point the transformer rejects; an empty
    /// store yields an empty result.
    pub fn calibrated_curves<T: PointTransformer + ?Sized>(
        &self,
        transformer: &T,
    ) -> Result<Vec<Vec<Point>>, CalibrationError> {
        self.curves
            .iter()
            .map(|curve| {
                curve
                    .iter()
                    .map(|&p| transformer.scale_point(p))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    /// Empty curve `index` while keeping its slot.
    pub fn clear_curve(&mut self, index: usize) -> Result<(), CalibrationError> {
        let len = self.curves.len();
        let curve = self
            .curves
            .get_mut(index)
            .ok_or(CalibrationError::IndexOutOfRange { index, len })?;
        curve.clear();
        Ok(())
    }

    /// Remove curve `index`; later curves shift down by one.
    pub fn remove_curve(&mut self, index: usize) -> Result<Vec<Point>, CalibrationError> {
        if index >= self.curves.len() {
            return Err(CalibrationError::IndexOutOfRange {
                index,
                len: self.curves.len(),
            });
        }
        Ok(self.curves.remove(index))
    }

    pub fn reset(&mut self) {
        self.curves.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::AxisScaling;
    use crate::transform::Transform;
    use nalgebra::Matrix3;

    struct Unavailable;

    impl PointTransformer for Unavailable {
        fn scale_point(&self, _pixel: Point) -> Result<Point, CalibrationError> {
            Err(CalibrationError::NoValidTransform)
        }
    }

    fn doubling() -> Transform {
        Transform::new(
            Matrix3::new(2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0),
            AxisScaling::Linear,
        )
    }

    #[test]
    fn append_grows_ragged_curves() {
        let mut store = CurveStore::new();
        store.append_point(2, Point::new(1.0, 1.0));
        store.append_point(0, Point::new(2.0, 2.0));
        store.append_point(2, Point::new(3.0, 3.0));

        assert_eq!(store.curve_count(), 3);
        assert_eq!(store.point_count(), 3);
        assert_eq!(store.curve(1), Some(&[][..]));
        assert_eq!(store.last_point(2), Some(Point::new(3.0, 3.0)));
        assert_eq!(store.last_point(1), None);
    }

    #[test]
    fn empty_store_calibrates_to_empty() {
        let store = CurveStore::new();
        assert_eq!(store.calibrated_curves(&Unavailable), Ok(Vec::new()));
    }

    #[test]
    fn calibration_preserves_shape() {
        let mut store = CurveStore::new();
        store.append_point(0, Point::new(1.0, 2.0));
        store.append_point(1, Point::new(3.0, 4.0));
        store.append_point(1, Point::new(5.0, 6.0));

        let out = store.calibrated_curves(&doubling()).unwrap();
        assert_eq!(
            out,
            vec![
                vec![Point::new(2.0, 4.0)],
                vec![Point::new(6.0, 8.0), Point::new(10.0, 12.0)],
            ]
        );
    }

    #[test]
    fn missing_transform_fails_whole_call() {
        let mut store = CurveStore::new();
        store.append_point(0, Point::new(1.0, 2.0));
        assert_eq!(
            store.calibrated_curves(&Unavailable),
            Err(CalibrationError::NoValidTransform)
        );
    }

    #[test]
    fn clear_and_remove_check_bounds() {
        let mut store = CurveStore::new();
        store.append_point(0, Point::new(1.0, 1.0));
        store.append_point(1, Point::new(2.0, 2.0));

        store.clear_curve(0).unwrap();
        assert_eq!(store.curve_count(), 2);
        assert_eq!(store.point_count(), 1);

        let removed = store.remove_curve(0).unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.curve(0), Some(&[Point::new(2.0, 2.0)][..]));

        assert_eq!(
            store.remove_curve(5),
            Err(CalibrationError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_eq!(
            store.clear_curve(1),
            Err(CalibrationError::IndexOutOfRange { index: 1, len: 1 })
        );

        store.reset();
        assert_eq!(store.curve_count(), 0);
    }
}
