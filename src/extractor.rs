use log::*;
use nalgebra::{DMatrix, DVector, Point2};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{
        patch::compute_descriptor,
        window::{truncate_coordinate, BoundaryPolicy},
    },
    grid::IntensityGrid,
    Error,
};

/// Contains the configuration of the normalized patch extractor.
///
/// The window size sets the descriptor length (`window_size^2`). [`NormalizedPatch::new`]
/// keeps the default [`BoundaryPolicy::Strict`]; use [`NormalizedPatch::clamped`] to
/// describe keypoints near the image edges with partial windows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalizedPatch {
    /// Side length of the square window, in pixels
    pub window_size: usize,

    /// What to do with windows that reach past the image edges
    pub boundary: BoundaryPolicy,
}

impl Default for NormalizedPatch {
    fn default() -> Self {
        Self {
            window_size: 16,
            boundary: BoundaryPolicy::Strict,
        }
    }
}

impl NormalizedPatch {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            ..Default::default()
        }
    }

    /// Skip keypoints whose full window does not fit in the image.
    pub fn strict(window_size: usize) -> Self {
        Self {
            window_size,
            boundary: BoundaryPolicy::Strict,
        }
    }

    /// Describe whatever part of the window lies inside the image.
    pub fn clamped(window_size: usize) -> Self {
        Self {
            window_size,
            boundary: BoundaryPolicy::Clamped,
        }
    }

    /// Length of every descriptor row, `window_size^2`.
    pub fn descriptor_len(&self) -> usize {
        self.window_size * self.window_size
    }

    /// Describe a single keypoint.
    ///
    /// Unlike [`NormalizedPatch::extract`], a window that cannot be placed is reported
    /// as [`Error::WindowOutOfBounds`] instead of a zero row. The result is not padded,
    /// so a clamped window near an edge gives fewer than `window_size^2` values.
    pub fn describe<G>(&self, image: &G, x: f64, y: f64) -> Result<DVector<f64>, Error>
    where
        G: IntensityGrid + ?Sized,
    {
        self.check_preconditions(image)?;
        let (x, y) = truncate_coordinate(x)
            .zip(truncate_coordinate(y))
            .ok_or(Error::NonFiniteCoordinate { index: 0 })?;
        compute_descriptor(x, y, self.window_size, self.boundary, image)
    }

    /// Extract descriptors for the keypoints `(xs[i], ys[i])`.
    ///
    /// Returns a `K x window_size^2` matrix whose row `i` belongs to keypoint `i`.
    /// Rows are unit norm, or all zeros when the keypoint was skipped or its patch is
    /// uniform. Under the clamped policy a partial patch fills the leading entries.
    ///
    /// # Example
    /// ```
    /// use nalgebra::DMatrix;
    /// use patchdesc::NormalizedPatch;
    ///
    /// let image = DMatrix::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
    /// let descriptors = NormalizedPatch::new(3).extract(&image, &[2.0], &[2.0]).unwrap();
    /// assert_eq!(descriptors.shape(), (1, 9));
    /// ```
    pub fn extract<G>(&self, image: &G, xs: &[f64], ys: &[f64]) -> Result<DMatrix<f64>, Error>
    where
        G: IntensityGrid + Sync + ?Sized,
    {
        self.check_preconditions(image)?;
        if xs.len() != ys.len() {
            return Err(Error::CoordinateLengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let keypoints = xs
            .iter()
            .zip(ys)
            .enumerate()
            .map(|(index, (&x, &y))| {
                truncate_coordinate(x)
                    .zip(truncate_coordinate(y))
                    .ok_or(Error::NonFiniteCoordinate { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Extracting {} patch descriptors of length {} ({:?} boundary) from a {} x {} image",
            keypoints.len(),
            self.descriptor_len(),
            self.boundary,
            image.height(),
            image.width()
        );

        let rows = self.describe_all(image, &keypoints);

        let mut descriptors = DMatrix::zeros(keypoints.len(), self.descriptor_len());
        let mut skipped = 0usize;
        for (i, row) in rows.into_iter().enumerate() {
            match row {
                Some(values) => {
                    for (j, &value) in values.iter().enumerate() {
                        descriptors[(i, j)] = value;
                    }
                }
                None => skipped += 1,
            }
        }

        info!(
            "Extracted {} patch descriptors, {} skipped at the image border",
            keypoints.len() - skipped,
            skipped
        );
        Ok(descriptors)
    }

    /// [`NormalizedPatch::extract`] for keypoints given as points.
    pub fn extract_points<G>(
        &self,
        image: &G,
        keypoints: &[Point2<f64>],
    ) -> Result<DMatrix<f64>, Error>
    where
        G: IntensityGrid + Sync + ?Sized,
    {
        let (xs, ys): (Vec<f64>, Vec<f64>) = keypoints.iter().map(|p| (p.x, p.y)).unzip();
        self.extract(image, &xs, &ys)
    }

    fn describe_all<G>(&self, image: &G, keypoints: &[(i64, i64)]) -> Vec<Option<DVector<f64>>>
    where
        G: IntensityGrid + Sync + ?Sized,
    {
        let describe = |&(x, y): &(i64, i64)| {
            compute_descriptor(x, y, self.window_size, self.boundary, image)
                .map_err(|err| trace!("Skipping keypoint: {}", err))
                .ok()
        };

        #[cfg(not(feature = "rayon"))]
        {
            keypoints.iter().map(describe).collect()
        }
        #[cfg(feature = "rayon")]
        {
            keypoints.par_iter().map(describe).collect()
        }
    }

    pub(crate) fn check_preconditions<G>(&self, image: &G) -> Result<(), Error>
    where
        G: IntensityGrid + ?Sized,
    {
        let overflows = self.window_size.checked_mul(self.window_size).is_none();
        if self.window_size == 0 || overflows {
            return Err(Error::InvalidWindowSize);
        }
        if image.height() == 0 || image.width() == 0 {
            return Err(Error::EmptyImage {
                height: image.height(),
                width: image.width(),
            });
        }
        Ok(())
    }
}

/// Normalized patch descriptors with the strict boundary policy.
///
/// Shorthand for `NormalizedPatch::strict(window_size).extract(image, xs, ys)`.
pub fn compute_normalized_patch_descriptors<G>(
    image: &G,
    xs: &[f64],
    ys: &[f64],
    window_size: usize,
) -> Result<DMatrix<f64>, Error>
where
    G: IntensityGrid + Sync + ?Sized,
{
    NormalizedPatch::strict(window_size).extract(image, xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(height: usize, width: usize) -> DMatrix<f64> {
        DMatrix::from_fn(height, width, |r, c| (r * width + c) as f64)
    }

    fn row_norm(matrix: &DMatrix<f64>, i: usize) -> f64 {
        matrix.row(i).norm()
    }

    #[test]
    fn shape_follows_keypoints_and_window() {
        let image = ramp(20, 20);
        let descriptors = NormalizedPatch::new(5)
            .extract(&image, &[5.0, 10.0, 0.0], &[5.0, 12.5, 0.0])
            .unwrap();
        assert_eq!(descriptors.shape(), (3, 25));
    }

    #[test]
    fn empty_keypoints_give_empty_matrix() {
        let image = ramp(8, 8);
        let descriptors = NormalizedPatch::new(3).extract(&image, &[], &[]).unwrap();
        assert_eq!(descriptors.shape(), (0, 9));
    }

    #[test]
    fn border_keypoint_row_is_zero() {
        let image = ramp(10, 10);
        let descriptors = compute_normalized_patch_descriptors(&image, &[0.0, 5.0], &[0.0, 5.0], 5)
            .unwrap();
        assert_eq!(row_norm(&descriptors, 0), 0.0);
        assert!((row_norm(&descriptors, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn concrete_ramp_scenario() {
        let image = ramp(4, 4);
        let descriptors = compute_normalized_patch_descriptors(&image, &[2.0], &[2.0], 3).unwrap();
        let norm = 1002f64.sqrt();
        let expected = [5.0, 6.0, 7.0, 9.0, 10.0, 11.0, 13.0, 14.0, 15.0];
        for (j, raw) in expected.iter().enumerate() {
            assert!((descriptors[(0, j)] - raw / norm).abs() < 1e-12);
        }
    }

    #[test]
    fn coordinates_are_truncated() {
        let image = ramp(4, 4);
        let exact = compute_normalized_patch_descriptors(&image, &[2.0], &[2.0], 3).unwrap();
        let fractional =
            compute_normalized_patch_descriptors(&image, &[2.99], &[2.5], 3).unwrap();
        assert_eq!(exact, fractional);
    }

    #[test]
    fn clamped_rows_are_zero_padded() {
        let image = ramp(4, 4);
        let descriptors = NormalizedPatch::clamped(3)
            .extract(&image, &[0.0], &[0.0])
            .unwrap();
        assert!((row_norm(&descriptors, 0) - 1.0).abs() < 1e-12);
        assert!(descriptors[(0, 3)] > 0.0);
        for j in 4..9 {
            assert_eq!(descriptors[(0, j)], 0.0);
        }
    }

    #[test]
    fn mismatched_coordinates_are_rejected() {
        let image = ramp(4, 4);
        assert_eq!(
            NormalizedPatch::new(3).extract(&image, &[1.0, 2.0], &[1.0]),
            Err(Error::CoordinateLengthMismatch { xs: 2, ys: 1 })
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        let image = ramp(4, 4);
        assert_eq!(
            NormalizedPatch::new(0).extract(&image, &[1.0], &[1.0]),
            Err(Error::InvalidWindowSize)
        );
    }

    #[test]
    fn oversized_window_is_rejected() {
        let image = ramp(4, 4);
        assert_eq!(
            NormalizedPatch::new(usize::MAX).extract(&image, &[1.0], &[1.0]),
            Err(Error::InvalidWindowSize)
        );
        assert_eq!(
            NormalizedPatch::clamped(1 << (usize::BITS / 2)).describe(&image, 1.0, 1.0),
            Err(Error::InvalidWindowSize)
        );
    }

    #[test]
    fn far_away_keypoints_give_zero_rows() {
        let image = ramp(10, 10);
        for extractor in [NormalizedPatch::strict(3), NormalizedPatch::clamped(3)] {
            let descriptors = extractor
                .extract(&image, &[1e300, -1e300, 5.0, 5.0], &[5.0, 5.0, 1e300, -1e300])
                .unwrap();
            assert_eq!(descriptors.shape(), (4, 9));
            assert!(descriptors.iter().all(|&v| v == 0.0));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_survives_serialization() {
        let extractor = NormalizedPatch::clamped(7);
        let json = serde_json::to_string(&extractor).unwrap();
        assert_eq!(
            serde_json::from_str::<NormalizedPatch>(&json).unwrap(),
            extractor
        );
        assert_eq!(
            serde_json::from_str::<BoundaryPolicy>("\"Strict\"").unwrap(),
            BoundaryPolicy::Strict
        );
    }

    #[test]
    fn empty_image_is_rejected() {
        let image = DMatrix::<f64>::zeros(0, 4);
        assert_eq!(
            NormalizedPatch::new(3).extract(&image, &[], &[]),
            Err(Error::EmptyImage {
                height: 0,
                width: 4
            })
        );
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let image = ramp(4, 4);
        assert_eq!(
            NormalizedPatch::new(3).extract(&image, &[1.0, f64::NAN], &[1.0, 1.0]),
            Err(Error::NonFiniteCoordinate { index: 1 })
        );
    }

    #[test]
    fn describe_reports_out_of_bounds() {
        let image = ramp(10, 10);
        assert!(matches!(
            NormalizedPatch::new(5).describe(&image, 0.0, 0.0),
            Err(Error::WindowOutOfBounds { .. })
        ));
        assert_eq!(
            NormalizedPatch::new(5)
                .describe(&image, 5.0, 5.0)
                .unwrap()
                .len(),
            25
        );
    }

    #[test]
    fn points_and_coordinate_slices_agree() {
        let image = ramp(12, 12);
        let extractor = NormalizedPatch::new(4);
        let from_slices = extractor
            .extract(&image, &[3.0, 6.0, 11.0], &[4.0, 6.0, 1.0])
            .unwrap();
        let from_points = extractor
            .extract_points(
                &image,
                &[
                    Point2::new(3.0, 4.0),
                    Point2::new(6.0, 6.0),
                    Point2::new(11.0, 1.0),
                ],
            )
            .unwrap();
        assert_eq!(from_slices, from_points);
    }
}
