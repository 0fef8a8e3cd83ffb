use log::*;
use nalgebra::{DVector, Point2};

use crate::{grid::IntensityGrid, Error, NormalizedPatch};

pub type PatchDescriptor = DVector<f64>;

/// Feature object which holds a keypoint in image coordinates
/// and tries to handle a generic descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Feature<Descriptor> {
    pub keypoint: Point2<f64>,
    pub descriptor: Descriptor,
}

impl Feature<PatchDescriptor> {
    /// Describes each keypoint with a normalized patch and keeps the ones that could be described.
    ///
    /// Keypoints whose window leaves the image are dropped, so the result can be shorter than
    /// `keypoints`. Uniform patches are kept with a zero descriptor.
    pub fn from_normalized_patches<G>(
        image: &G,
        keypoints: &[Point2<f64>],
        extractor: &NormalizedPatch,
    ) -> Result<Vec<Self>, Error>
    where
        G: IntensityGrid + ?Sized,
    {
        extractor.check_preconditions(image)?;

        let mut features = Vec::with_capacity(keypoints.len());
        for (index, &keypoint) in keypoints.iter().enumerate() {
            match extractor.describe(image, keypoint.x, keypoint.y) {
                Ok(descriptor) => features.push(Feature {
                    keypoint,
                    descriptor,
                }),
                Err(Error::WindowOutOfBounds { .. }) => {}
                Err(Error::NonFiniteCoordinate { .. }) => {
                    return Err(Error::NonFiniteCoordinate { index })
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            "Kept {} of {} keypoints as patch features",
            features.len(),
            keypoints.len()
        );
        Ok(features)
    }
}
