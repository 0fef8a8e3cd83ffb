use thiserror::Error;

/// Failures surfaced while extracting patch descriptors.
///
/// Only [`Error::WindowOutOfBounds`] is produced per keypoint; the rest are
/// precondition violations checked before any keypoint is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("keypoint coordinate sequences differ in length: {xs} x-coordinates, {ys} y-coordinates")]
    CoordinateLengthMismatch { xs: usize, ys: usize },
    #[error("window size must be positive and small enough to square")]
    InvalidWindowSize,
    #[error("image has no pixels ({height} x {width})")]
    EmptyImage { height: usize, width: usize },
    #[error("keypoint {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("window of size {window_size} at ({x}, {y}) leaves the image")]
    WindowOutOfBounds { x: i64, y: i64, window_size: usize },
}
