//! Normalized patch descriptors.
//!
//! Each keypoint is described by the square window of intensities around it,
//! flattened row by row and scaled to unit Euclidean norm. It is the simplest
//! baseline a local feature matcher can be compared against.
//!
//! ```
//! use nalgebra::DMatrix;
//! use patchdesc::compute_normalized_patch_descriptors;
//!
//! let image = DMatrix::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
//! let descriptors = compute_normalized_patch_descriptors(&image, &[2.0], &[2.0], 3).unwrap();
//! assert!((descriptors[(0, 0)] - 5.0 / 1002f64.sqrt()).abs() < 1e-12);
//! ```

pub mod algorithms;
mod error;
mod extractor;
pub mod features;
pub mod grid;

pub use algorithms::window::BoundaryPolicy;
pub use error::Error;
pub use extractor::{compute_normalized_patch_descriptors, NormalizedPatch};
pub use features::Feature;
pub use grid::IntensityGrid;
