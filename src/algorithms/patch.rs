use nalgebra::DVector;

use crate::{
    algorithms::window::{BoundaryPolicy, PatchWindow},
    grid::IntensityGrid,
    Error,
};

/// Compute the normalized patch descriptor of the keypoint at integer pixel `(x, y)`.
///
/// The returned vector holds the window's intensities in row-major order scaled to
/// unit L2 norm. Its length is the window area, which under [`BoundaryPolicy::Clamped`]
/// can be smaller than `window_size^2` near the image edges.
///
/// A uniform patch has zero norm and is returned as zeros.
pub fn compute_descriptor<G>(
    x: i64,
    y: i64,
    window_size: usize,
    policy: BoundaryPolicy,
    image: &G,
) -> Result<DVector<f64>, Error>
where
    G: IntensityGrid + ?Sized,
{
    let window = PatchWindow::locate(x, y, window_size, image.height(), image.width(), policy)
        .ok_or(Error::WindowOutOfBounds { x, y, window_size })?;

    Ok(normalize(flatten(image, &window)))
}

/// Copy the pixels covered by `window` into a vector, row by row.
pub fn flatten<G>(image: &G, window: &PatchWindow) -> DVector<f64>
where
    G: IntensityGrid + ?Sized,
{
    DVector::from_iterator(
        window.area(),
        window.rows.clone().flat_map(|row| {
            window
                .cols
                .clone()
                .map(move |col| image.intensity(row, col))
        }),
    )
}

/// Scale `patch` to unit Euclidean norm, leaving an all-zero patch untouched.
pub fn normalize(mut patch: DVector<f64>) -> DVector<f64> {
    let norm = patch.norm();
    if norm != 0.0 {
        patch /= norm;
    }
    patch
}
