use std::ops::Deref;

use image::{ImageBuffer, Luma, Primitive};
use nalgebra::{DMatrix, Scalar};

/// Read-only access to a grayscale intensity grid.
///
/// Rows run top to bottom (`y`), columns left to right (`x`).
pub trait IntensityGrid {
    /// Number of rows, `M`.
    fn height(&self) -> usize;
    /// Number of columns, `N`.
    fn width(&self) -> usize;
    /// Intensity at `(row, col)`. Callers keep indices inside the grid.
    fn intensity(&self, row: usize, col: usize) -> f64;
}

impl<T> IntensityGrid for DMatrix<T>
where
    T: Scalar + Copy + Into<f64>,
{
    fn height(&self) -> usize {
        self.nrows()
    }

    fn width(&self) -> usize {
        self.ncols()
    }

    fn intensity(&self, row: usize, col: usize) -> f64 {
        self[(row, col)].into()
    }
}

impl<P, C> IntensityGrid for ImageBuffer<Luma<P>, C>
where
    P: Primitive + Into<f64>,
    C: Deref<Target = [P]>,
{
    fn height(&self) -> usize {
        ImageBuffer::height(self) as usize
    }

    fn width(&self) -> usize {
        ImageBuffer::width(self) as usize
    }

    fn intensity(&self, row: usize, col: usize) -> f64 {
        self.get_pixel(col as u32, row as u32).0[0].into()
    }
}
