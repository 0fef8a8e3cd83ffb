use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a window that reaches past the image edge is handled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundaryPolicy {
    /// Only full `window_size x window_size` windows are described;
    /// a window crossing the edge produces no descriptor.
    #[default]
    Strict,
    /// The window is cut at the image edges and whatever remains is described.
    Clamped,
}

/// Truncate a real pixel coordinate toward zero, `-0.7` becomes `0`.
///
/// Returns `None` for NaN and infinities.
pub fn truncate_coordinate(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

/// Half-open pixel ranges covered by a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchWindow {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl PatchWindow {
    /// Locate the window of `window_size` pixels per side anchored at `(x, y)`.
    ///
    /// The window starts `(window_size - 1) / 2` pixels before the keypoint, so odd
    /// sizes are centred and even sizes put the keypoint on the top-left pixel of the
    /// central `2 x 2` block.
    ///
    /// `None` means there is nothing to describe: the strict window leaves the image,
    /// or the clamped window has no pixels left.
    pub fn locate(
        x: i64,
        y: i64,
        window_size: usize,
        height: usize,
        width: usize,
        policy: BoundaryPolicy,
    ) -> Option<Self> {
        let rows = axis_range(y, window_size, height, policy)?;
        let cols = axis_range(x, window_size, width, policy)?;
        Some(Self { rows, cols })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.cols.len()
    }

    /// Number of pixels in the window.
    pub fn area(&self) -> usize {
        self.height() * self.width()
    }
}

fn axis_range(
    center: i64,
    window_size: usize,
    dim: usize,
    policy: BoundaryPolicy,
) -> Option<Range<usize>> {
    // truncated coordinates can sit at the ends of the i64 range
    let size = i64::try_from(window_size).unwrap_or(i64::MAX);
    let start = center.saturating_sub((size - 1) / 2);
    let end = start.saturating_add(size);
    let dim = dim as i64;

    let (start, end) = match policy {
        BoundaryPolicy::Strict if start < 0 || end > dim => return None,
        BoundaryPolicy::Strict => (start, end),
        BoundaryPolicy::Clamped => (start.max(0), end.min(dim)),
    };

    (start < end).then(|| start as usize..end as usize)
}
