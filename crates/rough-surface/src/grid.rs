//! Coordinate grids and the surface value returned by the generators.

use ndarray::{Array1, Array2};

use crate::errors::{Result, SurfaceError};

/// Surface heights, indexed `[row, col]` = `[y, x]`.
pub type HeightField = Array2<f64>;

/// Meshgrid pair: `x` varies along columns, `y` along rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl Grid {
    /// Expands two axes into a `(y.len(), x.len())` grid.
    pub fn meshgrid(x: &Array1<f64>, y: &Array1<f64>) -> Self {
        let shape = (y.len(), x.len());
        Self {
            x: Array2::from_shape_fn(shape, |(_, j)| x[j]),
            y: Array2::from_shape_fn(shape, |(i, _)| y[i]),
        }
    }

    /// Returns `(rows, cols)`.
    pub fn dim(&self) -> (usize, usize) {
        self.x.dim()
    }
}

/// `n` evenly spaced samples over the closed interval `[start, end]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    Array1::linspace(start, end, n)
}

/// A generated height field together with its coordinate axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Column coordinates (length = number of columns).
    pub x: Array1<f64>,
    /// Row coordinates (length = number of rows).
    pub y: Array1<f64>,
    pub heights: HeightField,
}

impl Surface {
    pub fn new(x: Array1<f64>, y: Array1<f64>, heights: HeightField) -> Result<Self> {
        if heights.dim() != (y.len(), x.len()) {
            return Err(SurfaceError::InvalidInput(format!(
                "height field shape {:?} does not match axes ({}, {})",
                heights.dim(),
                y.len(),
                x.len()
            )));
        }
        Ok(Self { x, y, heights })
    }

    pub fn grid(&self) -> Grid {
        Grid::meshgrid(&self.x, &self.y)
    }

    /// Returns `(rows, cols)`.
    pub fn dim(&self) -> (usize, usize) {
        self.heights.dim()
    }

    pub fn is_finite(&self) -> bool {
        self.heights.iter().all(|h| h.is_finite())
    }

    /// Describes why the field looks meaningless, if it does.
    pub fn degeneracy(&self) -> Option<String> {
        degeneracy(&self.heights)
    }

    /// Turns a degenerate field into [`SurfaceError::NumericalDegeneracy`].
    ///
    /// Use this when a non-trivial surface is required; the generators only
    /// warn about degeneracy since e.g. N = 0 legitimately yields zeros.
    pub fn ensure_nontrivial(&self) -> Result<()> {
        match self.degeneracy() {
            Some(reason) => Err(SurfaceError::NumericalDegeneracy(reason)),
            None => Ok(()),
        }
    }
}

pub(crate) fn degeneracy(heights: &HeightField) -> Option<String> {
    if heights.iter().all(|h| !h.is_finite()) {
        Some("every height is non-finite".to_string())
    } else if heights.iter().all(|&h| h == 0.0) {
        Some("every height is zero".to_string())
    } else {
        None
    }
}
