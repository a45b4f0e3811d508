//! Closed triangle solid built from a height field.

use crate::errors::{require_positive, Result, SurfaceError};
use crate::grid::{Grid, HeightField};

/// Indexed triangle mesh of a surface on a flat base.
///
/// Vertices `0..rows*cols` are the top layer in row-major order, followed by
/// the same number of bottom-layer vertices. Triangles are wound so that
/// their right-hand normals point out of the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[usize; 3]>,
    rows: usize,
    cols: usize,
}

impl SolidMesh {
    /// Triangulates `heights` over `grid` on top of a flat base.
    ///
    /// The base sits `base_thickness` below the lowest height. Coordinates
    /// must increase along both grid axes for the winding to face outward.
    pub fn from_heights(grid: &Grid, heights: &HeightField, base_thickness: f64) -> Result<Self> {
        let (rows, cols) = heights.dim();
        if rows < 2 || cols < 2 {
            return Err(SurfaceError::InvalidInput(format!(
                "cannot triangulate a {rows}x{cols} grid; need at least 2x2"
            )));
        }
        if grid.x.dim() != (rows, cols) || grid.y.dim() != (rows, cols) {
            return Err(SurfaceError::InvalidInput(format!(
                "grid shape {:?}/{:?} does not match height field {:?}",
                grid.x.dim(),
                grid.y.dim(),
                heights.dim()
            )));
        }
        require_positive("base thickness", base_thickness)?;

        if heights.iter().any(|h| !h.is_finite()) {
            return Err(SurfaceError::InvalidInput(
                "height field contains non-finite values".to_string(),
            ));
        }
        let floor = heights.iter().copied().fold(f64::INFINITY, f64::min) - base_thickness;

        let mut vertices = Vec::with_capacity(2 * rows * cols);
        for ((i, j), &z) in heights.indexed_iter() {
            vertices.push([grid.x[[i, j]], grid.y[[i, j]], z]);
        }
        for ((i, j), _) in heights.indexed_iter() {
            vertices.push([grid.x[[i, j]], grid.y[[i, j]], floor]);
        }

        let mut mesh = Self {
            vertices,
            triangles: Vec::with_capacity(Self::triangle_count_for(rows, cols)),
            rows,
            cols,
        };
        mesh.add_caps();
        mesh.add_walls();
        Ok(mesh)
    }

    /// Number of triangles in the solid for a `rows x cols` grid.
    ///
    /// Zero when either side has fewer than two samples.
    pub fn triangle_count_for(rows: usize, cols: usize) -> usize {
        let (row_cells, col_cells) = (rows.saturating_sub(1), cols.saturating_sub(1));
        if row_cells == 0 || col_cells == 0 {
            return 0;
        }
        4 * row_cells * col_cells + 4 * row_cells + 4 * col_cells
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn top(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    fn bottom(&self, i: usize, j: usize) -> usize {
        self.rows * self.cols + i * self.cols + j
    }

    fn add_caps(&mut self) {
        for i in 0..self.rows - 1 {
            for j in 0..self.cols - 1 {
                let (t00, t01) = (self.top(i, j), self.top(i, j + 1));
                let (t10, t11) = (self.top(i + 1, j), self.top(i + 1, j + 1));
                self.triangles.push([t00, t01, t10]);
                self.triangles.push([t10, t01, t11]);

                let (b00, b01) = (self.bottom(i, j), self.bottom(i, j + 1));
                let (b10, b11) = (self.bottom(i + 1, j), self.bottom(i + 1, j + 1));
                self.triangles.push([b00, b10, b01]);
                self.triangles.push([b10, b11, b01]);
            }
        }
    }

    fn add_walls(&mut self) {
        let (last_row, last_col) = (self.rows - 1, self.cols - 1);

        for i in 0..last_row {
            // -x
            let (t0, t1) = (self.top(i, 0), self.top(i + 1, 0));
            let (b0, b1) = (self.bottom(i, 0), self.bottom(i + 1, 0));
            self.triangles.push([t0, t1, b0]);
            self.triangles.push([t1, b1, b0]);

            // +x
            let (t0, t1) = (self.top(i, last_col), self.top(i + 1, last_col));
            let (b0, b1) = (self.bottom(i, last_col), self.bottom(i + 1, last_col));
            self.triangles.push([t0, b0, t1]);
            self.triangles.push([t1, b0, b1]);
        }

        for j in 0..last_col {
            // -y
            let (t0, t1) = (self.top(0, j), self.top(0, j + 1));
            let (b0, b1) = (self.bottom(0, j), self.bottom(0, j + 1));
            self.triangles.push([t0, b0, t1]);
            self.triangles.push([t1, b0, b1]);

            // +y
            let (t0, t1) = (self.top(last_row, j), self.top(last_row, j + 1));
            let (b0, b1) = (self.bottom(last_row, j), self.bottom(last_row, j + 1));
            self.triangles.push([t0, t1, b0]);
            self.triangles.push([t1, b1, b0]);
        }
    }

    /// Unit normal of triangle `index` from its winding; zero when degenerate.
    pub fn normal(&self, index: usize) -> [f64; 3] {
        let [a, b, c] = self.triangles[index].map(|v| self.vertices[v]);
        let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let n = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len > 0.0 {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            [0.0; 3]
        }
    }

    /// Signed volume enclosed by the triangles (positive for outward winding).
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|v| self.vertices[v]);
                (a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
                    + a[2] * (b[0] * c[1] - b[1] * c[0]))
                    / 6.0
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::linspace;
    use ndarray::{array, Array2};
    use std::collections::HashMap;

    fn ramp(rows: usize, cols: usize) -> (Grid, HeightField) {
        let grid = Grid::meshgrid(&linspace(0.0, 1.0, cols), &linspace(0.0, 2.0, rows));
        let heights = Array2::from_shape_fn((rows, cols), |(i, j)| 0.1 * (i as f64) - 0.05 * (j as f64));
        (grid, heights)
    }

    #[test]
    fn test_triangle_count_formula() {
        let (grid, heights) = ramp(4, 6);
        let mesh = SolidMesh::from_heights(&grid, &heights, 1.0).unwrap();

        // 2 * 3 * 5 top + same bottom + 4 * 3 + 4 * 5 walls
        assert_eq!(mesh.triangle_count(), 30 + 30 + 12 + 20);
        assert_eq!(mesh.triangle_count(), SolidMesh::triangle_count_for(4, 6));
        assert_eq!(mesh.vertices.len(), 2 * 4 * 6);
    }

    #[test]
    fn test_triangle_count_for_untriangulable_grids() {
        assert_eq!(SolidMesh::triangle_count_for(0, 0), 0);
        assert_eq!(SolidMesh::triangle_count_for(0, 5), 0);
        assert_eq!(SolidMesh::triangle_count_for(1, 5), 0);
        assert_eq!(SolidMesh::triangle_count_for(5, 1), 0);
        assert_eq!(SolidMesh::triangle_count_for(2, 2), 12);
    }

    #[test]
    fn test_mesh_is_watertight() {
        let (grid, heights) = ramp(5, 3);
        let mesh = SolidMesh::from_heights(&grid, &heights, 0.5).unwrap();

        let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
        for tri in &mesh.triangles {
            for k in 0..3 {
                *edges.entry((tri[k], tri[(k + 1) % 3])).or_default() += 1;
            }
        }

        for (&(a, b), &count) in &edges {
            assert_eq!(count, 1, "directed edge {a}->{b} used {count} times");
            assert_eq!(edges.get(&(b, a)), Some(&1), "edge {a}->{b} has no twin");
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        let grid = Grid::meshgrid(&linspace(0.0, 2.0, 3), &linspace(0.0, 3.0, 4));
        let heights = Array2::zeros((4, 3));
        let mesh = SolidMesh::from_heights(&grid, &heights, 1.0).unwrap();

        // Flat 2 x 3 slab, 1 thick
        assert!((mesh.signed_volume() - 6.0).abs() < 1e-9);

        let cells = 2 * 3;
        for t in 0..cells {
            assert_eq!(mesh.normal(4 * t), [0.0, 0.0, 1.0]);
            assert_eq!(mesh.normal(4 * t + 1), [0.0, 0.0, 1.0]);
            assert_eq!(mesh.normal(4 * t + 2), [0.0, 0.0, -1.0]);
            assert_eq!(mesh.normal(4 * t + 3), [0.0, 0.0, -1.0]);
        }
        let first_wall = 4 * cells;
        assert_eq!(mesh.normal(first_wall), [-1.0, 0.0, 0.0]);
        assert_eq!(mesh.normal(first_wall + 2), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_base_is_flat_below_minimum() {
        let grid = Grid::meshgrid(&linspace(0.0, 1.0, 2), &linspace(0.0, 1.0, 2));
        let heights = array![[0.3, -0.2], [0.1, 0.4]];
        let mesh = SolidMesh::from_heights(&grid, &heights, 1.0).unwrap();

        for v in &mesh.vertices[4..] {
            assert!((v[2] + 1.2).abs() < 1e-12);
        }
        assert_eq!(mesh.vertices[1], [1.0, 0.0, -0.2]);
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let grid = Grid::meshgrid(&linspace(0.0, 1.0, 5), &linspace(0.0, 1.0, 1));
        let heights = Array2::zeros((1, 5));
        assert!(matches!(
            SolidMesh::from_heights(&grid, &heights, 1.0),
            Err(SurfaceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_shape_mismatch_and_bad_thickness() {
        let (grid, _) = ramp(3, 3);
        assert!(matches!(
            SolidMesh::from_heights(&grid, &Array2::zeros((3, 4)), 1.0),
            Err(SurfaceError::InvalidInput(_))
        ));
        let (grid, heights) = ramp(3, 3);
        assert!(matches!(
            SolidMesh::from_heights(&grid, &heights, 0.0),
            Err(SurfaceError::InvalidParameter(_))
        ));
    }
}
