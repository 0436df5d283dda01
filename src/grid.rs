// grid.rs - Normalized height grid produced by the sampler
//
// Row-major, indexed [row, column]. Values are clamped to [0, 1] on the way
// in, so every consumer can rely on that range.

use ndarray::{Array2, ArrayView1};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    cells: Array2<f32>,
}

impl HeightGrid {
    /// Build a grid by evaluating `f(row, column)` for every cell
    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let cells = Array2::from_shape_fn((rows, columns), |(y, x)| f(y, x).clamp(0.0, 1.0));
        Self { cells }
    }

    /// Build a grid from explicit rows. Rows must share one length and every
    /// value must already lie in [0, 1].
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let columns = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != columns) {
            return Err(Error::invalid_param("rows", rows.len(), "rows must have equal length"));
        }
        if let Some(v) = rows.iter().flatten().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(Error::invalid_param("height", v, "heights must lie in [0, 1]"));
        }

        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let cells = Array2::from_shape_vec((rows.len(), columns), flat)
            .map_err(|_| Error::invalid_param("rows", rows.len(), "rows do not form a grid"))?;
        Ok(Self { cells })
    }

    /// Side length for square grids (column count)
    pub fn resolution(&self) -> usize {
        self.cells.ncols()
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn columns(&self) -> usize {
        self.cells.ncols()
    }

    /// Height at (x, y); 0.0 outside the grid
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.cells.get((y, x)).copied().unwrap_or(0.0)
    }

    pub fn row_iter(&self) -> impl Iterator<Item = ArrayView1<'_, f32>> {
        self.cells.outer_iter()
    }

    pub fn occupied_count(&self, threshold: f32) -> usize {
        self.cells.iter().filter(|&&h| h > threshold).count()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_clamps() {
        let grid = HeightGrid::from_fn(2, 3, |y, x| (y * 3 + x) as f32 - 1.0);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.get(0, 0), 0.0);
        assert_eq!(grid.get(2, 1), 1.0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = HeightGrid::from_fn(2, 2, |_, _| 0.5);
        assert_eq!(grid.get(1, 1), 0.5);
        assert_eq!(grid.get(2, 0), 0.0);
        assert_eq!(grid.get(0, 5), 0.0);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let result = HeightGrid::from_rows(&[vec![0.0, 1.0], vec![0.5]]);
        assert!(matches!(result, Err(Error::InvalidParameter { name: "rows", .. })));
    }

    #[test]
    fn test_from_rows_rejects_out_of_range() {
        let result = HeightGrid::from_rows(&[vec![0.0, 1.5]]);
        assert!(matches!(result, Err(Error::InvalidParameter { name: "height", .. })));
    }

    #[test]
    fn test_occupied_count() {
        let grid = HeightGrid::from_rows(&[vec![0.0, 0.05, 0.06], vec![1.0, 0.0, 0.9]]).unwrap();
        assert_eq!(grid.occupied_count(0.05), 3);
        assert_eq!(grid.occupied_count(0.95), 1);
    }
}
