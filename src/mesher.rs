// mesher.rs - Greedy row merging: height grid -> spans
//
// Each row is scanned once, left to right, with one extra sentinel column of
// height 0 that flushes the last run. Runs never merge across rows.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::HeightGrid;

/// Cells at or below this height are empty
pub const DEFAULT_MERGE_THRESHOLD: f32 = 0.05;

/// One maximal horizontal run of equal, non-empty height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub row: usize,
    pub start_column: usize,
    pub width: usize,
    pub height: f32,
}

impl Span {
    /// One past the last column covered
    #[inline]
    pub fn end_column(&self) -> usize {
        self.start_column + self.width
    }
}

/// Spans ordered by row, then start column
pub type SpanList = Vec<Span>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    pub merge_threshold: f32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self { merge_threshold: DEFAULT_MERGE_THRESHOLD }
    }
}

impl MeshParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.merge_threshold) {
            return Err(Error::invalid_param(
                "merge_threshold",
                self.merge_threshold,
                "must lie in [0, 1)",
            ));
        }
        Ok(())
    }
}

/// Merge every row of `grid` into spans
pub fn mesh_rows(grid: &HeightGrid, merge_threshold: f32) -> SpanList {
    let mut spans = Vec::new();
    for (y, row) in grid.row_iter().enumerate() {
        mesh_row(y, row.iter().copied(), merge_threshold, &mut spans);
    }
    debug!(rows = grid.rows(), spans = spans.len(), "meshed grid");
    spans
}

/// Re-run the mesher for a held grid whenever mesh parameters change
pub fn recompute(grid: &HeightGrid, params: &MeshParams) -> SpanList {
    mesh_rows(grid, params.merge_threshold)
}

/// Check that `spans` could have come out of `mesh_rows` on a
/// `resolution`-sided grid with `merge_threshold`
pub fn validate_spans(spans: &[Span], resolution: usize, merge_threshold: f32) -> Result<()> {
    let mut prev: Option<&Span> = None;
    for (i, s) in spans.iter().enumerate() {
        if s.width == 0 {
            return Err(Error::invalid_param("span.width", format!("{} (span {})", s.width, i), "must be at least 1"));
        }
        if !(s.height > merge_threshold && s.height <= 1.0) {
            return Err(Error::invalid_param(
                "span.height",
                format!("{} (span {})", s.height, i),
                "must lie above the merge threshold and at most 1",
            ));
        }
        if s.row >= resolution {
            return Err(Error::invalid_param("span.row", format!("{} (span {})", s.row, i), "must lie inside the grid"));
        }
        if s.end_column() > resolution {
            return Err(Error::invalid_param(
                "span.end_column",
                format!("{} (span {})", s.end_column(), i),
                "must not run past the grid",
            ));
        }
        if let Some(p) = prev {
            let ordered = s.row > p.row || (s.row == p.row && s.start_column >= p.end_column());
            if !ordered {
                return Err(Error::invalid_param(
                    "spans",
                    format!("span {} at ({}, {})", i, s.row, s.start_column),
                    "must be ordered by row then column without overlap",
                ));
            }
        }
        prev = Some(s);
    }
    Ok(())
}

fn mesh_row(y: usize, heights: impl Iterator<Item = f32>, threshold: f32, out: &mut SpanList) {
    let mut current = 0.0f32;
    let mut run_start = 0usize;
    let mut x = 0usize;

    // Trailing 0.0 is the sentinel column
    for h in heights.chain(std::iter::once(0.0)) {
        // Exact compare: sampled heights are already quantized
        if h != current {
            if current > threshold && x > run_start {
                out.push(Span {
                    row: y,
                    start_column: run_start,
                    width: x - run_start,
                    height: current,
                });
            }
            run_start = x;
            current = h;
        }
        x += 1;
    }
}
