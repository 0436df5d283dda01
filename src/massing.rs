// massing.rs - Spans -> box instances and site metrics
//
// Default geometry instantiator for the span list. The site is a square of
// `site_width` world units centered on the origin; each grid cell is
// `site_width / resolution` wide and columns stand on y = 0.

use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::MeshInstance;
use crate::mesher::Span;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassingParams {
    /// World width of the whole site
    pub site_width: f32,
    /// World height of a column with normalized height 1.0
    pub height_multiplier: f32,
}

impl Default for MassingParams {
    fn default() -> Self {
        Self {
            site_width: 20.0,
            height_multiplier: 5.0,
        }
    }
}

impl MassingParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.site_width.is_finite() && self.site_width > 0.0) {
            return Err(Error::invalid_param("site_width", self.site_width, "must be positive"));
        }
        if !(self.height_multiplier.is_finite() && self.height_multiplier > 0.0) {
            return Err(Error::invalid_param(
                "height_multiplier",
                self.height_multiplier,
                "must be positive",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn cell_size(&self, resolution: usize) -> f32 {
        self.site_width / resolution.max(1) as f32
    }
}

/// Unit box: x, z in [-0.5, 0.5], y in [0, 1]
const BOX_VERTICES: [Vec3; 8] = [
    Vec3::new(-0.5, 0.0, -0.5),
    Vec3::new(0.5, 0.0, -0.5),
    Vec3::new(0.5, 0.0, 0.5),
    Vec3::new(-0.5, 0.0, 0.5),
    Vec3::new(-0.5, 1.0, -0.5),
    Vec3::new(0.5, 1.0, -0.5),
    Vec3::new(0.5, 1.0, 0.5),
    Vec3::new(-0.5, 1.0, 0.5),
];

/// Counter-clockwise seen from outside
const BOX_TRIANGLES: [[u32; 3]; 12] = [
    [0, 1, 2], [0, 2, 3], // bottom
    [4, 6, 5], [4, 7, 6], // top
    [3, 2, 6], [3, 6, 7], // +z
    [1, 0, 4], [1, 4, 5], // -z
    [2, 1, 5], [2, 5, 6], // +x
    [0, 3, 7], [0, 7, 4], // -x
];

/// World transform placing the unit box over `span`
pub fn span_transform(span: &Span, resolution: usize, params: &MassingParams) -> Affine3A {
    let cell = params.cell_size(resolution);
    let half = params.site_width * 0.5;

    let scale = Vec3::new(
        span.width as f32 * cell,
        span.height * params.height_multiplier,
        cell,
    );
    let center = Vec3::new(
        (span.start_column as f32 + span.width as f32 * 0.5) * cell - half,
        0.0,
        (span.row as f32 + 0.5) * cell - half,
    );
    Affine3A::from_scale_rotation_translation(scale, Quat::IDENTITY, center)
}

pub fn span_box(span: &Span, resolution: usize, params: &MassingParams) -> MeshInstance {
    MeshInstance::indexed(
        BOX_VERTICES.to_vec(),
        BOX_TRIANGLES.to_vec(),
        span_transform(span, resolution, params),
    )
}

/// One box instance per span, in span order
pub fn build_instances(spans: &[Span], resolution: usize, params: &MassingParams) -> Vec<MeshInstance> {
    spans.iter().map(|s| span_box(s, resolution, params)).collect()
}

/// Display metrics derived from a span list
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MassingMetrics {
    pub span_count: usize,
    pub occupied_cells: usize,
    /// Approximate built footprint in square world units
    pub footprint_area: f32,
    /// Tallest column in world units
    pub max_height: f32,
}

impl MassingMetrics {
    pub fn from_spans(spans: &[Span], resolution: usize, params: &MassingParams) -> Self {
        let cell = params.cell_size(resolution);
        let occupied_cells: usize = spans.iter().map(|s| s.width).sum();
        let max_height = spans.iter().map(|s| s.height).fold(0.0f32, f32::max);

        Self {
            span_count: spans.len(),
            occupied_cells,
            footprint_area: occupied_cells as f32 * cell * cell,
            max_height: max_height * params.height_multiplier,
        }
    }
}
