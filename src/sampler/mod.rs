// sampler/ - Raster image -> normalized height grid
//
// Pipeline:
//   1. Validate parameters, decode the image
//   2. Resize to resolution x resolution
//   3. Mode filter (floorplan: contrast, heightmap: blur), optional invert
//   4. Composite over the background fill, take channel-mean luminance
//   5. Threshold luminance into cell heights

mod color;
mod filter;

pub use color::Color;

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::HeightGrid;

/// Largest grid side the sampler will produce
pub const MAX_RESOLUTION: usize = 256;
/// Grid cells per complexity step
pub const CELLS_PER_COMPLEXITY: usize = 10;

/// How luminance is turned into height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// Near-binary walls: every dark cell becomes a full-height column
    #[default]
    Floorplan,
    /// Continuous relief: darker cells become taller columns
    Heightmap,
}

impl fmt::Display for SampleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleMode::Floorplan => write!(f, "floorplan"),
            SampleMode::Heightmap => write!(f, "heightmap"),
        }
    }
}

impl FromStr for SampleMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "floorplan" => Ok(SampleMode::Floorplan),
            "heightmap" => Ok(SampleMode::Heightmap),
            other => Err(format!("unknown mode '{}' (expected floorplan or heightmap)", other)),
        }
    }
}

/// Sampling parameters for one ingest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestParams {
    pub complexity: u32,
    /// Luminance cut-off, 0-255. Cells darker than this are occupied.
    pub threshold: u32,
    pub invert: bool,
    pub mode: SampleMode,
}

impl Default for IngestParams {
    fn default() -> Self {
        Self {
            complexity: 4,
            threshold: 128,
            invert: false,
            mode: SampleMode::Floorplan,
        }
    }
}

impl IngestParams {
    pub fn validate(&self) -> Result<()> {
        if self.complexity == 0 {
            return Err(Error::invalid_param("complexity", self.complexity, "must be greater than 0"));
        }
        if self.threshold > 255 {
            return Err(Error::invalid_param("threshold", self.threshold, "must lie in [0, 255]"));
        }
        Ok(())
    }

    /// Grid side length: min(256, complexity * 10)
    pub fn resolution(&self) -> usize {
        resolution_for(self.complexity)
    }
}

#[inline]
pub fn resolution_for(complexity: u32) -> usize {
    (complexity as usize)
        .saturating_mul(CELLS_PER_COMPLEXITY)
        .min(MAX_RESOLUTION)
}

/// Decode `bytes` and sample them into a height grid
pub fn sample_image(bytes: &[u8], params: &IngestParams) -> Result<HeightGrid> {
    params.validate()?;
    let img = image::load_from_memory(bytes)?;
    debug!(width = img.width(), height = img.height(), "decoded image");
    sample_decoded(&img, params)
}

/// Sample an already decoded image
pub fn sample_decoded(img: &DynamicImage, params: &IngestParams) -> Result<HeightGrid> {
    params.validate()?;
    let n = params.resolution();

    let resized = img.resize_exact(n as u32, n as u32, FilterType::Triangle).to_rgba8();
    let layer = match params.mode {
        SampleMode::Floorplan => filter::high_contrast(&resized, params.invert),
        SampleMode::Heightmap => filter::soften(&resized, params.invert),
    };

    let background = if params.invert { Color::BLACK } else { Color::WHITE };
    let threshold = params.threshold as f32;

    let grid = HeightGrid::from_fn(n, n, |y, x| {
        let lum = Color::from_rgba(*layer.get_pixel(x as u32, y as u32))
            .over(background)
            .luminance();
        cell_height(lum, threshold, params.mode)
    });

    debug!(resolution = n, mode = %params.mode, occupied = grid.occupied_count(0.0), "sampled grid");
    Ok(grid)
}

/// Height for one cell given its luminance (0-255)
#[inline]
pub fn cell_height(luminance: f32, threshold: f32, mode: SampleMode) -> f32 {
    if luminance >= threshold {
        return 0.0;
    }
    match mode {
        SampleMode::Floorplan => 1.0,
        SampleMode::Heightmap => ((255.0 - luminance) / 255.0).clamp(0.0, 1.0),
    }
}
