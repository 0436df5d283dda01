use wasm_bindgen::prelude::*;

// ============================================================================
// MASSING ENGINE - Image -> height grid -> spans -> box massing -> OBJ
// ============================================================================

pub mod config;
pub mod encode;
pub mod error;
pub mod export;
pub mod grid;
pub mod ingest;
pub mod massing;
pub mod mesher;
pub mod sampler;
pub mod snapshot;
pub mod studio;

pub use config::StudioConfig;
pub use error::{Error, Result};
pub use export::{ExportDocument, MalformedPolicy, MeshInstance, MeshSource, export_obj};
pub use grid::HeightGrid;
pub use ingest::{IngestOutcome, IngestSession, Ingested};
pub use massing::{MassingMetrics, MassingParams};
pub use mesher::{DEFAULT_MERGE_THRESHOLD, MeshParams, Span, SpanList, mesh_rows, recompute, validate_spans};
pub use sampler::{IngestParams, SampleMode, sample_image};
pub use snapshot::DesignSnapshot;
pub use studio::Studio;

use encode::SpanEncoder;

/// Browser-facing handle over one studio session
#[wasm_bindgen]
pub struct MassingWorld {
    studio: Studio,
    encoder: SpanEncoder,
}

#[wasm_bindgen]
impl MassingWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(complexity: u32, threshold: u32, invert: bool, heightmap: bool) -> std::result::Result<MassingWorld, JsError> {
        let mut config = StudioConfig::default();
        config.ingest = IngestParams {
            complexity,
            threshold,
            invert,
            mode: if heightmap { SampleMode::Heightmap } else { SampleMode::Floorplan },
        };
        Ok(Self {
            studio: Studio::new(config)?,
            encoder: SpanEncoder::new(),
        })
    }

    /// Decode and mesh an encoded image. Returns the span count. On error the
    /// previous spans stay in place.
    pub fn ingest(&mut self, bytes: &[u8]) -> std::result::Result<usize, JsError> {
        let n = self.studio.ingest(bytes)?.len();
        self.encoder.encode(self.studio.spans());
        Ok(n)
    }

    pub fn set_merge_threshold(&mut self, threshold: f32) -> std::result::Result<usize, JsError> {
        let n = self.studio.set_mesh_params(MeshParams { merge_threshold: threshold })?.len();
        self.encoder.encode(self.studio.spans());
        Ok(n)
    }

    pub fn set_site(&mut self, site_width: f32, height_multiplier: f32) -> std::result::Result<(), JsError> {
        self.studio.set_massing_params(MassingParams { site_width, height_multiplier })?;
        Ok(())
    }

    /// Flat [row, start, width, height] quadruples
    pub fn spans(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.encoder.as_slice())
    }

    pub fn export_obj(&self) -> std::result::Result<String, JsError> {
        Ok(self.studio.export()?.text)
    }

    pub fn snapshot_json(&self, style: &str) -> std::result::Result<String, JsError> {
        Ok(self.studio.snapshot(style).to_json()?)
    }

    // Accessors for WASM
    pub fn spans_ptr(&self) -> *const f32 { self.encoder.ptr() }
    pub fn spans_len(&self) -> usize { self.encoder.len() }
    pub fn span_count(&self) -> usize { self.studio.spans().len() }
    pub fn resolution(&self) -> usize { self.studio.resolution() }
    pub fn footprint_area(&self) -> f32 { self.studio.metrics().footprint_area }
    pub fn max_height(&self) -> f32 { self.studio.metrics().max_height }
}
