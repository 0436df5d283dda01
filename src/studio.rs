// studio.rs - Explicit context object for one design session
//
// Holds configuration, the ingest generation counter, and the currently
// displayed grid and spans. State is only replaced by a complete, successful
// ingest of the latest generation; failed or superseded ingests leave the
// previous geometry untouched.

use tracing::{debug, info};

use crate::config::StudioConfig;
use crate::error::Result;
use crate::export::{ExportDocument, MeshInstance, export_obj};
use crate::grid::HeightGrid;
use crate::ingest::{IngestSession, Ingested};
use crate::massing::{MassingMetrics, MassingParams, build_instances};
use crate::mesher::{MeshParams, Span, SpanList, recompute};
use crate::sampler::{IngestParams, sample_image};
use crate::snapshot::DesignSnapshot;

#[cfg(not(target_arch = "wasm32"))]
use crate::ingest::IngestOutcome;

/// Parameters and grid size behind the spans on display
#[derive(Debug, Clone, Copy, PartialEq)]
struct Displayed {
    params: IngestParams,
    resolution: usize,
}

#[derive(Debug)]
pub struct Studio {
    config: StudioConfig,
    session: IngestSession,
    grid: Option<HeightGrid>,
    spans: SpanList,
    displayed: Option<Displayed>,
}

impl Studio {
    pub fn new(config: StudioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: IngestSession::new(),
            grid: None,
            spans: Vec::new(),
            displayed: None,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn session(&self) -> &IngestSession {
        &self.session
    }

    pub fn grid(&self) -> Option<&HeightGrid> {
        self.grid.as_ref()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Side length of the grid behind the displayed spans
    pub fn resolution(&self) -> usize {
        self.displayed
            .map_or_else(|| self.config.ingest.resolution(), |d| d.resolution)
    }

    /// Parameters that produced the displayed spans
    pub fn displayed_params(&self) -> IngestParams {
        self.displayed.map_or(self.config.ingest, |d| d.params)
    }

    /// Sample and mesh `bytes` with the current parameters. Supersedes any
    /// ingest still in flight.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<&[Span]> {
        let generation = self.session.claim();
        let params = self.config.ingest;
        let grid = sample_image(bytes, &params)?;
        let spans = recompute(&grid, &self.config.mesh);
        self.commit(Ingested { generation, params, grid, spans });
        Ok(&self.spans)
    }

    /// Start a background ingest with the current parameters. Hand a fresh
    /// result to `commit`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn ingest_async(&self, bytes: Vec<u8>) -> impl Future<Output = Result<IngestOutcome>> + Send + 'static {
        self.session.ingest(bytes, self.config.ingest, self.config.mesh)
    }

    /// Install a finished ingest. Returns false, leaving state untouched, if
    /// a newer ingest has been started since.
    pub fn commit(&mut self, ingested: Ingested) -> bool {
        if !self.session.is_current(ingested.generation) {
            debug!(generation = ingested.generation, latest = self.session.latest(), "refusing stale commit");
            return false;
        }
        info!(
            generation = ingested.generation,
            resolution = ingested.grid.resolution(),
            spans = ingested.spans.len(),
            "ingest committed"
        );
        self.displayed = Some(Displayed {
            params: ingested.params,
            resolution: ingested.grid.resolution(),
        });
        self.grid = Some(ingested.grid);
        self.spans = ingested.spans;
        true
    }

    /// New sampling parameters apply to the next ingest
    pub fn set_ingest_params(&mut self, params: IngestParams) -> Result<()> {
        params.validate()?;
        self.config.ingest = params;
        Ok(())
    }

    /// Change mesh parameters and re-mesh the held grid
    pub fn set_mesh_params(&mut self, params: MeshParams) -> Result<&[Span]> {
        params.validate()?;
        self.config.mesh = params;
        self.recompute();
        Ok(&self.spans)
    }

    pub fn set_massing_params(&mut self, params: MassingParams) -> Result<()> {
        params.validate()?;
        self.config.massing = params;
        Ok(())
    }

    /// Re-run the mesher over the held grid. No-op before the first ingest.
    pub fn recompute(&mut self) -> &[Span] {
        if let Some(grid) = &self.grid {
            self.spans = recompute(grid, &self.config.mesh);
        }
        &self.spans
    }

    pub fn instances(&self) -> Vec<MeshInstance> {
        build_instances(&self.spans, self.resolution(), &self.config.massing)
    }

    pub fn metrics(&self) -> MassingMetrics {
        MassingMetrics::from_spans(&self.spans, self.resolution(), &self.config.massing)
    }

    pub fn export(&self) -> Result<ExportDocument> {
        export_obj(&self.instances(), self.config.export.policy)
    }

    pub fn snapshot(&self, style: impl Into<String>) -> DesignSnapshot {
        DesignSnapshot {
            style: style.into(),
            params: self.displayed_params(),
            resolution: self.resolution(),
            spans: self.spans.clone(),
        }
    }

    /// Restore spans and parameters from a history entry. The snapshot is
    /// checked against the current merge threshold before anything changes.
    /// The grid is not part of a snapshot, so it is dropped, and any ingest
    /// still in flight is superseded.
    pub fn restore(&mut self, snapshot: &DesignSnapshot) -> Result<()> {
        snapshot.validate(self.config.mesh.merge_threshold)?;
        self.session.claim();
        self.config.ingest = snapshot.params;
        self.displayed = Some(Displayed {
            params: snapshot.params,
            resolution: snapshot.resolution,
        });
        self.spans = snapshot.spans.clone();
        self.grid = None;
        Ok(())
    }
}
