// ingest.rs - Generation counter and asynchronous decode with a staleness guard
//
// Every ingest claims the next generation number up front. Off the browser,
// `IngestSession::ingest` runs the decode on tokio's blocking pool and only
// hands the result back if no newer ingest has been started in the meantime.
// Dropping the returned future abandons the wait.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::grid::HeightGrid;
use crate::mesher::SpanList;
use crate::sampler::IngestParams;

#[cfg(not(target_arch = "wasm32"))]
use {
    crate::error::{Error, Result},
    crate::mesher::{MeshParams, recompute},
    crate::sampler::sample_image,
    tracing::debug,
};

/// A completed, still-current ingest
#[derive(Debug, Clone)]
pub struct Ingested {
    pub generation: u64,
    pub params: IngestParams,
    pub grid: HeightGrid,
    pub spans: SpanList,
}

#[derive(Debug)]
pub enum IngestOutcome {
    Fresh(Ingested),
    /// Superseded by a newer ingest; the result was discarded
    Stale { generation: u64, latest: u64 },
}

impl IngestOutcome {
    pub fn fresh(self) -> Option<Ingested> {
        match self {
            IngestOutcome::Fresh(ingested) => Some(ingested),
            IngestOutcome::Stale { .. } => None,
        }
    }
}

/// Shared generation counter. Clones observe and advance the same counter.
#[derive(Debug, Clone, Default)]
pub struct IngestSession {
    latest: Arc<AtomicU64>,
}

impl IngestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently claimed generation (0 before the first ingest)
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest() == generation
    }

    /// Claim the next generation, superseding every ingest started before
    pub fn claim(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Start an ingest. Parameters are checked and the generation claimed
    /// before this returns, so a later call supersedes this one even if
    /// neither future has been polled yet.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn ingest(
        &self,
        bytes: Vec<u8>,
        params: IngestParams,
        mesh: MeshParams,
    ) -> impl Future<Output = Result<IngestOutcome>> + Send + 'static {
        let ticket = params
            .validate()
            .and_then(|_| mesh.validate())
            .map(|_| self.claim());
        let session = self.clone();

        async move {
            let generation = ticket?;
            debug!(generation, bytes = bytes.len(), "ingest started");

            let result = tokio::task::spawn_blocking(move || {
                let grid = sample_image(&bytes, &params)?;
                let spans = recompute(&grid, &mesh);
                Ok::<_, Error>((grid, spans))
            })
            .await
            .map_err(|e| Error::TaskAborted(e.to_string()))?;

            // Stale results are dropped whether they succeeded or not
            let latest = session.latest();
            if latest != generation {
                debug!(generation, latest, "discarding stale ingest");
                return Ok(IngestOutcome::Stale { generation, latest });
            }

            let (grid, spans) = result?;
            Ok(IngestOutcome::Fresh(Ingested { generation, params, grid, spans }))
        }
    }
}
