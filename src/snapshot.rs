// snapshot.rs - Serializable design state for history and persistence layers

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mesher::{SpanList, validate_spans};
use crate::sampler::IngestParams;

/// `{style, params, resolution, spans}`: enough to replay or restore a design.
/// `params` are the ones that produced `spans`, not pending edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSnapshot {
    /// Presentation style name, opaque to the engine
    pub style: String,
    pub params: IngestParams,
    /// Side length of the grid the spans were meshed on
    pub resolution: usize,
    pub spans: SpanList,
}

impl DesignSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reject snapshots whose spans could not have been meshed from `params`
    pub fn validate(&self, merge_threshold: f32) -> Result<()> {
        self.params.validate()?;
        if self.resolution != self.params.resolution() {
            return Err(Error::invalid_param(
                "resolution",
                self.resolution,
                "does not match the snapshot's complexity",
            ));
        }
        validate_spans(&self.spans, self.resolution, merge_threshold)
    }
}
