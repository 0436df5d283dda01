// config.rs - Studio configuration (TOML)
//
// Every section is optional in the file; missing keys fall back to defaults.
//
//   [ingest]
//   complexity = 12
//   threshold = 140
//   mode = "heightmap"
//
//   [massing]
//   site_width = 40.0
//
//   [export]
//   policy = "truncate"

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::MalformedPolicy;
use crate::massing::MassingParams;
use crate::mesher::MeshParams;
use crate::sampler::IngestParams;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub policy: MalformedPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub ingest: IngestParams,
    pub mesh: MeshParams,
    pub massing: MassingParams,
    pub export: ExportConfig,
}

impl StudioConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.ingest.validate()?;
        self.mesh.validate()?;
        self.massing.validate()
    }
}
