//! Indexing pipeline configuration.

use common::file_format::{self, SerdeFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::segmentation::GmsParams;

/// Options of one Indexing run. Field names on the wire keep the
/// upper-case option names (`P`, `PRECISION`, `SAMPLES`, `RANDOM_STATE`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Quantile threshold fraction for segmentation.
    #[serde(rename = "P")]
    pub p: f32,
    /// Minimum segmentation scale as a fraction of the shorter image side.
    #[serde(rename = "PRECISION")]
    pub precision: f32,
    /// Number of pixel spectra drawn for the spectral sketch.
    #[serde(rename = "SAMPLES")]
    pub samples: usize,
    /// Seed for the sketch; `None` draws from OS entropy.
    #[serde(rename = "RANDOM_STATE")]
    pub random_state: Option<u64>,
    /// Process slices on the rayon pool. Output order is unchanged.
    #[serde(rename = "PARALLEL")]
    pub parallel: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            p: 0.05,
            precision: 0.02,
            samples: 1000,
            random_state: None,
            parallel: false,
        }
    }
}

impl IndexingConfig {
    pub fn validate(&self) -> Result<()> {
        self.gms_params().validate()?;
        if self.samples == 0 {
            return Err(Error::InvalidConfig("SAMPLES must be positive".into()));
        }
        Ok(())
    }

    pub fn gms_params(&self) -> GmsParams {
        GmsParams {
            p: self.p,
            precision: self.precision,
        }
    }

    /// Parses and validates a YAML or JSON parameter set. Missing options
    /// take their defaults.
    pub fn from_text(text: &str, format: SerdeFormat) -> Result<Self> {
        let config: Self = file_format::deserialize(text, format)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_text(&self, format: SerdeFormat) -> Result<String> {
        Ok(file_format::serialize(self, format)?)
    }
}
