use std::f32::consts::FRAC_PI_4;

use common::file_format::{self, SerdeFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// FellWalker parameters. Thresholds are in units of the noise RMS.
///
/// Wire names follow the CUPID option names (`FWHMBEAM`, `VELORES`, `RMS`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FellWalkerConfig {
    /// Beam FWHM in pixels.
    #[serde(rename = "FWHMBEAM")]
    pub fwhm_beam: f32,
    /// Velocity resolution in channels.
    #[serde(rename = "VELORES")]
    pub velo_res: f32,
    /// Noise RMS; estimated from the data when unset.
    #[serde(rename = "RMS")]
    pub rms: Option<f32>,
    /// Pixels at or below `noise · rms` are unusable.
    #[serde(rename = "NOISE")]
    pub noise: f32,
    /// Minimum peak height above the noise level.
    #[serde(rename = "MINHEIGHT")]
    pub min_height: f32,
    /// Neighbouring clumps merge when the dip between them is below this.
    #[serde(rename = "MINDIP")]
    pub min_dip: f32,
    /// Minimum clump size in pixels; derived from the beam when unset.
    #[serde(rename = "MINPIX")]
    pub min_pix: Option<usize>,
    /// Search radius (pixels) for a higher pixel at a local maximum.
    #[serde(rename = "MAXJUMP")]
    pub max_jump: usize,
}

impl Default for FellWalkerConfig {
    fn default() -> Self {
        Self {
            fwhm_beam: 2.0,
            velo_res: 2.0,
            rms: None,
            noise: 2.0,
            min_height: 2.0,
            min_dip: 3.0,
            min_pix: None,
            max_jump: 4,
        }
    }
}

impl FellWalkerConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [("FWHMBEAM", self.fwhm_beam), ("VELORES", self.velo_res)];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("NOISE", self.noise),
            ("MINHEIGHT", self.min_height),
            ("MINDIP", self.min_dip),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        if let Some(rms) = self.rms {
            if !(rms.is_finite() && rms >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "RMS must be non-negative, got {rms}"
                )));
            }
        }
        Ok(())
    }

    /// Minimum clump size for data of rank `ndim`: `MINPIX` when set,
    /// otherwise the beam area (times the velocity resolution for cubes).
    pub fn min_pixels(&self, ndim: usize) -> usize {
        if let Some(min_pix) = self.min_pix {
            return min_pix.max(1);
        }
        let mut area = FRAC_PI_4 * self.fwhm_beam * self.fwhm_beam;
        if ndim == 3 {
            area *= self.velo_res;
        }
        (area.ceil() as usize).max(1)
    }

    pub fn from_text(text: &str, format: SerdeFormat) -> Result<Self> {
        let config: Self = file_format::deserialize(text, format)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_text(&self, format: SerdeFormat) -> Result<String> {
        Ok(file_format::serialize(self, format)?)
    }
}
