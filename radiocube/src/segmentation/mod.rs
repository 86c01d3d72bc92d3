//! Multiscale segmentation of 2D projections.
//!
//! [`Segmenter`] is the seam the Indexing pipeline calls once per stacked
//! slice. It returns zero or more label layers, one per detected scale.
//! [`Gms`] is the built-in Gaussian multiscale segmenter.


mod gms;
mod labeling;

pub use gms::Gms;
pub use labeling::{drop_small_regions, label_components};

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Segmentation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmsParams {
    /// Fraction of pixels kept above threshold; the threshold is the
    /// `(1 - p)` quantile of each smoothed image.
    #[serde(rename = "P")]
    pub p: f32,
    /// Smallest scale as a fraction of the shorter image side.
    #[serde(rename = "PRECISION")]
    pub precision: f32,
}

impl Default for GmsParams {
    fn default() -> Self {
        Self {
            p: 0.05,
            precision: 0.02,
        }
    }
}

impl GmsParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.p > 0.0 && self.p < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "P must be in (0, 1), got {}",
                self.p
            )));
        }
        if !(self.precision > 0.0 && self.precision <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "PRECISION must be in (0, 1], got {}",
                self.precision
            )));
        }
        Ok(())
    }
}

/// Splits a 2D image into labeled regions at one or more scales.
///
/// Each returned layer has the image's shape; 0 is background and regions
/// are labeled from 1. An empty vector means nothing was detected.
pub trait Segmenter: Send + Sync {
    fn segment(&self, image: ArrayView2<f32>, params: &GmsParams) -> Result<Vec<Array2<i32>>>;
}
