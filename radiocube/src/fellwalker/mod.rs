//! FellWalker clump extraction.
//!
//! [`FellWalker`] validates and normalizes the input, estimates the noise RMS
//! when none is configured, runs a [`ClumpFinder`] and turns its label array
//! into a [`ClumpStructure`]. Finders may mark unusable pixels with a
//! sentinel label; it is mapped to background (0) before anything else sees
//! the labels.


mod config;
mod walker;

pub use config::FellWalkerConfig;
pub use walker::FellWalk;

use std::sync::Arc;

use ndarray::{ArrayD, ArrayViewD, Axis};
use tracing::{debug, info};

use crate::clumps::{build_structures, ClumpMap, PeakMap};
use crate::cube::CubeInput;
use crate::error::{Error, Result};
use crate::wcs::WorldCoordinates;

/// Clump-finding primitive driven by [`FellWalker`].
pub trait ClumpFinder: Send + Sync {
    /// Label the finder uses for pixels that belong to no clump.
    fn unusable_label(&self) -> i32 {
        -1
    }

    /// Labels the clumps of a 2D or 3D array, or `None` when it finds none.
    fn find_clumps(
        &self,
        data: ArrayViewD<f32>,
        rms: f32,
        config: &FellWalkerConfig,
    ) -> Option<ArrayD<i32>>;
}

/// Clump assignment array with its member lists and peaks.
#[derive(Debug, Clone)]
pub struct ClumpStructure {
    /// Clump labels from 1; background is 0.
    pub labels: ArrayD<i32>,
    pub clumps: ClumpMap,
    pub peaks: PeakMap,
    pub wcs: Option<Arc<dyn WorldCoordinates>>,
    pub unit: Option<String>,
}

impl ClumpStructure {
    /// Number of clumps, background excluded.
    pub fn clump_count(&self) -> usize {
        self.clumps.labels().filter(|&label| label != 0).count()
    }
}

#[derive(Debug, Clone)]
pub struct FellWalker<F: ClumpFinder = FellWalk> {
    config: FellWalkerConfig,
    finder: F,
}

impl FellWalker<FellWalk> {
    pub fn new(config: FellWalkerConfig) -> Result<Self> {
        Self::with_finder(config, FellWalk)
    }
}

impl<F: ClumpFinder> FellWalker<F> {
    pub fn with_finder(config: FellWalkerConfig, finder: F) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, finder })
    }

    pub fn config(&self) -> &FellWalkerConfig {
        &self.config
    }

    /// Finds clumps in a 2D image or 3D cube.
    ///
    /// Input up to rank 4 is accepted as long as dropping leading
    /// length-1 axes leaves rank 2 or 3. Fails with [`Error::NoClumps`] when
    /// the finder reports nothing or only background.
    pub fn run(&self, input: impl Into<CubeInput>) -> Result<ClumpStructure> {
        let cube = input.into().resolve();
        if cube.ndim() > 4 {
            return Err(Error::UnsupportedRank {
                operation: "FellWalker",
                expected: "at most 4",
                actual: cube.ndim(),
            });
        }

        let data = collapse_leading_singletons(cube.data.view());
        if !(2..=3).contains(&data.ndim()) {
            return Err(Error::UnsupportedRank {
                operation: "FellWalker",
                expected: "2 or 3 after dropping leading length-1 axes",
                actual: data.ndim(),
            });
        }

        let rms = match self.config.rms {
            Some(rms) => rms,
            None => {
                let estimated = crate::math::rms(cube.data.iter());
                info!(rms = estimated, "Estimated noise RMS");
                estimated
            }
        };

        let mut labels = self
            .finder
            .find_clumps(data.view(), rms, &self.config)
            .ok_or(Error::NoClumps)?;
        if labels.shape() != data.shape() {
            return Err(Error::ShapeMismatch {
                context: "clump finder output",
                expected: data.shape().to_vec(),
                actual: labels.shape().to_vec(),
            });
        }

        let sentinel = self.finder.unusable_label();
        labels.mapv_inplace(|label| if label == sentinel { 0 } else { label });
        if labels.iter().all(|&label| label == 0) {
            debug!("Clump finder output holds only background");
            return Err(Error::NoClumps);
        }

        let (clumps, peaks) = build_structures(data, labels.view())?;
        let structure = ClumpStructure {
            labels,
            clumps,
            peaks,
            wcs: cube.wcs,
            unit: cube.unit,
        };
        info!(clumps = structure.clump_count(), "FellWalker finished");
        Ok(structure)
    }
}

/// Drops leading length-1 axes while more than two axes remain.
fn collapse_leading_singletons(mut data: ArrayViewD<f32>) -> ArrayViewD<f32> {
    while data.ndim() > 2 && data.shape()[0] == 1 {
        data = data.index_axis_move(Axis(0), 0);
    }
    data
}
