//! Indexing pipeline: spectral sketch, then per slice stack, segment and
//! measure, collecting everything into a [`Container`].

#[cfg(test)]
mod tests;

mod config;

pub use config::IndexingConfig;

use std::ops::Range;

use ndarray::{Array2, ArrayView3, Ix3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::container::{Container, Image, ImageData};
use crate::cube::CubeInput;
use crate::error::{Error, Result};
use crate::segmentation::{Gms, GmsParams, Segmenter};
use crate::shape::{measure_shape, ShapeTable};
use crate::spectral::{spectra_sketch, vel_stacking};
use crate::wcs::WorldCoordinates;

/// World axis of the spectral dimension for a `(spectral, y, x)` cube.
const SPECTRAL_WORLD_AXIS: usize = 2;

/// Output of one non-empty slice.
#[derive(Debug)]
struct SliceResult {
    projection: Array2<f32>,
    layers: Vec<Array2<i32>>,
    table: ShapeTable,
}

/// Region indexing over the spectral slices of a cube.
#[derive(Debug, Clone)]
pub struct Indexing<S: Segmenter = Gms> {
    config: IndexingConfig,
    segmenter: S,
}

impl Indexing<Gms> {
    pub fn new(config: IndexingConfig) -> Result<Self> {
        Self::with_segmenter(config, Gms)
    }
}

impl<S: Segmenter> Indexing<S> {
    pub fn with_segmenter(config: IndexingConfig, segmenter: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, segmenter })
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.config
    }

    /// Runs the pipeline on a rank-3 `(spectral, y, x)` cube.
    ///
    /// `images[0]` of the result is the input cube. Each slice whose shape
    /// table is non-empty appends its projection, then its label layers, and
    /// its table; other slices contribute nothing. With a coordinate system
    /// every appended 2D image carries it with the spectral axis dropped.
    pub fn run(&self, input: impl Into<CubeInput>) -> Result<Container> {
        let cube = input.into().resolve();
        let data = cube
            .data
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|_| Error::UnsupportedRank {
                operation: "Indexing",
                expected: "3",
                actual: cube.ndim(),
            })?;
        let wcs = cube.wcs();

        let (_, slices) = spectra_sketch(data, self.config.samples, self.config.random_state);
        info!(
            shape = ?cube.shape(),
            slices = slices.len(),
            "Spectral sketch done"
        );

        let params = self.config.gms_params();
        let results: Vec<Option<SliceResult>> = if self.config.parallel {
            slices
                .par_iter()
                .map(|slice| self.process_slice(data, slice.clone(), &params, wcs))
                .collect::<Result<_>>()?
        } else {
            slices
                .iter()
                .map(|slice| self.process_slice(data, slice.clone(), &params, wcs))
                .collect::<Result<_>>()?
        };

        let reduced = match wcs {
            Some(wcs) => Some(wcs.drop_axis(SPECTRAL_WORLD_AXIS)?),
            None => None,
        };

        let mut container = Container::default();
        for result in results.into_iter().flatten() {
            container.images.push(Image {
                data: ImageData::Projection(result.projection),
                wcs: reduced.clone(),
                unit: cube.unit.clone(),
            });
            container
                .images
                .extend(result.layers.into_iter().map(|layer| Image {
                    data: ImageData::Labels(layer),
                    wcs: reduced.clone(),
                    unit: None,
                }));
            container.tables.push(result.table);
        }

        container.images.insert(
            0,
            Image {
                data: ImageData::Cube(cube.data),
                wcs: cube.wcs,
                unit: cube.unit,
            },
        );

        info!(
            tables = container.tables.len(),
            images = container.images.len(),
            "Indexing finished"
        );
        Ok(container)
    }

    fn process_slice(
        &self,
        data: ArrayView3<f32>,
        slice: Range<usize>,
        params: &GmsParams,
        wcs: Option<&dyn WorldCoordinates>,
    ) -> Result<Option<SliceResult>> {
        let projection = vel_stacking(data, slice.clone());
        let layers = self.segmenter.segment(projection.view(), params)?;

        let freq = wcs
            .map(|wcs| slice_frequencies(wcs, &slice))
            .transpose()?;
        let table = measure_shape(projection.view(), &layers, freq)?;

        if table.is_empty() {
            debug!(?slice, "Slice has no regions, skipped");
            return Ok(None);
        }
        debug!(?slice, layers = layers.len(), regions = table.len(), "Slice indexed");

        Ok(Some(SliceResult {
            projection,
            layers,
            table,
        }))
    }
}

/// Spectral world values at the first and last channel of `slice`, ordered
/// low to high.
fn slice_frequencies(wcs: &dyn WorldCoordinates, slice: &Range<usize>) -> Result<(f64, f64)> {
    let naxis = wcs.naxis();
    if naxis <= SPECTRAL_WORLD_AXIS {
        return Err(Error::InvalidAxis {
            axis: SPECTRAL_WORLD_AXIS,
            naxis,
        });
    }

    let frequency_at = |channel: usize| -> Result<f64> {
        let mut pixel = vec![0.0f64; naxis];
        pixel[SPECTRAL_WORLD_AXIS] = channel as f64;
        let world = wcs.pixel_to_world(&pixel)?;
        world
            .get(SPECTRAL_WORLD_AXIS)
            .copied()
            .ok_or(Error::AxisCountMismatch {
                expected: naxis,
                actual: world.len(),
            })
    };

    let first = frequency_at(slice.start)?;
    let last = frequency_at(slice.end.saturating_sub(1).max(slice.start))?;

    Ok((first.min(last), first.max(last)))
}

/// Convenience wrapper: [`Indexing::run`] with the built-in segmenter.
pub fn run_indexing(input: impl Into<CubeInput>, config: IndexingConfig) -> Result<Container> {
    Indexing::new(config)?.run(input)
}
