//! World coordinate system service.
//!
//! Pixel and world vectors here are in FITS axis order, which is the reverse
//! of array index order: for a `(spectral, y, x)` cube the world vector is
//! `(x, y, spectral)`. Pixel values are 0-based.
//!
//! Full celestial projections are outside this crate. [`WorldCoordinates`] is
//! the seam through which callers inject one; [`LinearWcs`] covers linear
//! axes (and is what the tests use).


use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pixel ↔ world conversion for one coordinate frame.
pub trait WorldCoordinates: Debug + Send + Sync {
    /// Number of world (and pixel) axes.
    fn naxis(&self) -> usize;

    /// Converts one 0-based pixel position to world coordinates.
    fn pixel_to_world(&self, pixel: &[f64]) -> Result<Vec<f64>>;

    /// Converts one world position to 0-based (fractional) pixel coordinates.
    fn world_to_pixel(&self, world: &[f64]) -> Result<Vec<f64>>;

    /// Returns the frame with world axis `axis` removed.
    fn drop_axis(&self, axis: usize) -> Result<Arc<dyn WorldCoordinates>>;

    /// World axis index of the spectral (frequency) axis, if any.
    fn spectral_axis(&self) -> Option<usize>;

    /// Rest frequency in Hz, if the frame carries one.
    fn rest_frequency(&self) -> Option<f64>;
}

/// One linear world axis, FITS style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearAxis {
    /// Axis type, e.g. `RA---SIN`, `DEC--SIN`, `FREQ`.
    pub ctype: String,
    /// Reference pixel (1-based, as in FITS headers).
    pub crpix: f64,
    /// World value at the reference pixel.
    pub crval: f64,
    /// World increment per pixel.
    pub cdelt: f64,
}

impl LinearAxis {
    pub fn new(ctype: impl Into<String>, crpix: f64, crval: f64, cdelt: f64) -> Self {
        Self {
            ctype: ctype.into(),
            crpix,
            crval,
            cdelt,
        }
    }

    #[inline]
    fn to_world(&self, pixel: f64) -> f64 {
        self.crval + self.cdelt * (pixel + 1.0 - self.crpix)
    }

    #[inline]
    fn to_pixel(&self, world: f64) -> f64 {
        (world - self.crval) / self.cdelt + self.crpix - 1.0
    }

    fn is_spectral(&self) -> bool {
        self.ctype.to_ascii_uppercase().starts_with("FREQ")
    }
}

/// Linear coordinate frame: each world axis depends only on its own pixel axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWcs {
    axes: Vec<LinearAxis>,
    rest_frequency: Option<f64>,
}

impl LinearWcs {
    /// Builds a frame from axes in FITS order.
    ///
    /// Fails if any axis has a zero increment, since it could not be inverted.
    pub fn new(axes: Vec<LinearAxis>) -> Result<Self> {
        if let Some(axis) = axes.iter().position(|a| a.cdelt == 0.0 || !a.cdelt.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "axis {} ({}) has a non-invertible increment",
                axis, axes[axis].ctype
            )));
        }
        Ok(Self {
            axes,
            rest_frequency: None,
        })
    }

    pub fn with_rest_frequency(mut self, hz: f64) -> Self {
        self.rest_frequency = Some(hz);
        self
    }

    pub fn axes(&self) -> &[LinearAxis] {
        &self.axes
    }

    pub fn into_shared(self) -> Arc<dyn WorldCoordinates> {
        Arc::new(self)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.axes.len() {
            return Err(Error::AxisCountMismatch {
                expected: self.axes.len(),
                actual: len,
            });
        }
        Ok(())
    }
}

impl WorldCoordinates for LinearWcs {
    fn naxis(&self) -> usize {
        self.axes.len()
    }

    fn pixel_to_world(&self, pixel: &[f64]) -> Result<Vec<f64>> {
        self.check_len(pixel.len())?;
        Ok(self
            .axes
            .iter()
            .zip(pixel)
            .map(|(axis, &p)| axis.to_world(p))
            .collect())
    }

    fn world_to_pixel(&self, world: &[f64]) -> Result<Vec<f64>> {
        self.check_len(world.len())?;
        Ok(self
            .axes
            .iter()
            .zip(world)
            .map(|(axis, &w)| axis.to_pixel(w))
            .collect())
    }

    fn drop_axis(&self, axis: usize) -> Result<Arc<dyn WorldCoordinates>> {
        if axis >= self.axes.len() {
            return Err(Error::InvalidAxis {
                axis,
                naxis: self.axes.len(),
            });
        }
        let mut reduced = self.clone();
        reduced.axes.remove(axis);
        Ok(Arc::new(reduced))
    }

    fn spectral_axis(&self) -> Option<usize> {
        self.axes.iter().position(LinearAxis::is_spectral)
    }

    fn rest_frequency(&self) -> Option<f64> {
        self.rest_frequency
    }
}
