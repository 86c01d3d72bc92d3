//! Input cubes and their normalized form.

use std::sync::Arc;

use ndarray::{ArrayD, ArrayView3, ArrayViewD, Ix3};

use crate::error::{Error, Result};
use crate::wcs::WorldCoordinates;

/// An intensity array (rank 2 or 3, `(spectral, y, x)` for cubes) with an
/// optional coordinate frame and unit tag.
#[derive(Debug, Clone)]
pub struct DataCube {
    pub data: ArrayD<f32>,
    pub wcs: Option<Arc<dyn WorldCoordinates>>,
    pub unit: Option<String>,
}

impl DataCube {
    pub fn new(data: ArrayD<f32>) -> Self {
        Self {
            data,
            wcs: None,
            unit: None,
        }
    }

    pub fn with_wcs(mut self, wcs: Arc<dyn WorldCoordinates>) -> Self {
        self.wcs = Some(wcs);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    #[inline]
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    /// The data as a `(spectral, y, x)` view.
    pub fn view3(&self) -> Result<ArrayView3<'_, f32>> {
        self.data
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|_| Error::UnsupportedRank {
                operation: "cube view",
                expected: "3",
                actual: self.data.ndim(),
            })
    }

    pub fn wcs(&self) -> Option<&dyn WorldCoordinates> {
        self.wcs.as_deref()
    }
}

/// What callers may hand to an algorithm: a bare array or an annotated cube.
///
/// Resolved once at the algorithm boundary with [`CubeInput::resolve`].
#[derive(Debug, Clone)]
pub enum CubeInput {
    Raw(ArrayD<f32>),
    Annotated(DataCube),
}

impl CubeInput {
    pub fn resolve(self) -> DataCube {
        match self {
            CubeInput::Raw(data) => DataCube::new(data),
            CubeInput::Annotated(cube) => cube,
        }
    }
}

impl From<ArrayD<f32>> for CubeInput {
    fn from(data: ArrayD<f32>) -> Self {
        CubeInput::Raw(data)
    }
}

impl From<DataCube> for CubeInput {
    fn from(cube: DataCube) -> Self {
        CubeInput::Annotated(cube)
    }
}
