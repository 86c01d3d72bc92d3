//! Result container handed from the Indexing pipeline to its caller.

use std::sync::Arc;

use ndarray::{Array2, ArrayD};

use crate::shape::ShapeTable;
use crate::wcs::WorldCoordinates;

/// Pixel payload of one output image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// The input cube.
    Cube(ArrayD<f32>),
    /// A stacked 2D projection.
    Projection(Array2<f32>),
    /// A segmentation label layer.
    Labels(Array2<i32>),
}

impl ImageData {
    pub fn shape(&self) -> &[usize] {
        match self {
            ImageData::Cube(data) => data.shape(),
            ImageData::Projection(data) => data.shape(),
            ImageData::Labels(data) => data.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }
}

/// An output image with its coordinate frame and unit.
#[derive(Debug, Clone)]
pub struct Image {
    pub data: ImageData,
    pub wcs: Option<Arc<dyn WorldCoordinates>>,
    pub unit: Option<String>,
}

impl Image {
    pub fn new(data: ImageData) -> Self {
        Self {
            data,
            wcs: None,
            unit: None,
        }
    }

    pub fn wcs(&self) -> Option<&dyn WorldCoordinates> {
        self.wcs.as_deref()
    }
}

/// Images and shape tables produced by one pipeline run.
///
/// `images[0]` is the input cube; after it come, per non-empty slice, the
/// stacked projection followed by its label layers. `tables` holds one
/// table per non-empty slice.
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub images: Vec<Image>,
    pub tables: Vec<ShapeTable>,
}

impl Container {
    /// The primary image (the input cube).
    pub fn primary(&self) -> Option<&Image> {
        self.images.first()
    }
}
