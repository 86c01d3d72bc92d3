//! Error type shared by the analysis modules.

use common::file_format::SerdeFormatError;
use thiserror::Error;

/// Errors produced by cube analysis operations.
///
/// Precondition violations (`UnsupportedRank`, `ShapeMismatch`, ...) and
/// missing coordinate systems are both reported as values; nothing in the
/// crate retries.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{operation} supports rank {expected}, got rank {actual}")]
    UnsupportedRank {
        operation: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("A world coordinate system (WCS) is needed for {0}")]
    MissingWcs(&'static str),

    #[error("Coordinate system has {expected} axes, got {actual} values")]
    AxisCountMismatch { expected: usize, actual: usize },

    #[error("Axis {axis} is out of range for a {naxis}-axis coordinate system")]
    InvalidAxis { axis: usize, naxis: usize },

    #[error("Coordinate system has no {0}")]
    MissingWcsKeyword(&'static str),

    #[error("Clump finding produced no clumps")]
    NoClumps,

    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<SerdeFormatError> for Error {
    fn from(err: SerdeFormatError) -> Self {
        let detail = match &err {
            SerdeFormatError::Yaml(e) => e.to_string(),
            SerdeFormatError::Json(e) => e.to_string(),
        };
        Error::InvalidConfig(format!("{err}: {detail}"))
    }
}
