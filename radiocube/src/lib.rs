//! Radiocube - region indexing and clump extraction for radio data cubes.
//!
//! Cubes are `(spectral, y, x)` arrays with an optional world coordinate
//! system. The library provides:
//! - Index box and world-coordinate helpers
//! - Clump structures (members and peaks) from label arrays
//! - Spectral sketching and velocity stacking
//! - The Indexing pipeline: per-slice multiscale segmentation and shape tables
//! - FellWalker clump finding
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use radiocube::prelude::*;
//!
//! let config = IndexingConfig {
//!     random_state: Some(42),
//!     ..IndexingConfig::default()
//! };
//! let container = Indexing::new(config)?.run(cube)?;
//!
//! println!("{} slices with regions", container.tables.len());
//! ```

pub mod axes;
pub mod clumps;
mod container;
mod cube;
mod error;
pub mod fellwalker;
pub mod indexing;
pub(crate) mod math;
pub mod segmentation;
pub mod shape;
pub mod spectral;
pub mod wcs;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude;

// ============================================================================
// Core types
// ============================================================================

pub use container::{Container, Image, ImageData};
pub use cube::{CubeInput, DataCube};
pub use error::{Error, Result};
pub use wcs::{LinearAxis, LinearWcs, WorldCoordinates};

// ============================================================================
// Clumps
// ============================================================================

pub use clumps::{build_structures, ClumpMap, Coord, PeakMap};
pub use fellwalker::{ClumpFinder, ClumpStructure, FellWalk, FellWalker, FellWalkerConfig};

// ============================================================================
// Indexing
// ============================================================================

pub use indexing::{run_indexing, Indexing, IndexingConfig};
pub use segmentation::{Gms, GmsParams, Segmenter};
pub use shape::{measure_shape, ShapeRecord, ShapeTable};
pub use spectral::{spectra_sketch, vel_stacking};
