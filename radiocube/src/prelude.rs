//! Commonly used types and traits.
//!
//! ```rust,ignore
//! use radiocube::prelude::*;
//! ```

// Inputs and outputs
pub use crate::{Container, CubeInput, DataCube, Error, Image, ImageData, Result};

// Coordinates
pub use crate::{LinearAxis, LinearWcs, WorldCoordinates};

// Indexing
pub use crate::{Indexing, IndexingConfig, Segmenter, ShapeTable};

// Clumps
pub use crate::{ClumpFinder, ClumpStructure, FellWalker, FellWalkerConfig};
