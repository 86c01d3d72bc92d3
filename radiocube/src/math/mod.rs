//! Numeric helpers shared by the analysis stages.

pub(crate) mod gaussian;
pub(crate) mod statistics;
pub(crate) mod union_find;

pub use gaussian::{gaussian_kernel_1d, gaussian_smooth};
pub use statistics::{quantile_f32_mut, rms};
