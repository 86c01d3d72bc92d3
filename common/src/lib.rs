pub mod file_format;
pub mod float_ext;
pub mod log_setup;

/// Tolerance of [`float_ext::FloatExt::approximately_eq`].
pub const EPSILON: f64 = 1e-6;
