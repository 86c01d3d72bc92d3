//! Gaussian multiscale segmentation.

use common::float_ext::FloatExt;
use ndarray::{Array2, ArrayView2};
use tracing::debug;

use super::labeling::{drop_small_regions, label_components};
use super::{GmsParams, Segmenter};
use crate::error::Result;
use crate::math::{gaussian_smooth, quantile_f32_mut};

/// Smallest smoothing scale in pixels.
const MIN_SIGMA: f32 = 0.5;

/// Largest smoothing scale as a fraction of the shorter image side.
const MAX_SCALE_FRACTION: f32 = 0.25;

/// Gaussian multiscale segmenter.
///
/// For every scale `sigma_min · 2^k` up to a quarter of the shorter side the
/// image is smoothed, thresholded at its `(1 - P)` quantile and split into
/// 8-connected regions. Regions smaller than `ceil(sigma_min²)` pixels are
/// dropped. Layers come out fine to coarse and only when non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gms;

impl Segmenter for Gms {
    fn segment(&self, image: ArrayView2<f32>, params: &GmsParams) -> Result<Vec<Array2<i32>>> {
        params.validate()?;

        let (height, width) = image.dim();
        if height == 0 || width == 0 {
            return Ok(Vec::new());
        }

        let clean = image.mapv(|v| v.finite_or(0.0));
        let sigmas = scales(height, width, params.precision);
        let min_pixels = (sigmas[0] * sigmas[0]).ceil() as usize;

        let mut layers = Vec::new();
        for &sigma in &sigmas {
            let smoothed = gaussian_smooth(clean.view(), sigma);
            let mut values: Vec<f32> = smoothed.iter().copied().collect();
            let threshold = quantile_f32_mut(&mut values, 1.0 - params.p);

            let mask = smoothed.mapv(|v| v > threshold);
            let (labels, found) = label_components(mask.view());
            let (labels, kept) = drop_small_regions(&labels, found, min_pixels);
            debug!(sigma, threshold, found, kept, "GMS scale");

            if kept > 0 {
                layers.push(labels);
            }
        }

        Ok(layers)
    }
}

/// Smoothing scales, doubling from `max(precision · side, 0.5)` while they
/// stay within a quarter of the shorter side. Always at least one scale.
pub(crate) fn scales(height: usize, width: usize, precision: f32) -> Vec<f32> {
    let side = height.min(width) as f32;
    let sigma_min = (precision * side).max(MIN_SIGMA);
    let sigma_max = MAX_SCALE_FRACTION * side;

    let mut sigmas = vec![sigma_min];
    let mut sigma = sigma_min * 2.0;
    while sigma <= sigma_max {
        sigmas.push(sigma);
        sigma *= 2.0;
    }
    sigmas
}
