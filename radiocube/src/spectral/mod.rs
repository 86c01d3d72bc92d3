//! Spectral sketch and velocity stacking.
//!
//! The sketch is a cheap summary of where emission lives along the spectral
//! axis: a few random pixel spectra are denoised and accumulated, and every
//! contiguous run of channels with positive accumulated signal becomes one
//! candidate frequency slice.

#[cfg(test)]
mod tests;

use std::ops::Range;

use common::float_ext::FloatExt;
use ndarray::{s, Array1, Array2, ArrayView3, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::math::rms;

/// Accumulated denoised spectrum of `samples` random pixels and the slice
/// boundaries derived from it.
///
/// Pixels are drawn uniformly with replacement. A fixed `random_state` gives
/// identical output across runs; `None` seeds from OS entropy. Channel values
/// at or below the cube RMS (and non-finite values) are zeroed before they are
/// accumulated.
pub fn spectra_sketch(
    cube: ArrayView3<f32>,
    samples: usize,
    random_state: Option<u64>,
) -> (Array1<f32>, Vec<Range<usize>>) {
    let (channels, height, width) = cube.dim();
    let mut sketch = Array1::<f32>::zeros(channels);
    if channels == 0 || height == 0 || width == 0 {
        return (sketch, Vec::new());
    }

    let noise = rms(cube.iter());

    let mut rng: ChaCha8Rng = match random_state {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    for _ in 0..samples {
        let y = rng.random_range(0..height);
        let x = rng.random_range(0..width);
        let spectrum = cube.slice(s![.., y, x]);
        for (acc, &value) in sketch.iter_mut().zip(spectrum.iter()) {
            if value.is_finite() && value > noise {
                *acc += value;
            }
        }
    }

    let slices = positive_runs(sketch.as_slice().unwrap_or(&[]));
    (sketch, slices)
}

/// Maximal half-open runs of strictly positive values.
pub(crate) fn positive_runs(values: &[f32]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &v) in values.iter().enumerate() {
        match (v > 0.0, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..values.len());
    }
    runs
}

/// Sum of the channels in `slice`, giving a `(y, x)` projection.
///
/// NaN and infinite values contribute 0. The range is clamped to the cube;
/// an empty range yields a zero image.
pub fn vel_stacking(cube: ArrayView3<f32>, slice: Range<usize>) -> Array2<f32> {
    let (channels, height, width) = cube.dim();
    let end = slice.end.min(channels);
    let start = slice.start.min(end);

    let mut projection = Array2::<f32>::zeros((height, width));
    for plane in cube.slice(s![start..end, .., ..]).axis_iter(Axis(0)) {
        projection.zip_mut_with(&plane, |acc, &v| *acc += v.finite_or(0.0));
    }
    projection
}
