//! Separable Gaussian smoothing for 2D projections.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1};

/// Compute a normalized 1D Gaussian kernel.
///
/// Radius is `ceil(3 * sigma)`, length `2 * radius + 1`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    debug_assert!(sigma > 0.0, "Sigma must be positive");

    let radius = (3.0 * sigma).ceil() as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Smooth an image with a Gaussian of standard deviation `sigma` pixels.
///
/// Rows are convolved first, then columns. Borders use half-sample
/// reflection, so any kernel radius is valid for any image size.
pub fn gaussian_smooth(image: ArrayView2<f32>, sigma: f32) -> Array2<f32> {
    let kernel = gaussian_kernel_1d(sigma);
    let radius = kernel.len() / 2;

    let mut rows_done = Array2::<f32>::zeros(image.raw_dim());
    for (src, dst) in image.rows().into_iter().zip(rows_done.rows_mut()) {
        convolve_lane(src, dst, &kernel, radius);
    }

    let mut output = Array2::<f32>::zeros(image.raw_dim());
    for (src, dst) in rows_done.columns().into_iter().zip(output.columns_mut()) {
        convolve_lane(src, dst, &kernel, radius);
    }

    output
}

fn convolve_lane(
    input: ArrayView1<f32>,
    mut output: ArrayViewMut1<f32>,
    kernel: &[f32],
    radius: usize,
) {
    let len = input.len();
    for (i, out) in output.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        for (k, &w) in kernel.iter().enumerate() {
            let j = reflect_index(i as isize + k as isize - radius as isize, len);
            sum += input[j] * w;
        }
        *out = sum;
    }
}

/// Half-sample symmetric reflection: `d c b a | a b c d | d c b a`.
#[inline]
fn reflect_index(idx: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let m = idx.rem_euclid(period);
    if m < len as isize {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}
