//! Synthetic cubes and tracing setup for unit tests.

use std::sync::Once;

use ndarray::Array3;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// One Gaussian emission blob in `(spectral, y, x)` pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Blob {
    pub center: [f32; 3],
    pub sigma: [f32; 3],
    pub amplitude: f32,
}

impl Blob {
    pub fn new(center: [f32; 3], sigma: [f32; 3], amplitude: f32) -> Self {
        Self {
            center,
            sigma,
            amplitude,
        }
    }

    fn value_at(&self, z: usize, y: usize, x: usize) -> f32 {
        let pos = [z as f32, y as f32, x as f32];
        let exponent: f32 = pos
            .iter()
            .zip(&self.center)
            .zip(&self.sigma)
            .map(|((p, c), s)| {
                let d = (p - c) / s;
                d * d
            })
            .sum();
        self.amplitude * (-0.5 * exponent).exp()
    }
}

/// Sum of `blobs` plus uniform noise in `[-noise, noise]` drawn from a seeded
/// generator.
pub(crate) fn synthetic_cube(
    shape: (usize, usize, usize),
    blobs: &[Blob],
    noise: f32,
    seed: u64,
) -> Array3<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array3::from_shape_fn(shape, |(z, y, x)| {
        let signal: f32 = blobs.iter().map(|b| b.value_at(z, y, x)).sum();
        let n = if noise > 0.0 {
            rng.random_range(-noise..noise)
        } else {
            0.0
        };
        signal + n
    })
}

/// Installs a test-writer subscriber once per test binary.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}
