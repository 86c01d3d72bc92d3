use ndarray::{Array3, Axis};

use super::*;
use crate::testing::{synthetic_cube, Blob};

fn two_line_cube() -> Array3<f32> {
    synthetic_cube(
        (40, 16, 16),
        &[
            Blob::new([8.0, 8.0, 8.0], [1.5, 4.0, 4.0], 10.0),
            Blob::new([28.0, 7.0, 9.0], [2.0, 4.0, 4.0], 8.0),
        ],
        0.2,
        7,
    )
}

#[test]
fn test_positive_runs() {
    let values = [0.0, 1.0, 2.0, 0.0, 0.0, 3.0, -1.0, 4.0, 5.0];
    assert_eq!(positive_runs(&values), vec![1..3, 5..6, 7..9]);
    assert!(positive_runs(&[0.0, -1.0]).is_empty());
    assert!(positive_runs(&[]).is_empty());
}

#[test]
fn test_sketch_is_reproducible_with_seed() {
    let cube = two_line_cube();
    let (sketch_a, slices_a) = spectra_sketch(cube.view(), 200, Some(42));
    let (sketch_b, slices_b) = spectra_sketch(cube.view(), 200, Some(42));
    assert_eq!(slices_a, slices_b);
    assert_eq!(sketch_a, sketch_b);
}

#[test]
fn test_sketch_separates_emission_lines() {
    let cube = two_line_cube();
    let (sketch, slices) = spectra_sketch(cube.view(), 500, Some(3));
    assert_eq!(sketch.len(), 40);
    assert_eq!(slices.len(), 2, "slices: {slices:?}");
    assert!(slices[0].contains(&8));
    assert!(slices[1].contains(&28));
    assert!(slices[0].end <= slices[1].start);
}

#[test]
fn test_sketch_of_noise_below_rms_is_empty() {
    let cube = Array3::<f32>::from_elem((6, 4, 4), 1.0);
    let (sketch, slices) = spectra_sketch(cube.view(), 50, Some(1));
    assert!(sketch.iter().all(|&v| v == 0.0));
    assert!(slices.is_empty());
}

#[test]
fn test_sketch_of_empty_plane() {
    let cube = Array3::<f32>::zeros((5, 0, 3));
    let (sketch, slices) = spectra_sketch(cube.view(), 10, Some(1));
    assert_eq!(sketch.len(), 5);
    assert!(slices.is_empty());
}

#[test]
fn test_vel_stacking_sums_channels() {
    let cube = Array3::from_shape_fn((4, 2, 3), |(z, y, x)| (z * 100 + y * 10 + x) as f32);
    let projection = vel_stacking(cube.view(), 1..3);
    assert_eq!(projection.dim(), (2, 3));
    let expected = cube.slice(s![1..3, .., ..]).sum_axis(Axis(0));
    assert_eq!(projection, expected);
}

#[test]
fn test_vel_stacking_ignores_nan() {
    let mut cube = Array3::<f32>::ones((3, 2, 2));
    cube[[1, 0, 0]] = f32::NAN;
    let projection = vel_stacking(cube.view(), 0..3);
    assert_eq!(projection[[0, 0]], 2.0);
    assert_eq!(projection[[1, 1]], 3.0);
}

#[test]
fn test_vel_stacking_clamps_range() {
    let cube = Array3::<f32>::ones((3, 2, 2));
    assert_eq!(vel_stacking(cube.view(), 2..10)[[0, 0]], 1.0);
    let empty = vel_stacking(cube.view(), 5..9);
    assert_eq!(empty.dim(), (2, 2));
    assert!(empty.iter().all(|&v| v == 0.0));
}
