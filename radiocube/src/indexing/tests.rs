use common::file_format::SerdeFormat;
use ndarray::{Array2, Array3, ArrayView2};

use super::*;
use crate::cube::DataCube;
use crate::testing::{init_tracing, synthetic_cube, Blob};
use crate::wcs::{LinearAxis, LinearWcs};

fn seeded_config() -> IndexingConfig {
    IndexingConfig {
        samples: 400,
        random_state: Some(11),
        ..IndexingConfig::default()
    }
}

fn two_line_cube() -> Array3<f32> {
    synthetic_cube(
        (32, 24, 24),
        &[
            Blob::new([6.0, 8.0, 8.0], [1.5, 2.5, 2.5], 10.0),
            Blob::new([22.0, 16.0, 15.0], [2.0, 3.0, 3.0], 8.0),
        ],
        0.1,
        5,
    )
}

fn cube_wcs() -> LinearWcs {
    LinearWcs::new(vec![
        LinearAxis::new("RA---SIN", 1.0, 10.0, -0.01),
        LinearAxis::new("DEC--SIN", 1.0, 20.0, 0.01),
        LinearAxis::new("FREQ", 1.0, 230.0e9, -1.0e6),
    ])
    .unwrap()
}

/// Labels every pixel above half the image maximum as region 1.
#[derive(Debug)]
struct HalfMax;

impl Segmenter for HalfMax {
    fn segment(&self, image: ArrayView2<f32>, _: &GmsParams) -> Result<Vec<Array2<i32>>> {
        let max = image.iter().copied().fold(0.0f32, f32::max);
        if max <= 0.0 {
            return Ok(Vec::new());
        }
        Ok(vec![image.mapv(|v| i32::from(v > 0.5 * max))])
    }
}

#[derive(Debug)]
struct Nothing;

impl Segmenter for Nothing {
    fn segment(&self, _: ArrayView2<f32>, _: &GmsParams) -> Result<Vec<Array2<i32>>> {
        Ok(Vec::new())
    }
}

#[derive(Debug)]
struct Broken;

impl Segmenter for Broken {
    fn segment(&self, _: ArrayView2<f32>, _: &GmsParams) -> Result<Vec<Array2<i32>>> {
        Err(Error::Segmentation("backend unavailable".into()))
    }
}

// ============================================================================
// Empty results
// ============================================================================

#[test]
fn test_all_empty_slices_return_only_the_cube() {
    init_tracing();
    let cube = Array3::<f32>::zeros((8, 6, 6)).into_dyn();
    let container = Indexing::new(seeded_config())
        .unwrap()
        .run(cube.clone())
        .unwrap();

    assert_eq!(container.images.len(), 1);
    assert!(container.tables.is_empty());
    let primary = container.primary().unwrap();
    assert_eq!(primary.data, ImageData::Cube(cube));
    assert!(primary.wcs().is_none());
}

#[test]
fn test_segmenter_without_regions_skips_every_slice() {
    let cube = two_line_cube().into_dyn();
    let container = Indexing::with_segmenter(seeded_config(), Nothing)
        .unwrap()
        .run(cube.clone())
        .unwrap();
    assert_eq!(container.images.len(), 1);
    assert!(container.tables.is_empty());
    assert_eq!(container.primary().unwrap().data, ImageData::Cube(cube));
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_container_layout_per_slice() {
    init_tracing();
    let container = Indexing::with_segmenter(seeded_config(), HalfMax)
        .unwrap()
        .run(two_line_cube().into_dyn())
        .unwrap();

    // Two lines, one layer each: cube + 2 × (projection + labels).
    assert_eq!(container.tables.len(), 2);
    assert_eq!(container.images.len(), 5);
    assert!(matches!(container.images[0].data, ImageData::Cube(_)));
    assert!(matches!(container.images[1].data, ImageData::Projection(_)));
    assert!(matches!(container.images[2].data, ImageData::Labels(_)));
    assert!(matches!(container.images[3].data, ImageData::Projection(_)));
    assert!(matches!(container.images[4].data, ImageData::Labels(_)));

    // Slices come out in spectral order: the first line sits near (8, 8).
    let first = &container.tables[0].records[0];
    assert!((first.centroid_y - 8.0).abs() < 1.0);
    assert!((first.centroid_x - 8.0).abs() < 1.0);
    let second = &container.tables[1].records[0];
    assert!((second.centroid_y - 16.0).abs() < 1.0);
    assert!((second.centroid_x - 15.0).abs() < 1.0);
}

#[test]
fn test_container_growth_with_builtin_segmenter() {
    let container = Indexing::new(seeded_config())
        .unwrap()
        .run(two_line_cube().into_dyn())
        .unwrap();

    assert!(!container.tables.is_empty());
    assert!(container.images.len() >= 1 + 2 * container.tables.len());
    assert!(container.tables.iter().all(|t| !t.is_empty()));
    for image in &container.images[1..] {
        assert_eq!(image.data.shape(), &[24, 24]);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let cube = two_line_cube().into_dyn();
    let sequential = Indexing::new(seeded_config())
        .unwrap()
        .run(cube.clone())
        .unwrap();
    let parallel = Indexing::new(IndexingConfig {
        parallel: true,
        ..seeded_config()
    })
    .unwrap()
    .run(cube)
    .unwrap();

    assert_eq!(sequential.tables, parallel.tables);
    assert_eq!(sequential.images.len(), parallel.images.len());
    for (a, b) in sequential.images.iter().zip(&parallel.images) {
        assert_eq!(a.data, b.data);
    }
}

// ============================================================================
// Coordinates
// ============================================================================

#[test]
fn test_wcs_is_reduced_for_2d_images() {
    let cube = DataCube::new(two_line_cube().into_dyn())
        .with_wcs(cube_wcs().into_shared())
        .with_unit("Jy/beam");
    let container = Indexing::with_segmenter(seeded_config(), HalfMax)
        .unwrap()
        .run(cube)
        .unwrap();

    let primary = container.primary().unwrap();
    assert_eq!(primary.wcs().map(|w| w.naxis()), Some(3));
    assert_eq!(primary.unit.as_deref(), Some("Jy/beam"));

    for image in &container.images[1..] {
        let wcs = image.wcs().unwrap();
        assert_eq!(wcs.naxis(), 2);
        assert_eq!(wcs.spectral_axis(), None);
    }

    for record in container.tables.iter().flat_map(|t| t.iter()) {
        let (lo, hi) = (record.freq_min.unwrap(), record.freq_max.unwrap());
        assert!(lo <= hi);
        assert!(hi <= 230.0e9);
    }
}

#[test]
fn test_records_without_wcs_have_no_frequencies() {
    let container = Indexing::with_segmenter(seeded_config(), HalfMax)
        .unwrap()
        .run(two_line_cube().into_dyn())
        .unwrap();
    for record in container.tables.iter().flat_map(|t| t.iter()) {
        assert_eq!(record.freq_min, None);
        assert_eq!(record.freq_max, None);
    }
}

#[test]
fn test_slice_frequencies_follow_channels() {
    let wcs = cube_wcs();
    let (lo, hi) = slice_frequencies(&wcs, &(2..5)).unwrap();
    assert_eq!(lo, 230.0e9 - 4.0e6);
    assert_eq!(hi, 230.0e9 - 2.0e6);
}

#[test]
fn test_slice_frequencies_stay_inside_last_slice() {
    let wcs = cube_wcs();
    let (lo, hi) = slice_frequencies(&wcs, &(30..32)).unwrap();
    assert_eq!(lo, 230.0e9 - 31.0e6);
    assert_eq!(hi, 230.0e9 - 30.0e6);

    let (lo, hi) = slice_frequencies(&wcs, &(7..8)).unwrap();
    assert_eq!(lo, hi);
    assert_eq!(lo, 230.0e9 - 7.0e6);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_rejects_non_cube_input() {
    let plane = Array2::<f32>::zeros((5, 5)).into_dyn();
    let err = Indexing::new(seeded_config()).unwrap().run(plane).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedRank {
            operation: "Indexing",
            actual: 2,
            ..
        }
    ));
}

#[test]
fn test_segmenter_errors_propagate() {
    let err = Indexing::with_segmenter(seeded_config(), Broken)
        .unwrap()
        .run(two_line_cube().into_dyn())
        .unwrap_err();
    assert!(matches!(err, Error::Segmentation(_)));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_default_config() {
    let config = IndexingConfig::default();
    assert_eq!(config.p, 0.05);
    assert_eq!(config.precision, 0.02);
    assert_eq!(config.samples, 1000);
    assert_eq!(config.random_state, None);
    assert!(!config.parallel);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_yaml_uses_option_names() {
    let config = IndexingConfig::from_text("P: 0.1\nRANDOM_STATE: 7\n", SerdeFormat::Yaml).unwrap();
    assert_eq!(config.p, 0.1);
    assert_eq!(config.random_state, Some(7));
    assert_eq!(config.samples, 1000);
}

#[test]
fn test_config_json_round_trip() {
    let config = seeded_config();
    let text = config.to_text(SerdeFormat::Json).unwrap();
    assert!(text.contains("\"SAMPLES\""));
    let back = IndexingConfig::from_text(&text, SerdeFormat::Json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_invalid_config_rejected() {
    assert!(matches!(
        IndexingConfig::from_text("{\"SAMPLES\": 0}", SerdeFormat::Json),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        IndexingConfig::from_text("P: [1, 2]", SerdeFormat::Yaml),
        Err(Error::InvalidConfig(_))
    ));
    let bad = IndexingConfig {
        precision: 1.5,
        ..IndexingConfig::default()
    };
    assert!(Indexing::new(bad).is_err());
}
