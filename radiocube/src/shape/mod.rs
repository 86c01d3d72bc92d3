//! Position and extent descriptors for segmented regions.
//!
//! One [`ShapeRecord`] per labeled region per layer, built from intensity
//! moments of the projection over the region's pixels.


use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Descriptor of one region. Pixel positions are `(y, x)`, 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// Index of the label layer (scale) the region came from.
    pub scale: usize,
    pub label: i32,
    /// Pixel count.
    pub area: usize,
    /// Sum of finite values.
    pub flux: f64,
    pub peak: f32,
    pub peak_y: usize,
    pub peak_x: usize,
    /// Intensity-weighted centroid.
    pub centroid_y: f64,
    pub centroid_x: f64,
    /// Standard deviation along the major axis, pixels.
    pub major: f64,
    /// Standard deviation along the minor axis, pixels.
    pub minor: f64,
    /// Major axis angle from the x axis towards y, radians in `(-π/2, π/2]`.
    pub position_angle: f64,
    /// Inclusive bounding box.
    pub y_min: usize,
    pub y_max: usize,
    pub x_min: usize,
    pub x_max: usize,
    /// Spectral bounds of the slice the projection was stacked from, when
    /// the cube had a coordinate system.
    pub freq_min: Option<f64>,
    pub freq_max: Option<f64>,
}

/// Records for every region of every layer of one projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeTable {
    pub records: Vec<ShapeRecord>,
}

impl ShapeTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeRecord> {
        self.records.iter()
    }
}

/// Running sums for one region.
#[derive(Debug, Clone)]
struct RegionMoments {
    area: usize,
    flux: f64,
    peak: f32,
    peak_at: (usize, usize),
    bbox: [usize; 4],
    // Intensity-weighted sums: w, wy, wx, wyy, wxx, wxy.
    weighted: [f64; 6],
    // Unweighted sums with the same layout.
    uniform: [f64; 6],
}

impl RegionMoments {
    fn new(y: usize, x: usize) -> Self {
        Self {
            area: 0,
            flux: 0.0,
            peak: f32::NEG_INFINITY,
            peak_at: (y, x),
            bbox: [y, y, x, x],
            weighted: [0.0; 6],
            uniform: [0.0; 6],
        }
    }

    fn add(&mut self, y: usize, x: usize, value: f32) {
        self.area += 1;
        if value.is_finite() {
            self.flux += value as f64;
        }
        if value > self.peak {
            self.peak = value;
            self.peak_at = (y, x);
        }

        self.bbox[0] = self.bbox[0].min(y);
        self.bbox[1] = self.bbox[1].max(y);
        self.bbox[2] = self.bbox[2].min(x);
        self.bbox[3] = self.bbox[3].max(x);

        let weight = if value.is_finite() {
            (value as f64).max(0.0)
        } else {
            0.0
        };
        accumulate(&mut self.weighted, y as f64, x as f64, weight);
        accumulate(&mut self.uniform, y as f64, x as f64, 1.0);
    }

    fn into_record(
        self,
        scale: usize,
        label: i32,
        projection: &ArrayView2<f32>,
        freq: Option<(f64, f64)>,
    ) -> ShapeRecord {
        let sums = if self.weighted[0] > 0.0 {
            &self.weighted
        } else {
            &self.uniform
        };
        let w = sums[0];
        let cy = sums[1] / w;
        let cx = sums[2] / w;
        let mu_yy = (sums[3] / w - cy * cy).max(0.0);
        let mu_xx = (sums[4] / w - cx * cx).max(0.0);
        let mu_xy = sums[5] / w - cx * cy;

        let mean = 0.5 * (mu_xx + mu_yy);
        let spread = (0.25 * (mu_xx - mu_yy).powi(2) + mu_xy * mu_xy).sqrt();
        let major = (mean + spread).max(0.0).sqrt();
        let minor = (mean - spread).max(0.0).sqrt();
        let position_angle = 0.5 * (2.0 * mu_xy).atan2(mu_xx - mu_yy);

        let (peak_y, peak_x) = self.peak_at;
        ShapeRecord {
            scale,
            label,
            area: self.area,
            flux: self.flux,
            peak: projection[[peak_y, peak_x]],
            peak_y,
            peak_x,
            centroid_y: cy,
            centroid_x: cx,
            major,
            minor,
            position_angle,
            y_min: self.bbox[0],
            y_max: self.bbox[1],
            x_min: self.bbox[2],
            x_max: self.bbox[3],
            freq_min: freq.map(|(lo, _)| lo),
            freq_max: freq.map(|(_, hi)| hi),
        }
    }
}

#[inline]
fn accumulate(sums: &mut [f64; 6], y: f64, x: f64, w: f64) {
    sums[0] += w;
    sums[1] += w * y;
    sums[2] += w * x;
    sums[3] += w * y * y;
    sums[4] += w * x * x;
    sums[5] += w * x * y;
}

/// Measures every region (label > 0) of every layer over `projection`.
///
/// Records are ordered by layer, then by ascending label. `freq` is copied
/// into each record as `(freq_min, freq_max)`. An empty table means no layer
/// held a region.
pub fn measure_shape(
    projection: ArrayView2<f32>,
    layers: &[Array2<i32>],
    freq: Option<(f64, f64)>,
) -> Result<ShapeTable> {
    let mut records = Vec::new();

    for (scale, layer) in layers.iter().enumerate() {
        if layer.dim() != projection.dim() {
            return Err(Error::ShapeMismatch {
                context: "measure_shape",
                expected: projection.shape().to_vec(),
                actual: layer.shape().to_vec(),
            });
        }

        let mut regions: BTreeMap<i32, RegionMoments> = BTreeMap::new();
        for ((y, x), &label) in layer.indexed_iter() {
            if label <= 0 {
                continue;
            }
            regions
                .entry(label)
                .or_insert_with(|| RegionMoments::new(y, x))
                .add(y, x, projection[[y, x]]);
        }

        records.extend(
            regions
                .into_iter()
                .map(|(label, moments)| moments.into_record(scale, label, &projection, freq)),
        );
    }

    Ok(ShapeTable { records })
}
