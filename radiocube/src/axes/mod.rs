//! Index boxes, slabs and pixel ↔ world feature grids.
//!
//! Index vectors are in array order. Whenever a coordinate system is
//! involved the vector is reversed on the way in and out, because world
//! frames list axes in FITS order (fastest-varying array axis first).
//!
//! Bounds use the endpoint convention: a clamped component lies in
//! `[0, shape[i]]`, so it can serve directly as a half-open slab end.


use std::ops::Range;

use ndarray::{Array2, ArrayD, IxDyn};

use crate::error::{Error, Result};
use crate::wcs::WorldCoordinates;

/// Speed of light in km/s.
const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Clamp each component of `vector` into `[0, shape[i]]`.
///
/// Never fails; the result always has `shape.len()` components. Missing
/// components are treated as 0.
pub fn clamp_to_bounds(shape: &[usize], vector: &[i64]) -> Vec<usize> {
    shape
        .iter()
        .enumerate()
        .map(|(i, &bound)| {
            let v = vector.get(i).copied().unwrap_or(0);
            v.clamp(0, bound as i64) as usize
        })
        .collect()
}

/// One half-open range per axis, from `lower` (default all zeros) to `upper`
/// (default the full shape), after clamping. Inverted bounds give an empty range.
pub fn slab(shape: &[usize], lower: Option<&[i64]>, upper: Option<&[i64]>) -> Vec<Range<usize>> {
    let lower = match lower {
        Some(lower) => clamp_to_bounds(shape, lower),
        None => vec![0; shape.len()],
    };
    let upper = match upper {
        Some(upper) => clamp_to_bounds(shape, upper),
        None => shape.to_vec(),
    };
    lower
        .into_iter()
        .zip(upper)
        .map(|(start, end)| start..end.max(start))
        .collect()
}

/// Data slab for the box `lower..upper` plus the matching slab into a second
/// array (e.g. a kernel laid over the box).
///
/// Where the box leaves the data array the data slab is clamped, and the flux
/// slab is shifted inward by the amount cut off at the lower edge and
/// shortened by the amount cut at the upper edge, so both slabs keep the same
/// extent (as long as the flux array covers the requested box).
pub fn matching_slabs(
    data_shape: &[usize],
    flux_shape: &[usize],
    lower: &[i64],
    upper: &[i64],
) -> (Vec<Range<usize>>, Vec<Range<usize>>) {
    let data_slab = slab(data_shape, Some(lower), Some(upper));

    let mut flux_lower = vec![0i64; flux_shape.len()];
    let mut flux_upper: Vec<i64> = flux_shape.iter().map(|&s| s as i64).collect();
    for (i, range) in data_slab.iter().enumerate().take(flux_shape.len()) {
        let requested = lower.get(i).copied().unwrap_or(0);
        let cut_below = range.start as i64 - requested;
        flux_lower[i] = cut_below;
        flux_upper[i] = cut_below + range.len() as i64;
    }
    let flux_slab = slab(flux_shape, Some(&flux_lower), Some(&flux_upper));

    (data_slab, flux_slab)
}

/// Radio-convention velocities (km/s) for spectral channel indices.
///
/// `rest_frequency` (Hz) defaults to the one recorded in the coordinate system.
pub fn spectral_velocities(
    shape: &[usize],
    wcs: Option<&dyn WorldCoordinates>,
    channels: &[f64],
    rest_frequency: Option<f64>,
) -> Result<Vec<f64>> {
    let wcs = wcs.ok_or(Error::MissingWcs("spectral_velocities"))?;
    let spectral_axis = wcs
        .spectral_axis()
        .ok_or(Error::MissingWcsKeyword("spectral axis"))?;
    let rest = rest_frequency
        .or_else(|| wcs.rest_frequency())
        .ok_or(Error::MissingWcsKeyword("rest frequency"))?;

    let naxis = wcs.naxis();
    if shape.len() != naxis {
        return Err(Error::AxisCountMismatch {
            expected: naxis,
            actual: shape.len(),
        });
    }
    if spectral_axis >= naxis {
        return Err(Error::InvalidAxis {
            axis: spectral_axis,
            naxis,
        });
    }

    let mut pixel = vec![0.0f64; naxis];
    channels
        .iter()
        .map(|&channel| {
            pixel[spectral_axis] = channel;
            let world = wcs.pixel_to_world(&pixel)?;
            let frequency = *world.get(spectral_axis).ok_or(Error::AxisCountMismatch {
                expected: naxis,
                actual: world.len(),
            })?;
            Ok(SPEED_OF_LIGHT_KM_S * (rest - frequency) / rest)
        })
        .collect()
}

/// World extents of the box `lower..upper`, one `(lo, hi)` pair per array
/// axis, interleaved as `[lo0, hi0, lo1, hi1, ...]`.
pub fn axes_ranges(
    shape: &[usize],
    wcs: Option<&dyn WorldCoordinates>,
    lower: Option<&[i64]>,
    upper: Option<&[i64]>,
) -> Result<Vec<f64>> {
    let wcs = wcs.ok_or(Error::MissingWcs("axes_ranges"))?;

    let lower: Vec<f64> = match lower {
        Some(lower) => lower.iter().map(|&v| v as f64).collect(),
        None => vec![0.0; shape.len()],
    };
    let upper: Vec<f64> = match upper {
        Some(upper) => upper.iter().map(|&v| v as f64).collect(),
        None => shape.iter().map(|&v| v as f64).collect(),
    };

    let low_world = array_order_to_world(wcs, &lower)?;
    let up_world = array_order_to_world(wcs, &upper)?;

    Ok(low_world
        .into_iter()
        .zip(up_world)
        .flat_map(|(lo, hi)| [lo, hi])
        .collect())
}

/// Dense index grids over the slab, one array per axis (like `mgrid`).
pub fn index_mesh(
    shape: &[usize],
    lower: Option<&[i64]>,
    upper: Option<&[i64]>,
) -> Vec<ArrayD<usize>> {
    let ranges = slab(shape, lower, upper);
    let dims: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
    ranges
        .iter()
        .enumerate()
        .map(|(axis, range)| {
            let start = range.start;
            ArrayD::from_shape_fn(IxDyn(&dims), |idx| start + idx[axis])
        })
        .collect()
}

/// Indices of every cell in the slab as a `(ndim, n_cells)` feature matrix.
///
/// Rows are in world (reversed) axis order; columns follow row-major order
/// over the slab.
pub fn index_features(
    shape: &[usize],
    lower: Option<&[i64]>,
    upper: Option<&[i64]>,
) -> Array2<usize> {
    let mesh = index_mesh(shape, lower, upper);
    let ndim = shape.len();
    let cells = mesh.first().map_or(0, |m| m.len());

    let mut features = Array2::<usize>::zeros((ndim, cells));
    for (axis, grid) in mesh.iter().enumerate() {
        let mut row = features.row_mut(ndim - axis - 1);
        for (dst, &src) in row.iter_mut().zip(grid.iter()) {
            *dst = src;
        }
    }
    features
}

/// [`index_features`] mapped through the coordinate system; rows are world axes.
pub fn world_features(
    shape: &[usize],
    wcs: Option<&dyn WorldCoordinates>,
    lower: Option<&[i64]>,
    upper: Option<&[i64]>,
) -> Result<Array2<f64>> {
    let wcs = wcs.ok_or(Error::MissingWcs("world_features"))?;
    let features = index_features(shape, lower, upper);

    let mut world = Array2::<f64>::zeros(features.raw_dim());
    let mut pixel = vec![0.0f64; features.nrows()];
    for (column, mut out) in features.columns().into_iter().zip(world.columns_mut()) {
        for (p, &idx) in pixel.iter_mut().zip(column.iter()) {
            *p = idx as f64;
        }
        let values = wcs.pixel_to_world(&pixel)?;
        for (dst, v) in out.iter_mut().zip(values) {
            *dst = v;
        }
    }
    Ok(world)
}

/// Field of view `center ± window` (world units, FITS order) as a clamped
/// `(lower, upper)` index box in array order.
pub fn fov_to_index(
    shape: &[usize],
    center: &[f64],
    window: &[f64],
    wcs: Option<&dyn WorldCoordinates>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let wcs = wcs.ok_or(Error::MissingWcs("fov_to_index"))?;
    if center.len() != window.len() {
        return Err(Error::AxisCountMismatch {
            expected: center.len(),
            actual: window.len(),
        });
    }

    let low_corner: Vec<f64> = center.iter().zip(window).map(|(c, w)| c - w).collect();
    let high_corner: Vec<f64> = center.iter().zip(window).map(|(c, w)| c + w).collect();
    let ld = wcs.world_to_pixel(&low_corner)?;
    let lu = wcs.world_to_pixel(&high_corner)?;

    let (mut lower, mut upper): (Vec<i64>, Vec<i64>) = ld
        .iter()
        .zip(&lu)
        .map(|(a, b)| {
            let (a, b) = (a.round() as i64, b.round() as i64);
            (a.min(b), a.max(b))
        })
        .unzip();
    lower.reverse();
    upper.reverse();

    Ok((
        clamp_to_bounds(shape, &lower),
        clamp_to_bounds(shape, &upper),
    ))
}

/// Array-order pixel position → world values reported back in array order.
fn array_order_to_world(wcs: &dyn WorldCoordinates, position: &[f64]) -> Result<Vec<f64>> {
    let mut pixel = position.to_vec();
    pixel.reverse();
    let mut world = wcs.pixel_to_world(&pixel)?;
    world.reverse();
    Ok(world)
}
