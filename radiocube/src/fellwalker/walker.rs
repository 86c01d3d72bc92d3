//! Built-in FellWalker clump finder.
//!
//! Every usable pixel starts a walk that climbs by steepest ascent until it
//! reaches an already labeled pixel or a peak. Peaks open new clumps. Clumps
//! separated by a shallow dip are then merged, and clumps that are too small
//! or too faint are discarded.

use hashbrown::HashMap;
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use smallvec::SmallVec;
use tracing::debug;

use super::{ClumpFinder, FellWalkerConfig};
use crate::math::union_find::UnionFind;

const UNASSIGNED: i32 = 0;

/// Steepest-ascent clump finder for 2D images and 3D cubes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FellWalk;

impl ClumpFinder for FellWalk {
    fn find_clumps(
        &self,
        data: ArrayViewD<f32>,
        rms: f32,
        config: &FellWalkerConfig,
    ) -> Option<ArrayD<i32>> {
        let unusable = self.unusable_label();
        let grid = Grid::new(data.shape());
        let values: Vec<f32> = data.iter().copied().collect();
        let noise_level = config.noise * rms;
        let is_usable = |v: f32| v.is_finite() && v > noise_level;

        let mut assigned: Vec<i32> = values
            .iter()
            .map(|&v| if is_usable(v) { UNASSIGNED } else { unusable })
            .collect();

        // Label 0 of the forest is unused so ids equal labels.
        let mut forest = UnionFind::new(1);
        let mut peak_values: Vec<f32> = vec![f32::NEG_INFINITY];

        let mut path = Vec::new();
        for start in 0..values.len() {
            if assigned[start] != UNASSIGNED {
                continue;
            }

            path.clear();
            path.push(start);
            let mut current = start;
            let label = loop {
                if assigned[current] > 0 {
                    break assigned[current];
                }
                let next = grid
                    .steepest_ascent(current, &values, &is_usable)
                    .or_else(|| grid.jump(current, config.max_jump, &values, &is_usable));
                match next {
                    Some(next) => {
                        current = next;
                        path.push(next);
                    }
                    None => {
                        let label = forest.make_set() as i32;
                        peak_values.push(values[current]);
                        break label;
                    }
                }
            };

            for &idx in &path {
                assigned[idx] = label;
            }
        }

        let found = forest.len() - 1;
        if found == 0 {
            return None;
        }

        merge_shallow_dips(
            &grid,
            &values,
            &assigned,
            &mut forest,
            &mut peak_values,
            config.min_dip * rms,
        );

        let min_pixels = config.min_pixels(grid.ndim());
        let min_peak = noise_level + config.min_height * rms;

        let mut sizes = vec![0usize; forest.len()];
        for label in assigned.iter_mut().filter(|l| **l > 0) {
            *label = forest.find(*label as usize) as i32;
            sizes[*label as usize] += 1;
        }

        let mut final_labels: HashMap<i32, i32> = HashMap::new();
        let mut kept = 0;
        for label in assigned.iter_mut() {
            if *label <= 0 {
                *label = unusable;
                continue;
            }
            let root = *label as usize;
            if sizes[root] < min_pixels || peak_values[root] < min_peak {
                *label = unusable;
                continue;
            }
            *label = *final_labels.entry(*label).or_insert_with(|| {
                kept += 1;
                kept
            });
        }

        debug!(found, kept, min_pixels, "FellWalk finished");
        if kept == 0 {
            return None;
        }
        ArrayD::from_shape_vec(IxDyn(grid.shape()), assigned).ok()
    }
}

/// Merges neighbouring clumps whose dip below the lower peak is less than
/// `min_dip`. Pairs are visited from the highest col down.
fn merge_shallow_dips(
    grid: &Grid,
    values: &[f32],
    assigned: &[i32],
    forest: &mut UnionFind,
    peak_values: &mut [f32],
    min_dip: f32,
) {
    let mut cols: HashMap<(i32, i32), f32> = HashMap::new();
    for (idx, &a) in assigned.iter().enumerate() {
        if a <= 0 {
            continue;
        }
        for n in grid.neighbours(idx) {
            let b = assigned[n];
            if b <= 0 || b == a {
                continue;
            }
            let key = (a.min(b), a.max(b));
            let saddle = values[idx].min(values[n]);
            let col = cols.entry(key).or_insert(f32::NEG_INFINITY);
            *col = col.max(saddle);
        }
    }

    let mut pairs: Vec<((i32, i32), f32)> = cols.into_iter().collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    for ((a, b), col) in pairs {
        let root_a = forest.find(a as usize);
        let root_b = forest.find(b as usize);
        if root_a == root_b {
            continue;
        }
        let lower_peak = peak_values[root_a].min(peak_values[root_b]);
        if lower_peak - col < min_dip {
            let higher_peak = peak_values[root_a].max(peak_values[root_b]);
            let root = forest.union(root_a, root_b);
            peak_values[root] = higher_peak;
        }
    }
}

/// Row-major index arithmetic over an n-dimensional shape.
#[derive(Debug)]
struct Grid {
    shape: Vec<usize>,
    strides: Vec<usize>,
    offsets: Vec<SmallVec<[isize; 3]>>,
}

impl Grid {
    fn new(shape: &[usize]) -> Self {
        let mut strides = vec![1usize; shape.len()];
        for axis in (0..shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }
        Self {
            shape: shape.to_vec(),
            strides,
            offsets: box_offsets(shape.len(), 1),
        }
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn ndim(&self) -> usize {
        self.shape.len()
    }

    fn coords(&self, idx: usize) -> SmallVec<[usize; 3]> {
        self.strides
            .iter()
            .zip(&self.shape)
            .map(|(&stride, &len)| (idx / stride) % len)
            .collect()
    }

    /// Flat index of `idx` moved by `offset`, if it stays inside the grid.
    fn offset(&self, idx: usize, offset: &[isize]) -> Option<usize> {
        let coords = self.coords(idx);
        let mut flat = 0usize;
        for (((&c, &d), &len), &stride) in coords
            .iter()
            .zip(offset)
            .zip(&self.shape)
            .zip(&self.strides)
        {
            let moved = c as isize + d;
            if moved < 0 || moved >= len as isize {
                return None;
            }
            flat += moved as usize * stride;
        }
        Some(flat)
    }

    /// All in-bounds pixels of the 3ⁿ−1 neighbourhood.
    fn neighbours(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.offsets.iter().filter_map(move |o| self.offset(idx, o))
    }

    /// Usable neighbour with the largest positive gradient, ties to the first.
    fn steepest_ascent(
        &self,
        idx: usize,
        values: &[f32],
        is_usable: &impl Fn(f32) -> bool,
    ) -> Option<usize> {
        let here = values[idx];
        let mut best: Option<(usize, f32)> = None;
        for (offset, n) in self
            .offsets
            .iter()
            .filter_map(|o| self.offset(idx, o).map(|n| (o, n)))
        {
            let v = values[n];
            if !is_usable(v) || v <= here {
                continue;
            }
            let distance = (offset.iter().map(|d| (d * d) as f32).sum::<f32>()).sqrt();
            let gradient = (v - here) / distance;
            if best.map_or(true, |(_, g)| gradient > g) {
                best = Some((n, gradient));
            }
        }
        best.map(|(n, _)| n)
    }

    /// Highest usable pixel above `idx` within `radius` (Chebyshev), if any.
    fn jump(
        &self,
        idx: usize,
        radius: usize,
        values: &[f32],
        is_usable: &impl Fn(f32) -> bool,
    ) -> Option<usize> {
        if radius <= 1 {
            return None;
        }
        let here = values[idx];
        let mut best: Option<(usize, f32)> = None;
        for offset in box_offsets(self.ndim(), radius) {
            let Some(n) = self.offset(idx, &offset) else {
                continue;
            };
            let v = values[n];
            if is_usable(v) && v > here && best.map_or(true, |(_, b)| v > b) {
                best = Some((n, v));
            }
        }
        best.map(|(n, _)| n)
    }
}

/// Every offset in `[-radius, radius]ⁿ` except the origin, in raster order.
fn box_offsets(ndim: usize, radius: usize) -> Vec<SmallVec<[isize; 3]>> {
    let r = radius as isize;
    let mut offsets: Vec<SmallVec<[isize; 3]>> = vec![SmallVec::new()];
    for _ in 0..ndim {
        offsets = offsets
            .into_iter()
            .flat_map(|prefix| {
                (-r..=r).map(move |d| {
                    let mut next = prefix.clone();
                    next.push(d);
                    next
                })
            })
            .collect();
    }
    offsets.retain(|o| o.iter().any(|&d| d != 0));
    offsets
}
