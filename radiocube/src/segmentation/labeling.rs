//! 8-connected component labeling using union-find.

use ndarray::{Array2, ArrayView2};

use crate::math::union_find::UnionFind;

/// Labels the 8-connected foreground regions of `mask`.
///
/// Returns the label image and the region count. Labels run from 1 in
/// raster order of each region's first pixel; background is 0.
pub fn label_components(mask: ArrayView2<bool>) -> (Array2<i32>, usize) {
    let (height, width) = mask.dim();
    let mut provisional = Array2::<usize>::zeros((height, width));
    // Id 0 is reserved for background.
    let mut uf = UnionFind::new(1);

    for y in 0..height {
        for x in 0..width {
            if !mask[[y, x]] {
                continue;
            }

            let mut current = 0usize;
            for (ny, nx) in previous_neighbours(y, x, width) {
                let neighbour = provisional[[ny, nx]];
                if neighbour == 0 {
                    continue;
                }
                current = if current == 0 {
                    neighbour
                } else {
                    uf.union(current, neighbour)
                };
            }
            if current == 0 {
                current = uf.make_set();
            }
            provisional[[y, x]] = current;
        }
    }

    let mut final_label = vec![0i32; uf.len()];
    let mut count = 0usize;
    let mut labels = Array2::<i32>::zeros((height, width));
    for (dst, &id) in labels.iter_mut().zip(provisional.iter()) {
        if id == 0 {
            continue;
        }
        let root = uf.find(id);
        if final_label[root] == 0 {
            count += 1;
            final_label[root] = count as i32;
        }
        *dst = final_label[root];
    }

    (labels, count)
}

/// Already-visited 8-neighbours of `(y, x)` in raster order.
fn previous_neighbours(y: usize, x: usize, width: usize) -> impl Iterator<Item = (usize, usize)> {
    let left = (x > 0).then(|| (y, x - 1));
    let up = (y > 0).then(|| {
        let up_left = (x > 0).then(|| (y - 1, x - 1));
        let up_right = (x + 1 < width).then(|| (y - 1, x + 1));
        [up_left, Some((y - 1, x)), up_right]
    });
    left.into_iter().chain(up.into_iter().flatten().flatten())
}

/// Removes regions with fewer than `min_pixels` pixels and relabels the
/// survivors consecutively, keeping their relative order.
pub fn drop_small_regions(
    labels: &Array2<i32>,
    count: usize,
    min_pixels: usize,
) -> (Array2<i32>, usize) {
    let mut sizes = vec![0usize; count + 1];
    for &label in labels.iter() {
        if label > 0 {
            sizes[label as usize] += 1;
        }
    }

    let mut remap = vec![0i32; count + 1];
    let mut kept = 0usize;
    for (label, &size) in sizes.iter().enumerate().skip(1) {
        if size >= min_pixels {
            kept += 1;
            remap[label] = kept as i32;
        }
    }

    let relabeled = labels.mapv(|label| if label > 0 { remap[label as usize] } else { 0 });
    (relabeled, kept)
}
