//! Clump structures from a clump assignment array (CAA).
//!
//! [`build_structures`] turns a label array into the member list of every
//! label and the brightest member of each, in one row-major pass that is
//! independent of rank.


use hashbrown::HashMap;
use ndarray::{ArrayViewD, Dimension, IxDyn};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// An n-dimensional array index (rank 2 or 3).
pub type Coord = SmallVec<[usize; 3]>;

/// Label → member coordinates, in row-major traversal order.
///
/// Labels are kept in first-seen order; lookups go through a hash index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClumpMap {
    entries: Vec<(i32, Vec<Coord>)>,
    index: HashMap<i32, usize>,
}

impl ClumpMap {
    pub fn get(&self, label: i32) -> Option<&[Coord]> {
        self.index
            .get(&label)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn contains(&self, label: i32) -> bool {
        self.index.contains_key(&label)
    }

    /// Number of distinct labels, background included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &[Coord])> {
        self.entries
            .iter()
            .map(|(label, members)| (*label, members.as_slice()))
    }

    /// Total number of member coordinates over all labels.
    pub fn total_members(&self) -> usize {
        self.entries.iter().map(|(_, members)| members.len()).sum()
    }

    fn slot_for(&mut self, label: i32) -> usize {
        if let Some(&slot) = self.index.get(&label) {
            return slot;
        }
        let slot = self.entries.len();
        self.entries.push((label, Vec::new()));
        self.index.insert(label, slot);
        slot
    }
}

/// Label → coordinate of the brightest member.
pub type PeakMap = HashMap<i32, Coord>;

/// Members and peaks of every label in `labels`.
///
/// `data` and `labels` must share a shape of rank 2 or 3. Peaks use a strict
/// `>` comparison, so ties keep the first member in traversal order. A label
/// whose members are all NaN keeps its first member as peak.
pub fn build_structures(
    data: ArrayViewD<f32>,
    labels: ArrayViewD<i32>,
) -> Result<(ClumpMap, PeakMap)> {
    let rank = labels.ndim();
    if !(2..=3).contains(&rank) {
        return Err(Error::UnsupportedRank {
            operation: "clump structure builder",
            expected: "2 or 3",
            actual: rank,
        });
    }
    if data.shape() != labels.shape() {
        return Err(Error::ShapeMismatch {
            context: "clump structure builder",
            expected: labels.shape().to_vec(),
            actual: data.shape().to_vec(),
        });
    }

    let mut clumps = ClumpMap::default();
    // Per slot: (best value, index of best member within the slot's list).
    let mut best: Vec<(f32, usize)> = Vec::new();

    for (idx, &label) in labels.indexed_iter() {
        let slot = clumps.slot_for(label);
        if slot == best.len() {
            best.push((f32::NEG_INFINITY, 0));
        }

        let members = &mut clumps.entries[slot].1;
        let value = data[idx.slice()];
        if value > best[slot].0 {
            best[slot] = (value, members.len());
        }
        members.push(to_coord(&idx));
    }

    let peaks = clumps
        .entries
        .iter()
        .zip(&best)
        .map(|((label, members), &(_, member))| (*label, members[member].clone()))
        .collect();

    Ok((clumps, peaks))
}

#[inline]
fn to_coord(idx: &IxDyn) -> Coord {
    idx.slice().iter().copied().collect()
}
