//! Sum tree for prioritized sampling.
//!
//! The tree is stored in a flat array of `2 * capacity - 1` nodes. Node `0` is the root,
//! the children of node `i` are `2i + 1` and `2i + 2`, and the leaves occupy indices
//! `capacity - 1 .. 2 * capacity - 1`. Every internal node holds the sum of its children,
//! so the root is the total priority mass.
use crate::error::ReplayError;
use anyhow::Result;
use segment_tree::{
    ops::{MaxIgnoreNaN, MinIgnoreNaN},
    SegmentPoint,
};

/// A fixed-capacity sum tree holding one payload per leaf.
///
/// Payloads are written in circular order. Once the tree is full, [`SumTree::add`]
/// overwrites the oldest entry.
pub struct SumTree<T> {
    capacity: usize,

    /// Node values; leaves hold priorities.
    tree: Vec<f32>,

    /// Payloads, indexed by the position of the leaf among the leaves.
    data: Vec<Option<T>>,

    /// Next write position among the leaves.
    write: usize,

    /// Number of populated leaves, saturating at `capacity`.
    n_entries: usize,

    min_tree: SegmentPoint<f32, MinIgnoreNaN>,
    max_tree: SegmentPoint<f32, MaxIgnoreNaN>,
}

impl<T> SumTree<T> {
    /// Creates an empty sum tree with `capacity` leaves.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ReplayError::InvalidConfig("capacity must be positive".to_string()).into());
        }

        Ok(Self {
            capacity,
            tree: vec![0f32; 2 * capacity - 1],
            data: (0..capacity).map(|_| None).collect(),
            write: 0,
            n_entries: 0,
            min_tree: SegmentPoint::build(vec![f32::MAX; capacity], MinIgnoreNaN),
            max_tree: SegmentPoint::build(vec![0f32; capacity], MaxIgnoreNaN),
        })
    }

    /// The maximum number of leaves.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of populated leaves.
    pub fn len(&self) -> usize {
        self.n_entries
    }

    /// Returns `true` if nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.n_entries == 0
    }

    /// Total priority mass, i.e., the value of the root.
    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// The largest leaf priority, or `None` for an empty tree.
    pub fn max(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.max_tree.query(0, self.capacity))
        }
    }

    /// The smallest priority among populated leaves, or `None` for an empty tree.
    pub fn min(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            // Leaves are populated in order, so `0..n_entries` are the live ones.
            Some(self.min_tree.query(0, self.n_entries))
        }
    }

    /// Returns `true` if `ix` is a tree index of a leaf.
    pub fn is_leaf(&self, ix: usize) -> bool {
        ix >= self.capacity - 1 && ix < self.tree.len()
    }

    /// Returns `true` if `ix` is a leaf that holds a payload.
    pub fn is_populated(&self, ix: usize) -> bool {
        self.is_leaf(ix) && self.data[ix + 1 - self.capacity].is_some()
    }

    /// Priority stored at leaf `ix`.
    pub fn priority(&self, ix: usize) -> Option<f32> {
        if self.is_leaf(ix) {
            Some(self.tree[ix])
        } else {
            None
        }
    }

    /// Payload stored at leaf `ix`.
    pub fn data(&self, ix: usize) -> Option<&T> {
        if self.is_leaf(ix) {
            self.data[ix + 1 - self.capacity].as_ref()
        } else {
            None
        }
    }

    /// Writes `data` at the write cursor with priority `p` and returns its leaf index.
    pub fn add(&mut self, p: f32, data: T) -> usize {
        let ix = self.write + self.capacity - 1;
        self.data[self.write] = Some(data);
        self.update(ix, p);

        self.write = (self.write + 1) % self.capacity;
        if self.n_entries < self.capacity {
            self.n_entries += 1;
        }

        ix
    }

    /// Sets the priority of leaf `ix` to `p` and propagates the change to the root.
    pub fn update(&mut self, ix: usize, p: f32) {
        debug_assert!(self.is_leaf(ix));

        let change = p - self.tree[ix];
        self.tree[ix] = p;

        let data_ix = ix + 1 - self.capacity;
        self.min_tree.modify(data_ix, p);
        self.max_tree.modify(data_ix, p);

        let mut ix = ix;
        while ix != 0 {
            ix = (ix - 1) / 2;
            self.tree[ix] += change;
        }
    }

    /// Finds the leaf whose cumulative priority range contains `s`.
    ///
    /// Returns the leaf index, its priority and its payload. `s` is clamped to
    /// `[0, total()]`; `None` is returned if the tree is empty or all of its mass is zero
    /// and the descent ends on an unpopulated leaf.
    pub fn get(&self, s: f32) -> Option<(usize, f32, &T)> {
        if self.is_empty() {
            return None;
        }

        let mut s = s.max(0.0).min(self.total());
        let mut ix = 0;
        loop {
            let left = 2 * ix + 1;
            let right = left + 1;
            if left >= self.tree.len() {
                break;
            }

            // Never descend into a child without mass while its sibling has some.
            // Leaves are not visited in index order, so an empty left subtree can
            // precede populated leaves, and `s == 0` must not enter it.
            if self.tree[right] == 0f32 || (s <= self.tree[left] && self.tree[left] > 0f32) {
                ix = left;
            } else {
                s -= self.tree[left];
                ix = right;
            }
        }

        self.data[ix + 1 - self.capacity]
            .as_ref()
            .map(|data| (ix, self.tree[ix], data))
    }
}
