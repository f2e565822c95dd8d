//! Incremental 4-ary resolution tree.
//!
//! Drivers are the leaves. Every internal node caches the combination of up to four children,
//! so a changed leaf only recomputes the path to the root, and stops early at the first level
//! whose cached result does not change.

/// Result of updating one leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeUpdate<T> {
    /// The leaf already held this value.
    Unchanged,
    /// The change was absorbed below the root.
    Absorbed,
    /// The root changed to this value.
    Root(T),
}

/// A balanced 4-ary tree over `T` with a commutative, associative combine function.
#[derive(Clone, Debug)]
pub struct ResolvTree<T> {
    levels: Vec<Vec<T>>,
    combine: fn(&T, &T) -> T,
}

/// Branching factor.
pub const FAN_IN: usize = 4;

impl<T: Clone + PartialEq> ResolvTree<T> {
    /// Creates a tree of `leaves` leaves, all holding `idle`.
    ///
    /// `idle` must be the identity of `combine` so that unused leaves do not contribute.
    pub fn new(leaves: usize, idle: &T, combine: fn(&T, &T) -> T) -> Self {
        let mut levels = vec![vec![idle.clone(); leaves.max(1)]];
        while levels.last().is_some_and(|l| l.len() > 1) {
            let len = levels.last().map_or(1, Vec::len).div_ceil(FAN_IN);
            levels.push(vec![idle.clone(); len]);
        }
        Self { levels, combine }
    }

    /// Number of leaves.
    pub fn leaves(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of levels including leaves and root.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Current value of leaf `idx`.
    pub fn leaf(&self, idx: usize) -> Option<&T> {
        self.levels[0].get(idx)
    }

    /// The combined value of every leaf.
    pub fn root(&self) -> &T {
        &self.levels[self.levels.len() - 1][0]
    }

    /// Stores `value` at leaf `idx` and recomputes the path to the root.
    ///
    /// # Returns
    ///
    /// [`TreeUpdate::Root`] with the new root when it changed. A single-leaf tree returns the
    /// leaf itself as the root.
    pub fn update(&mut self, idx: usize, value: T) -> TreeUpdate<T> {
        if self.levels[0][idx] == value {
            return TreeUpdate::Unchanged;
        }
        self.levels[0][idx] = value;
        let mut child = idx;
        for level in 1..self.levels.len() {
            let parent = child / FAN_IN;
            let start = parent * FAN_IN;
            let end = (start + FAN_IN).min(self.levels[level - 1].len());
            let below = &self.levels[level - 1][start..end];
            let mut acc = below[0].clone();
            for v in &below[1..] {
                acc = (self.combine)(&acc, v);
            }
            if self.levels[level][parent] == acc {
                return TreeUpdate::Absorbed;
            }
            self.levels[level][parent] = acc;
            child = parent;
        }
        TreeUpdate::Root(self.root().clone())
    }
}
