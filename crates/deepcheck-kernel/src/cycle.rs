//! Active-path cycle tracking.
//!
//! Only keys on the current descent path are tracked: a key is released when
//! the walk backtracks out of it, so shared (diamond) substructures are still
//! visited once per path while true back-edges are cut.

use std::collections::HashSet;
use std::hash::Hash;

use crate::graph::NodeId;

#[derive(Debug)]
pub struct CycleTracker<K> {
    active: HashSet<K>,
}

/// Identity of one comparison step: the actual and expected nodes.
pub type PairKey = (NodeId, NodeId);

impl<K: Hash + Eq> Default for CycleTracker<K> {
    fn default() -> Self {
        Self {
            active: HashSet::new(),
        }
    }
}

impl<K: Hash + Eq + Copy> CycleTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` active. Returns `false` when it already is, which means
    /// the walk has come back to a node it is still inside of.
    pub fn enter(&mut self, key: K) -> bool {
        self.active.insert(key)
    }

    pub fn leave(&mut self, key: K) {
        self.active.remove(&key);
    }

    pub fn is_active(&self, key: K) -> bool {
        self.active.contains(&key)
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }
}
