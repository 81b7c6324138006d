//! Insertion-ordered set of chunks waiting for their neighbors.

use rustc_hash::FxHashSet;
use strata_voxel::ChunkCoord;

/// Generated chunks that could not be meshed yet, oldest first.
///
/// `members` mirrors `order` so membership tests stay O(1) while the drain
/// still walks entries in the order they were queued.
#[derive(Debug, Default)]
pub struct PendingSet {
    order: Vec<ChunkCoord>,
    members: FxHashSet<ChunkCoord>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `coord`. Returns `false` if it was already pending.
    pub fn insert(&mut self, coord: ChunkCoord) -> bool {
        if !self.members.insert(coord) {
            return false;
        }
        self.order.push(coord);
        true
    }

    /// Returns `true` if `coord` was pending.
    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        if !self.members.remove(&coord) {
            return false;
        }
        self.order.retain(|c| *c != coord);
        true
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.members.contains(&coord)
    }

    /// Drops every entry for which `keep` returns `false`. Returns how many
    /// were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(ChunkCoord) -> bool) -> usize {
        let before = self.order.len();
        let members = &mut self.members;
        self.order.retain(|c| {
            let kept = keep(*c);
            if !kept {
                members.remove(c);
            }
            kept
        });
        before - self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
