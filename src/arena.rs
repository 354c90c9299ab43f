//! Slab-backed storage for the entries of the station index.
//!
//! Child links are [`EntryIndex`] handles into the arena, so rotations only
//! swap handles and never move entries around in memory.

use crate::station::{StationId, StationRecord};
use slab::Slab;
use std::ops::{Index, IndexMut};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct EntryIndex(usize);

#[derive(Debug)]
pub(crate) struct IndexEntry {
    pub key: StationId,
    pub value: StationRecord,
    pub left: Option<EntryIndex>,
    pub right: Option<EntryIndex>,
    pub height: i32,
}

impl IndexEntry {
    pub fn leaf(key: StationId, value: StationRecord) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 0,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct EntryArena {
    entries: Slab<IndexEntry>,
}

impl EntryArena {
    pub fn new() -> Self {
        Self {
            entries: Slab::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn insert(&mut self, entry: IndexEntry) -> EntryIndex {
        EntryIndex(self.entries.insert(entry))
    }

    /// # Panics
    ///
    /// Panics if the index is not occupied.
    pub fn remove(&mut self, idx: EntryIndex) -> IndexEntry {
        self.entries.remove(idx.0)
    }

    /// Height of an optional subtree; an absent subtree has height -1.
    #[inline]
    pub fn height(&self, idx: Option<EntryIndex>) -> i32 {
        idx.map_or(-1, |idx| self[idx].height)
    }

    #[inline]
    pub fn update_height(&mut self, idx: EntryIndex) {
        let entry = &self[idx];
        let height = 1 + self.height(entry.left).max(self.height(entry.right));
        self[idx].height = height;
    }
}

impl Index<EntryIndex> for EntryArena {
    type Output = IndexEntry;

    fn index(&self, idx: EntryIndex) -> &Self::Output {
        &self.entries[idx.0]
    }
}

impl IndexMut<EntryIndex> for EntryArena {
    fn index_mut(&mut self, idx: EntryIndex) -> &mut Self::Output {
        &mut self.entries[idx.0]
    }
}
