use crate::{
    arena::{EntryArena, EntryIndex, IndexEntry},
    station::{StationId, StationRecord},
};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// An ordered index of charging stations keyed by [`StationId`].
///
/// The index is an AVL tree: for every entry the heights of its two subtrees
/// differ by at most one, so lookups and mutations are `O(log n)`.
#[derive(Debug, Default)]
pub struct StationIndex {
    pub(crate) entries: EntryArena,
    pub(crate) root: Option<EntryIndex>,
}

/// What [`StationIndex::insert_or_update`] did with the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Updated,
}

/// A borrowed view of one station stored in the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
    key: StationId,
    record: &'a StationRecord,
}

impl<'a> Entry<'a> {
    pub fn key(&self) -> StationId {
        self.key
    }

    pub fn record(&self) -> &'a StationRecord {
        self.record
    }
}

impl StationIndex {
    pub fn new() -> Self {
        Self {
            entries: EntryArena::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; -1 when empty, 0 for a single station.
    pub fn height(&self) -> i32 {
        self.entries.height(self.root)
    }

    pub fn find(&self, key: StationId) -> Option<&StationRecord> {
        self.locate(key).map(|idx| &self.entries[idx].value)
    }

    pub fn find_mut(&mut self, key: StationId) -> Option<&mut StationRecord> {
        self.locate(key).map(|idx| &mut self.entries[idx].value)
    }

    pub fn contains(&self, key: StationId) -> bool {
        self.locate(key).is_some()
    }

    fn locate(&self, key: StationId) -> Option<EntryIndex> {
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            let entry = &self.entries[idx];
            cursor = match key.cmp(&entry.key) {
                Ordering::Less => entry.left,
                Ordering::Greater => entry.right,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    /// Stores `record` under `key`.
    ///
    /// A new key creates a leaf and rebalances every ancestor on the way back
    /// up. An existing key has its record overwritten in place and the shape
    /// of the tree is left untouched.
    pub fn insert_or_update(&mut self, key: StationId, record: StationRecord) -> InsertOutcome {
        let mut outcome = InsertOutcome::Inserted;
        let root = self.insert_at(self.root, key, record, &mut outcome);
        self.root = Some(root);
        outcome
    }

    fn insert_at(
        &mut self,
        node: Option<EntryIndex>,
        key: StationId,
        record: StationRecord,
        outcome: &mut InsertOutcome,
    ) -> EntryIndex {
        let Some(idx) = node else {
            trace!(key, "inserting new station");
            return self.entries.insert(IndexEntry::leaf(key, record));
        };

        let (entry_key, left, right) = self.links(idx);
        match key.cmp(&entry_key) {
            Ordering::Less => {
                let left = self.insert_at(left, key, record, outcome);
                self.entries[idx].left = Some(left);
            }
            Ordering::Greater => {
                let right = self.insert_at(right, key, record, outcome);
                self.entries[idx].right = Some(right);
            }
            Ordering::Equal => {
                self.entries[idx].value = record;
                *outcome = InsertOutcome::Updated;
                return idx;
            }
        }

        if *outcome == InsertOutcome::Updated {
            return idx;
        }
        self.rebalance(idx)
    }

    /// Removes the station stored under `key`, returning whether it was present.
    pub fn delete(&mut self, key: StationId) -> bool {
        let mut found = false;
        self.root = self.delete_at(self.root, key, &mut found);
        if found {
            debug!(key, remaining = self.len(), "deleted station");
        }
        found
    }

    fn delete_at(
        &mut self,
        node: Option<EntryIndex>,
        key: StationId,
        found: &mut bool,
    ) -> Option<EntryIndex> {
        let idx = node?;
        let (entry_key, left, right) = self.links(idx);
        match key.cmp(&entry_key) {
            Ordering::Less => {
                let left = self.delete_at(left, key, found);
                self.entries[idx].left = left;
            }
            Ordering::Greater => {
                let right = self.delete_at(right, key, found);
                self.entries[idx].right = right;
            }
            Ordering::Equal => {
                *found = true;
                match (left, right) {
                    (None, None) => {
                        self.entries.remove(idx);
                        return None;
                    }
                    (Some(child), None) | (None, Some(child)) => {
                        self.entries.remove(idx);
                        return Some(child);
                    }
                    (Some(_), Some(right)) => {
                        let successor = &self.entries[self.leftmost(right)];
                        let (successor_key, successor_value) = (successor.key, successor.value);
                        let entry = &mut self.entries[idx];
                        entry.key = successor_key;
                        entry.value = successor_value;
                        let right = self.delete_at(Some(right), successor_key, found);
                        self.entries[idx].right = right;
                    }
                }
            }
        }
        Some(self.rebalance(idx))
    }

    pub fn minimum(&self) -> Option<Entry<'_>> {
        self.root.map(|root| self.entry(self.leftmost(root)))
    }

    pub fn maximum(&self) -> Option<Entry<'_>> {
        self.root.map(|root| self.entry(self.rightmost(root)))
    }

    /// Returns at most `capacity` keys in ascending order.
    ///
    /// Callers detect truncation by comparing the returned length with
    /// [`StationIndex::len`].
    pub fn linearize(&self, capacity: usize) -> Vec<StationId> {
        let mut keys = Vec::with_capacity(capacity.min(self.len()));
        self.collect_in_order(self.root, capacity, &mut keys);
        keys
    }

    fn collect_in_order(&self, node: Option<EntryIndex>, capacity: usize, keys: &mut Vec<StationId>) {
        let Some(idx) = node else {
            return;
        };
        if keys.len() >= capacity {
            return;
        }
        let entry = &self.entries[idx];
        self.collect_in_order(entry.left, capacity, keys);
        if keys.len() < capacity {
            keys.push(entry.key);
        }
        self.collect_in_order(entry.right, capacity, keys);
    }

    /// Iterates over every station in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter {
            index: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Releases every entry, children before their parent.
    pub fn clear(&mut self) {
        let root = self.root.take();
        let released = self.release(root);
        debug!(released, "cleared station index");
    }

    fn release(&mut self, node: Option<EntryIndex>) -> usize {
        let Some(idx) = node else {
            return 0;
        };
        let (_, left, right) = self.links(idx);
        let released = self.release(left) + self.release(right);
        self.entries.remove(idx);
        released + 1
    }

    #[inline]
    fn links(&self, idx: EntryIndex) -> (StationId, Option<EntryIndex>, Option<EntryIndex>) {
        let entry = &self.entries[idx];
        (entry.key, entry.left, entry.right)
    }

    fn entry(&self, idx: EntryIndex) -> Entry<'_> {
        let entry = &self.entries[idx];
        Entry {
            key: entry.key,
            record: &entry.value,
        }
    }

    fn leftmost(&self, mut idx: EntryIndex) -> EntryIndex {
        while let Some(left) = self.entries[idx].left {
            idx = left;
        }
        idx
    }

    fn rightmost(&self, mut idx: EntryIndex) -> EntryIndex {
        while let Some(right) = self.entries[idx].right {
            idx = right;
        }
        idx
    }

    /// Restores the balance invariant at `idx` and returns the new subtree root.
    fn rebalance(&mut self, idx: EntryIndex) -> EntryIndex {
        self.entries.update_height(idx);
        let (_, left, right) = self.links(idx);
        let balance = self.entries.height(left) - self.entries.height(right);

        if balance > 1 {
            let Some(left) = left else {
                unreachable!("left-heavy entry {idx:?} has no left child. This is a bug.");
            };
            let (_, inner_left, inner_right) = self.links(left);
            if self.entries.height(inner_right) > self.entries.height(inner_left) {
                let rotated = self.rotate_left(left);
                self.entries[idx].left = Some(rotated);
            }
            return self.rotate_right(idx);
        }

        if balance < -1 {
            let Some(right) = right else {
                unreachable!("right-heavy entry {idx:?} has no right child. This is a bug.");
            };
            let (_, inner_left, inner_right) = self.links(right);
            if self.entries.height(inner_left) > self.entries.height(inner_right) {
                let rotated = self.rotate_right(right);
                self.entries[idx].right = Some(rotated);
            }
            return self.rotate_left(idx);
        }

        idx
    }

    fn rotate_right(&mut self, y: EntryIndex) -> EntryIndex {
        let Some(x) = self.entries[y].left else {
            unreachable!("cannot rotate {y:?} right without a left child. This is a bug.");
        };
        trace!(pivot = self.entries[y].key, "rotating right");
        let moved = self.entries[x].right;
        self.entries[x].right = Some(y);
        self.entries[y].left = moved;
        self.entries.update_height(y);
        self.entries.update_height(x);
        x
    }

    fn rotate_left(&mut self, x: EntryIndex) -> EntryIndex {
        let Some(y) = self.entries[x].right else {
            unreachable!("cannot rotate {x:?} left without a right child. This is a bug.");
        };
        trace!(pivot = self.entries[x].key, "rotating left");
        let moved = self.entries[y].left;
        self.entries[y].left = Some(x);
        self.entries[x].right = moved;
        self.entries.update_height(x);
        self.entries.update_height(y);
        y
    }
}

/// In-order iterator over the stations of a [`StationIndex`].
pub struct Iter<'a> {
    index: &'a StationIndex,
    stack: Vec<EntryIndex>,
}

impl<'a> Iter<'a> {
    fn push_left_spine(&mut self, mut node: Option<EntryIndex>) {
        while let Some(idx) = node {
            self.stack.push(idx);
            node = self.index.entries[idx].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (StationId, &'a StationRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let index: &'a StationIndex = self.index;
        let entry = &index.entries[idx];
        self.push_left_spine(entry.right);
        Some((entry.key, &entry.value))
    }
}

impl<'a> IntoIterator for &'a StationIndex {
    type Item = (StationId, &'a StationRecord);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<(StationId, StationRecord)> for StationIndex {
    fn extend<T: IntoIterator<Item = (StationId, StationRecord)>>(&mut self, iter: T) {
        for (key, record) in iter {
            self.insert_or_update(key, record);
        }
    }
}

impl FromIterator<(StationId, StationRecord)> for StationIndex {
    fn from_iter<T: IntoIterator<Item = (StationId, StationRecord)>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
