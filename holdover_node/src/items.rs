// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered collections of item state holders.
//!
//! List-like components (check lists, menus, data rows) own a variable
//! number of items, each with its own state. Capture emits either the changed
//! items only, or the whole list when its structure changed after tracking.
//!
//! # Record shapes
//!
//! - Sparse: `List([Int(index), state, Int(index), state, ...])` for items
//!   that changed.
//! - Full: `Slots([Int(count), List(pairs)])`, where `pairs` has the sparse
//!   layout and covers every item with state. Restore rebuilds the list to
//!   `count` items through the factory before applying the pairs.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use holdover_record::{Record, RecordKind, StateShapeMismatch, pack_slots, unpack_slots};
use holdover_store::{PersistScope, StateManager};

/// Largest item count a full-capture record may ask [`ItemList`] to rebuild.
pub const MAX_RESTORED_ITEMS: usize = 1 << 16;

/// An ordered list of item holders.
///
/// Items added while the list is tracking start tracking immediately.
/// Structural changes after tracking (push, insert, remove, clear) switch the
/// list to full capture and mark every item all-dirty, so the next request can
/// rebuild the list from the captured record alone.
///
/// State restored for an index the list does not have yet is kept pending and
/// applied when an item is added at that index.
///
/// # Example
///
/// ```rust
/// use holdover_node::ItemList;
/// use holdover_store::{AttributeStore, StateKey, StateManager};
///
/// const SELECTED: StateKey<bool> = StateKey::new("Selected", || false);
///
/// let mut first = ItemList::new(AttributeStore::new);
/// first.push(AttributeStore::new()).unwrap();
/// first.push(AttributeStore::new()).unwrap();
/// first.track();
/// first.get_mut(1).unwrap().set(SELECTED, true);
///
/// // Only the changed item is captured.
/// let record = first.capture();
///
/// let mut second = ItemList::new(AttributeStore::new);
/// second.push(AttributeStore::new()).unwrap();
/// second.push(AttributeStore::new()).unwrap();
/// second.restore(record).unwrap();
/// assert!(second.get(1).unwrap().get(SELECTED));
/// ```
pub struct ItemList<T> {
    items: Vec<T>,
    factory: Box<dyn Fn() -> T>,
    /// Restored state for indices that have no item yet.
    pending: HashMap<usize, Record>,
    tracking: bool,
    rebuilt: bool,
}

impl<T: StateManager> ItemList<T> {
    /// Creates an empty list that builds items with `factory` on restore.
    #[must_use]
    pub fn new(factory: impl Fn() -> T + 'static) -> Self {
        Self {
            items: Vec::new(),
            factory: Box::new(factory),
            pending: HashMap::new(),
            tracking: false,
            rebuilt: false,
        }
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the item at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Iterates over the items in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    /// Iterates mutably over the items in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.items.iter_mut()
    }

    /// Returns `true` if the next capture emits the whole list.
    #[must_use]
    pub fn is_rebuilt(&self) -> bool {
        self.rebuilt
    }

    /// Returns the number of restored item states still waiting for an item.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Appends an item and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeMismatch`] if state pending for the new index does
    /// not fit the item. The item is added regardless.
    pub fn push(&mut self, item: T) -> Result<usize, StateShapeMismatch> {
        let index = self.items.len();
        self.insert(index, item)?;
        Ok(index)
    }

    /// Inserts an item at `index`, shifting later items.
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, mut item: T) -> Result<(), StateShapeMismatch> {
        if self.tracking {
            item.track();
        }
        let pending = self.pending.remove(&index);
        self.items.insert(index, item);
        self.structure_changed();
        if pending.is_some() {
            log::trace!("applying pending state to item {index}");
            self.items[index]
                .restore(pending)
                .map_err(|e| e.in_item(index))?;
        }
        Ok(())
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let item = self.items.remove(index);
        self.structure_changed();
        item
    }

    /// Removes every item and drops pending state.
    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.clear();
        self.structure_changed();
    }

    fn structure_changed(&mut self) {
        if self.tracking {
            self.mark_all_dirty();
        }
    }

    fn create(&self) -> T {
        let mut item = (self.factory)();
        if self.tracking {
            item.track();
        }
        item
    }

    fn capture_pairs(&self, scope: PersistScope) -> Vec<Record> {
        let mut pairs = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            if let Some(state) = item.capture_in(scope) {
                pairs.push(index_record(index));
                pairs.push(state);
            }
        }
        pairs
    }

    fn restore_pairs(&mut self, pairs: Vec<Record>) -> Result<(), StateShapeMismatch> {
        check_pairs(&pairs)?;
        let mut pairs = pairs.into_iter();
        while let (Some(index), Some(state)) = (pairs.next(), pairs.next()) {
            let index = record_index(&index)?;
            match self.items.get_mut(index) {
                Some(item) => item.restore(Some(state)).map_err(|e| e.in_item(index))?,
                None => {
                    self.pending.insert(index, state);
                }
            }
        }
        Ok(())
    }

    fn rebuild(&mut self, count: usize) {
        log::debug!("rebuilding item list with {count} items");
        self.items.clear();
        self.pending.clear();
        self.items.reserve(count);
        for _ in 0..count {
            let item = self.create();
            self.items.push(item);
        }
    }
}

/// Checks that `pairs` alternates item indices and item states.
fn check_pairs(pairs: &[Record]) -> Result<(), StateShapeMismatch> {
    if pairs.len() % 2 != 0 {
        return Err(StateShapeMismatch::malformed(
            "item state pairs have odd length",
        ));
    }
    for index in pairs.iter().step_by(2) {
        record_index(index)?;
    }
    Ok(())
}

fn index_record(index: usize) -> Record {
    // Item counts are bounded by memory, far below `i64::MAX`.
    Record::Int(i64::try_from(index).unwrap_or(i64::MAX))
}

fn record_index(record: &Record) -> Result<usize, StateShapeMismatch> {
    match record {
        Record::Int(raw) => usize::try_from(*raw).map_err(|_| StateShapeMismatch::out_of_range()),
        other => Err(StateShapeMismatch::kind(RecordKind::Int, other.kind())),
    }
}

impl<T: fmt::Debug> fmt::Debug for ItemList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemList")
            .field("items", &self.items)
            .field("pending", &self.pending)
            .field("tracking", &self.tracking)
            .field("rebuilt", &self.rebuilt)
            .finish_non_exhaustive()
    }
}

impl<T: StateManager> StateManager for ItemList<T> {
    fn track(&mut self) {
        self.tracking = true;
        for item in &mut self.items {
            item.track();
        }
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn capture(&self) -> Option<Record> {
        self.capture_in(PersistScope::Enabled)
    }

    fn capture_in(&self, scope: PersistScope) -> Option<Record> {
        let pairs = self.capture_pairs(scope);
        if self.rebuilt && scope.is_enabled() {
            let pairs = (!pairs.is_empty()).then_some(Record::List(pairs));
            pack_slots([Some(index_record(self.items.len())), pairs])
        } else if pairs.is_empty() {
            None
        } else {
            Some(Record::List(pairs))
        }
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        match record {
            None => Ok(()),
            Some(Record::List(pairs)) => self.restore_pairs(pairs),
            Some(full @ Record::Slots(_)) => {
                let [count, pairs] = unpack_slots::<2>(Some(full))?;
                let count = match count {
                    Some(count) => match record_index(&count) {
                        Ok(count) if count <= MAX_RESTORED_ITEMS => count,
                        Ok(_) => return Err(StateShapeMismatch::out_of_range().in_slot(0)),
                        Err(e) => return Err(e.in_slot(0)),
                    },
                    None => {
                        return Err(StateShapeMismatch::malformed(
                            "item list is missing its count",
                        ));
                    }
                };
                let pairs = match pairs {
                    None => Vec::new(),
                    Some(Record::List(pairs)) => {
                        check_pairs(&pairs).map_err(|e| e.in_slot(1))?;
                        pairs
                    }
                    Some(other) => {
                        return Err(
                            StateShapeMismatch::kind(RecordKind::List, other.kind()).in_slot(1)
                        );
                    }
                };
                self.rebuild(count);
                self.restore_pairs(pairs).map_err(|e| e.in_slot(1))
            }
            Some(other) => Err(StateShapeMismatch::kind(RecordKind::List, other.kind())),
        }
    }

    fn mark_all_dirty(&mut self) {
        self.rebuilt = true;
        for item in &mut self.items {
            item.mark_all_dirty();
        }
    }
}
