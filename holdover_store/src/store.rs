// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-component attribute storage with dirty tracking.
//!
//! # Implementation
//!
//! Entries live in a `SmallVec` sorted by key and are found by binary search
//! rather than hashing. Components rarely set more than a handful of
//! properties, so the inline capacity avoids allocation in the common case,
//! and the sorted order makes capture output deterministic.
//!
//! # Tombstones
//!
//! Removing a key while tracking leaves a dirty tombstone in its place, so
//! that the next capture can tell "removed" apart from "never touched". A
//! tombstone reads as absent.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use smallvec::SmallVec;

use holdover_record::{Record, RecordKind, StateShapeMismatch, StateValue};

use crate::key::StateKey;
use crate::manager::StateManager;
use crate::policy::{Inclusion, PolicySet};

/// Default inline capacity for entries.
///
/// Most components set fewer than 8 properties explicitly.
const INLINE_CAPACITY: usize = 8;

/// Entry name: borrowed for statically declared keys, owned once restored.
type Name = Cow<'static, str>;

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    /// `None` is a tombstone.
    value: Option<Record>,
    dirty: bool,
}

/// An ordered key→value map that remembers which keys changed after tracking
/// began.
///
/// # Lifecycle
///
/// - Writes before [`track`](StateManager::track) form the baseline and are
///   not dirty.
/// - [`restore`](StateManager::restore) inserts entries as not dirty.
/// - Writes after tracking are dirty and show up in
///   [`capture`](StateManager::capture).
///
/// # Example
///
/// ```rust
/// use holdover_record::Record;
/// use holdover_store::{AttributeStore, StateKey, StateManager};
///
/// const TEXT: StateKey<String> = StateKey::new("Text", String::new);
///
/// let mut store = AttributeStore::new();
/// store.set(TEXT, "baseline".into());
/// store.track();
/// assert_eq!(store.capture(), None);
///
/// store.set(TEXT, "changed".into());
/// assert_eq!(
///     store.capture(),
///     Some(Record::Entries(vec![("Text".into(), Record::Str("changed".into()))]))
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeStore {
    /// Entries sorted by name for binary search lookup.
    entries: SmallVec<[(Name, Entry); INLINE_CAPACITY]>,
    tracking: bool,
}

impl AttributeStore {
    /// Creates an empty, untracked store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn find(&self, name: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(entry_name, _)| (**entry_name).cmp(name))
    }

    fn live(&self, name: &str) -> Option<&Record> {
        self.find(name)
            .ok()
            .and_then(|idx| self.entries[idx].1.value.as_ref())
    }

    fn write(&mut self, name: Name, value: Option<Record>, dirty: bool) {
        match self.find(&name) {
            Ok(idx) => self.entries[idx].1 = Entry { value, dirty },
            Err(idx) => self.entries.insert(idx, (name, Entry { value, dirty })),
        }
    }

    /// Returns `true` if no key has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of keys with a value. Tombstones are not counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    /// Returns the keys with a value, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.value.is_some())
            .map(|(name, _)| &**name)
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    /// Returns the stored value, or the key's declared default.
    ///
    /// A stored value of the wrong kind is logged and treated as absent; use
    /// [`try_get`](Self::try_get) to observe it as an error instead.
    #[must_use]
    pub fn get<T: StateValue>(&self, key: StateKey<T>) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => key.default_value(),
            Err(err) => {
                log::warn!("ignoring stored {:?}: {err}", key.name());
                key.default_value()
            }
        }
    }

    /// Returns the stored value, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeMismatch`] if the stored record does not convert
    /// to `T`.
    pub fn try_get<T: StateValue>(
        &self,
        key: StateKey<T>,
    ) -> Result<Option<T>, StateShapeMismatch> {
        self.live(key.name())
            .map(|record| T::from_record(record).map_err(|e| e.in_key(key.name())))
            .transpose()
    }

    /// Stores a value. Marks it dirty when tracking, even if unchanged.
    pub fn set<T: StateValue>(&mut self, key: StateKey<T>, value: T) {
        self.set_record(key.name(), value.to_record());
    }

    /// Returns `true` if the key has a value, even one equal to its default.
    #[must_use]
    pub fn contains<T>(&self, key: StateKey<T>) -> bool {
        self.contains_name(key.name())
    }

    /// Removes the key's value. See [`remove`](Self::remove).
    pub fn reset<T>(&mut self, key: StateKey<T>) -> bool {
        self.remove(key.name()).is_some()
    }

    // =========================================================================
    // Untyped access
    // =========================================================================

    /// Returns the stored record for `name`.
    #[must_use]
    pub fn get_record(&self, name: &str) -> Option<&Record> {
        self.live(name)
    }

    /// Returns `true` if `name` has a value.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.live(name).is_some()
    }

    /// Stores a record. Marks it dirty when tracking, even if unchanged.
    ///
    /// Storing a [`Record::Tombstone`] is equivalent to [`remove`](Self::remove).
    pub fn set_record(&mut self, name: impl Into<Cow<'static, str>>, record: Record) {
        let name = name.into();
        if record.is_tombstone() {
            self.remove(&name);
            return;
        }
        let dirty = self.tracking;
        self.write(name, Some(record), dirty);
    }

    /// Removes `name`, returning its previous value.
    ///
    /// While tracking, a removed value leaves a dirty tombstone so that the
    /// next capture records the removal. Otherwise the entry is dropped.
    pub fn remove(&mut self, name: &str) -> Option<Record> {
        let idx = self.find(name).ok()?;
        if self.tracking {
            let entry = &mut self.entries[idx].1;
            let previous = entry.value.take()?;
            entry.dirty = true;
            Some(previous)
        } else {
            self.entries.remove(idx).1.value
        }
    }

    /// Drops every entry, including tombstones. Does not record removals.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // =========================================================================
    // Dirty state
    // =========================================================================

    /// Returns `true` if `name` changed since tracking began.
    #[must_use]
    pub fn is_dirty(&self, name: &str) -> bool {
        self.find(name)
            .is_ok_and(|idx| self.entries[idx].1.dirty)
    }

    /// Overrides the dirty flag of an existing entry.
    ///
    /// Returns `false` if there is no entry for `name`.
    pub fn set_dirty(&mut self, name: &str, dirty: bool) -> bool {
        match self.find(name) {
            Ok(idx) => {
                self.entries[idx].1.dirty = dirty;
                true
            }
            Err(_) => false,
        }
    }

    /// Returns `true` if any entry is dirty.
    #[must_use]
    pub fn has_dirty(&self) -> bool {
        self.entries.iter().any(|(_, entry)| entry.dirty)
    }

    // =========================================================================
    // Capture variants
    // =========================================================================

    /// Captures dirty entries, letting `policies` force or suppress keys.
    ///
    /// Forced keys are included with their current value even when clean;
    /// suppressed keys are omitted even when dirty. Forcing a key that has no
    /// value includes nothing.
    #[must_use]
    pub fn capture_with<C: ?Sized>(&self, policies: &PolicySet<C>, cx: &C) -> Option<Record> {
        self.capture_filtered(|name, entry| match policies.decide(name, cx) {
            Inclusion::Tracked => entry.dirty,
            Inclusion::Force => entry.dirty || entry.value.is_some(),
            Inclusion::Suppress => false,
        })
    }

    /// Captures every live entry regardless of dirty state.
    #[must_use]
    pub fn capture_all(&self) -> Option<Record> {
        self.capture_filtered(|_, entry| entry.value.is_some())
    }

    fn capture_filtered(&self, mut include: impl FnMut(&str, &Entry) -> bool) -> Option<Record> {
        let captured: Vec<(String, Record)> = self
            .entries
            .iter()
            .filter(|(name, entry)| include(&**name, entry))
            .map(|(name, entry)| {
                let value = entry.value.clone().unwrap_or(Record::Tombstone);
                (String::from(&**name), value)
            })
            .collect();
        if captured.is_empty() {
            None
        } else {
            log::trace!("captured {} attribute entries", captured.len());
            Some(Record::Entries(captured))
        }
    }
}

impl StateManager for AttributeStore {
    fn track(&mut self) {
        self.tracking = true;
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn capture(&self) -> Option<Record> {
        self.capture_filtered(|_, entry| entry.dirty)
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        let entries = match record {
            None => return Ok(()),
            Some(Record::Entries(entries)) => entries,
            Some(other) => {
                return Err(StateShapeMismatch::kind(RecordKind::Entries, other.kind()));
            }
        };
        for (name, value) in entries {
            if value.is_tombstone() {
                // Applied as a deletion; tombstones are never stored on restore.
                if let Ok(idx) = self.find(&name) {
                    self.entries.remove(idx);
                }
            } else {
                self.write(Cow::Owned(name), Some(value), false);
            }
        }
        Ok(())
    }

    fn mark_all_dirty(&mut self) {
        for (_, entry) in &mut self.entries {
            entry.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use holdover_record::MismatchKind;

    use crate::policy::KeyFilter;

    const TEXT: StateKey<String> = StateKey::new("Text", String::new);
    const WIDTH: StateKey<i32> = StateKey::new("Width", || 0);
    const VISIBLE: StateKey<bool> = StateKey::new("Visible", || true);

    fn entries(pairs: &[(&str, Record)]) -> Option<Record> {
        Some(Record::Entries(
            pairs
                .iter()
                .map(|(k, v)| (String::from(*k), v.clone()))
                .collect(),
        ))
    }

    #[test]
    fn absent_key_reads_default() {
        let store = AttributeStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(TEXT), "");
        assert!(store.get(VISIBLE));
        assert!(!store.contains(TEXT));
    }

    #[test]
    fn explicit_default_is_distinguishable() {
        let mut store = AttributeStore::new();
        store.set(WIDTH, 0);
        assert!(store.contains(WIDTH));
        assert_eq!(store.get(WIDTH), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn writes_before_tracking_are_clean() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "a".into());
        assert!(!store.is_dirty("Text"));
        store.track();
        assert_eq!(store.capture(), None);
    }

    #[test]
    fn same_value_write_is_still_dirty() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "a".into());
        store.track();
        store.set(TEXT, "a".into());
        assert!(store.is_dirty("Text"));
        assert_eq!(store.capture(), entries(&[("Text", Record::Str("a".into()))]));
    }

    #[test]
    fn track_is_idempotent() {
        let mut store = AttributeStore::new();
        store.track();
        store.set(WIDTH, 3);
        store.track();
        assert!(store.is_tracking());
        assert!(store.is_dirty("Width"));
    }

    #[test]
    fn capture_is_key_ordered() {
        let mut store = AttributeStore::new();
        store.track();
        store.set(WIDTH, 5);
        store.set(TEXT, "t".into());
        store.set(VISIBLE, false);
        assert_eq!(
            store.capture(),
            entries(&[
                ("Text", Record::Str("t".into())),
                ("Visible", Record::Bool(false)),
                ("Width", Record::Int(5)),
            ])
        );
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["Text", "Visible", "Width"]);
    }

    #[test]
    fn remove_while_tracking_leaves_tombstone() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "Name".into());
        store.track();
        assert_eq!(store.remove("Text"), Some(Record::Str("Name".into())));
        assert!(!store.contains(TEXT));
        assert_eq!(store.get(TEXT), "");
        assert_eq!(store.capture(), entries(&[("Text", Record::Tombstone)]));

        // Removing again reports nothing further.
        assert_eq!(store.remove("Text"), None);
    }

    #[test]
    fn remove_before_tracking_drops_entry() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "Name".into());
        assert!(store.reset(TEXT));
        store.track();
        assert_eq!(store.capture(), None);
        assert!(!store.reset(TEXT));
    }

    #[test]
    fn set_after_tombstone_revives_value() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "a".into());
        store.track();
        store.reset(TEXT);
        store.set(TEXT, "b".into());
        assert_eq!(store.get(TEXT), "b");
        assert_eq!(store.capture(), entries(&[("Text", Record::Str("b".into()))]));
    }

    #[test]
    fn set_record_tombstone_means_remove() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "a".into());
        store.track();
        store.set_record("Text", Record::Tombstone);
        assert!(!store.contains(TEXT));
        assert_eq!(store.capture(), entries(&[("Text", Record::Tombstone)]));
    }

    #[test]
    fn restore_inserts_clean_entries() {
        let mut store = AttributeStore::new();
        store.track();
        store
            .restore(entries(&[("Text", Record::Str("x".into())), ("Width", Record::Int(9))]))
            .unwrap();
        assert_eq!(store.get(TEXT), "x");
        assert_eq!(store.get(WIDTH), 9);
        assert!(!store.has_dirty());
        assert_eq!(store.capture(), None);
    }

    #[test]
    fn restore_overwrites_baseline_key_by_key() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "markup".into());
        store.set(WIDTH, 1);
        store.restore(entries(&[("Width", Record::Int(2))])).unwrap();
        assert_eq!(store.get(TEXT), "markup");
        assert_eq!(store.get(WIDTH), 2);
    }

    #[test]
    fn restore_tombstone_deletes() {
        let mut store = AttributeStore::new();
        store.restore(entries(&[("Text", Record::Str("Name".into()))])).unwrap();
        store.restore(entries(&[("Text", Record::Tombstone)])).unwrap();
        assert!(!store.contains(TEXT));
        assert_eq!(store.get(TEXT), "");
        store.track();
        assert_eq!(store.capture(), None);
    }

    #[test]
    fn restore_none_is_noop() {
        let mut store = AttributeStore::new();
        store.set(WIDTH, 4);
        store.restore(None).unwrap();
        assert_eq!(store.get(WIDTH), 4);
    }

    #[test]
    fn restore_wrong_kind_is_mismatch() {
        let mut store = AttributeStore::new();
        let err = store.restore(Some(Record::Int(1))).unwrap_err();
        assert_eq!(
            err.mismatch(),
            &MismatchKind::Kind {
                expected: RecordKind::Entries,
                found: RecordKind::Int,
            }
        );
    }

    #[test]
    fn typed_read_of_wrong_kind() {
        let mut store = AttributeStore::new();
        store.set_record("Width", Record::Str("wide".into()));
        assert_eq!(store.get(WIDTH), 0);
        let err = store.try_get(WIDTH).unwrap_err();
        assert_eq!(err.path(), &[holdover_record::PathSegment::Key("Width".into())]);
    }

    #[test]
    fn dirty_overrides() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "a".into());
        store.set(WIDTH, 1);
        store.track();
        assert!(store.set_dirty("Width", true));
        assert!(!store.set_dirty("Missing", true));
        assert_eq!(store.capture(), entries(&[("Width", Record::Int(1))]));

        store.mark_all_dirty();
        assert_eq!(
            store.capture(),
            entries(&[("Text", Record::Str("a".into())), ("Width", Record::Int(1))])
        );

        store.set_dirty("Text", false);
        store.set_dirty("Width", false);
        assert_eq!(store.capture(), None);
    }

    #[test]
    fn capture_all_ignores_dirty_state() {
        let mut store = AttributeStore::new();
        store.set(TEXT, "a".into());
        store.set(WIDTH, 1);
        store.track();
        store.reset(WIDTH);
        assert_eq!(store.capture_all(), entries(&[("Text", Record::Str("a".into()))]));
    }

    struct Cx {
        subscriber: bool,
        read_only: bool,
    }

    #[test]
    fn capture_with_force_and_suppress() {
        let policies = PolicySet::new()
            .suppress_if(KeyFilter::All, |cx: &Cx| cx.read_only)
            .force_if(KeyFilter::Only(&["Text"]), |cx: &Cx| cx.subscriber);

        let mut store = AttributeStore::new();
        store.set(TEXT, "clean".into());
        store.track();
        store.set(WIDTH, 7);

        let plain = Cx {
            subscriber: false,
            read_only: false,
        };
        assert_eq!(
            store.capture_with(&policies, &plain),
            entries(&[("Width", Record::Int(7))])
        );

        let subscribed = Cx {
            subscriber: true,
            read_only: false,
        };
        assert_eq!(
            store.capture_with(&policies, &subscribed),
            entries(&[("Text", Record::Str("clean".into())), ("Width", Record::Int(7))])
        );

        let read_only = Cx {
            subscriber: true,
            read_only: true,
        };
        assert_eq!(store.capture_with(&policies, &read_only), None);
    }

    #[test]
    fn forcing_an_absent_key_includes_nothing() {
        let policies = PolicySet::new().force_if(KeyFilter::All, |_: &()| true);
        let mut store = AttributeStore::new();
        store.track();
        assert_eq!(store.capture_with(&policies, &()), None);
    }

    #[test]
    fn clone_preserves_entries_and_tracking() {
        let mut store = AttributeStore::new();
        store.track();
        store.set(TEXT, "a".into());
        let cloned = store.clone();
        assert!(cloned.is_tracking());
        assert_eq!(cloned.capture(), store.capture());
    }

    #[test]
    fn many_keys_binary_search() {
        let mut store = AttributeStore::new();
        let names: Vec<String> = (0..20).map(|i| alloc::format!("Prop{i:02}")).collect();
        for (i, name) in names.iter().enumerate() {
            if i % 2 == 0 {
                store.set_record(name.clone(), Record::Int(i64::try_from(i).unwrap()));
            }
        }
        for (i, name) in names.iter().enumerate() {
            if i % 2 == 0 {
                let expected = Record::Int(i64::try_from(i).unwrap());
                assert_eq!(store.get_record(name), Some(&expected));
            } else {
                assert!(store.get_record(name).is_none());
            }
        }
        assert_eq!(store.len(), 10);
    }
}
