// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `holdover_store` crate.
//!
//! These drive holders through full request cycles: restore, track, mutate,
//! capture, and encode, then replay the blob into a fresh holder.

use bitflags::bitflags;
use holdover_record::{BinaryCodec, Record, SnapshotCodec};
use holdover_store::{
    AttributeStore, BitFlagSet, FlaggedStore, KeyFilter, PolicySet, StateKey, StateManager,
};

const DATA_FIELD: StateKey<String> = StateKey::new("DataField", String::new);
const HEADER_TEXT: StateKey<String> = StateKey::new("HeaderText", String::new);
const VISIBLE: StateKey<bool> = StateKey::new("Visible", || true);

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct StyleProps: u32 {
        const BACK_COLOR = 1 << 0;
        const BORDER_WIDTH = 1 << 1;
        const CSS_CLASS = 1 << 2;
    }
}

const CSS_CLASS: StateKey<String> = StateKey::new("CssClass", String::new);
const BORDER_WIDTH: StateKey<i32> = StateKey::new("BorderWidth", || 0);

/// Builds a store the way markup would, before any state is applied.
fn field_with_markup() -> AttributeStore {
    let mut store = AttributeStore::new();
    store.set(DATA_FIELD, "Name".into());
    store.set(HEADER_TEXT, "Customer".into());
    store
}

fn replay(record: Option<Record>) -> AttributeStore {
    let codec = BinaryCodec::new();
    let record = record.map(|r| codec.decode(&codec.encode(&r).unwrap()).unwrap());
    let mut store = field_with_markup();
    store.restore(record).unwrap();
    store.track();
    store
}

#[test]
fn round_trip_reproduces_values() {
    let mut first = field_with_markup();
    first.track();
    first.set(HEADER_TEXT, "Client".into());
    first.set(VISIBLE, false);

    let second = replay(first.capture());
    assert_eq!(second.get(HEADER_TEXT), "Client");
    assert!(!second.get(VISIBLE));
    assert_eq!(second.get(DATA_FIELD), "Name");
}

#[test]
fn restored_tracked_store_captures_nothing() {
    let mut first = field_with_markup();
    first.track();
    first.set(HEADER_TEXT, "Client".into());

    let second = replay(first.capture());
    assert_eq!(second.capture(), None);
}

#[test]
fn tombstone_survives_a_request() {
    let mut first = field_with_markup();
    first.track();
    first.reset(DATA_FIELD);
    assert_eq!(
        first.capture(),
        Some(Record::Entries(vec![("DataField".into(), Record::Tombstone)]))
    );

    let second = replay(first.capture());
    assert_eq!(second.get(DATA_FIELD), "");
    assert!(!second.contains(DATA_FIELD));
}

#[test]
fn bit_flags_stick_when_restored_during_tracking() {
    let mut first = BitFlagSet::<StyleProps>::new();
    first.track();
    first.mark_set(StyleProps::CSS_CLASS);
    let record = first.capture();

    let mut second = BitFlagSet::<StyleProps>::new();
    second.track();
    second.restore(record.clone()).unwrap();
    assert_eq!(second.capture(), record);
}

#[test]
fn flagged_store_round_trip() {
    let mut first = FlaggedStore::<StyleProps>::new();
    first.set(StyleProps::BORDER_WIDTH, BORDER_WIDTH, 1);
    first.track();
    first.set(StyleProps::CSS_CLASS, CSS_CLASS, "grid".into());
    first.reset(StyleProps::BORDER_WIDTH, BORDER_WIDTH);

    let mut second = FlaggedStore::<StyleProps>::new();
    second.set(StyleProps::BORDER_WIDTH, BORDER_WIDTH, 1);
    second.restore(first.capture()).unwrap();
    second.track();

    assert_eq!(second.get(StyleProps::CSS_CLASS, CSS_CLASS), "grid");
    assert_eq!(second.get(StyleProps::BORDER_WIDTH, BORDER_WIDTH), 0);
    assert!(!second.is_set(StyleProps::BORDER_WIDTH));
    assert!(!second.is_set(StyleProps::BACK_COLOR));
    assert_eq!(second.capture(), None);
}

struct CheckBoxContext {
    has_subscriber: bool,
    enabled: bool,
}

#[test]
fn policies_apply_only_at_capture() {
    const CHECKED: StateKey<bool> = StateKey::new("Checked", || false);

    let policies = PolicySet::new()
        .force_if(KeyFilter::Only(&["Checked"]), |cx: &CheckBoxContext| {
            cx.has_subscriber || !cx.enabled
        });

    let mut first = AttributeStore::new();
    first.set(CHECKED, true);
    first.track();

    let quiet = CheckBoxContext {
        has_subscriber: false,
        enabled: true,
    };
    assert_eq!(first.capture_with(&policies, &quiet), None);

    let disabled = CheckBoxContext {
        has_subscriber: false,
        enabled: false,
    };
    let record = first.capture_with(&policies, &disabled);
    assert_eq!(
        record,
        Some(Record::Entries(vec![("Checked".into(), Record::Bool(true))]))
    );

    // Restoring does not consult policies.
    let mut second = AttributeStore::new();
    second.restore(record).unwrap();
    assert!(second.get(CHECKED));
}

#[test]
fn holders_as_trait_objects() {
    let mut holders: Vec<Box<dyn StateManager>> = vec![
        Box::new(field_with_markup()),
        Box::new(BitFlagSet::<StyleProps>::new()),
        Box::new(FlaggedStore::<StyleProps>::new()),
    ];
    for holder in &mut holders {
        holder.track();
        assert!(holder.is_tracking());
        assert_eq!(holder.capture(), None);
    }
    holders[0].mark_all_dirty();
    assert!(holders[0].capture().is_some());
}
