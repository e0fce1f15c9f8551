// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `holdover_node` crate.
//!
//! These build a grid-like component tree (own store, a flagged style child,
//! a row list, and a nested pager) and drive it through request cycles.

use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;
use holdover_node::{CompositeNode, ItemList, PersistMode, capture_blob, restore_blob};
use holdover_record::{BinaryCodec, Record, SnapshotCodec, TextCodec};
use holdover_store::{AttributeStore, FlaggedStore, StateKey, StateManager};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct StyleProps: u32 {
        const FORE_COLOR = 1 << 0;
        const FONT_BOLD = 1 << 1;
    }
}

const DATA_FIELD: StateKey<String> = StateKey::new("DataField", String::new);
const PAGE_INDEX: StateKey<i32> = StateKey::new("PageIndex", || 0);
const FORE_COLOR: StateKey<String> = StateKey::new("ForeColor", String::new);
const FONT_BOLD: StateKey<bool> = StateKey::new("Font_Bold", || false);
const ROW_TEXT: StateKey<String> = StateKey::new("Text", String::new);
const BUTTON_COUNT: StateKey<i32> = StateKey::new("PageButtonCount", || 10);

type Style = FlaggedStore<StyleProps>;

fn pager() -> CompositeNode {
    CompositeNode::default().with_child("PagerStyle", Style::new)
}

/// Builds the tree the way markup would, before any state is restored.
fn grid() -> CompositeNode {
    let mut node: CompositeNode = CompositeNode::default()
        .with_child("HeaderStyle", Style::new)
        .with_child("Rows", || ItemList::new(AttributeStore::new))
        .with_child("Pager", pager);
    node.own_mut().set(DATA_FIELD, "Name".into());
    node
}

fn add_rows(node: &mut CompositeNode, texts: &[&str]) {
    let rows = node.ensure_child::<ItemList<AttributeStore>>("Rows").unwrap();
    for text in texts {
        let mut row = AttributeStore::new();
        row.set(ROW_TEXT, String::from(*text));
        rows.push(row).unwrap();
    }
}

/// Replays a captured record into a fresh tree through `codec`.
fn next_request(record: Option<Record>, codec: &impl SnapshotCodec) -> CompositeNode {
    let blob = record.map(|r| codec.encode(&r).unwrap());
    let mut node = grid();
    restore_blob(&mut node, blob.as_deref(), codec).unwrap();
    node.track();
    node
}

#[test]
fn fresh_tracked_tree_captures_nothing() {
    let mut node = grid();
    add_rows(&mut node, &["a", "b"]);
    node.track();
    assert_eq!(node.capture(), None);
}

#[test]
fn round_trip_reproduces_every_level() {
    let mut first = grid();
    first.track();
    first.own_mut().set(PAGE_INDEX, 2);
    first
        .ensure_child::<Style>("HeaderStyle")
        .unwrap()
        .set(StyleProps::FORE_COLOR, FORE_COLOR, "Navy".into());
    add_rows(&mut first, &["a", "b"]);
    first
        .ensure_child::<CompositeNode>("Pager")
        .unwrap()
        .own_mut()
        .set(BUTTON_COUNT, 5);

    let second = next_request(first.capture(), &BinaryCodec::new());
    assert_eq!(second.own().get(PAGE_INDEX), 2);
    assert_eq!(second.own().get(DATA_FIELD), "Name");

    let header = second.child::<Style>("HeaderStyle").unwrap();
    assert_eq!(header.get(StyleProps::FORE_COLOR, FORE_COLOR), "Navy");
    assert!(!header.is_set(StyleProps::FONT_BOLD));

    let rows = second.child::<ItemList<AttributeStore>>("Rows").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.get(1).unwrap().get(ROW_TEXT), "b");

    let pager = second.child::<CompositeNode>("Pager").unwrap();
    assert_eq!(pager.own().get(BUTTON_COUNT), 5);
    assert!(!pager.has_child("PagerStyle"));
}

#[test]
fn restored_tracked_tree_captures_nothing() {
    let mut first = grid();
    first.track();
    first.own_mut().set(PAGE_INDEX, 1);
    first
        .ensure_child::<Style>("HeaderStyle")
        .unwrap()
        .set(StyleProps::FONT_BOLD, FONT_BOLD, true);
    add_rows(&mut first, &["a"]);

    let second = next_request(first.capture(), &BinaryCodec::new());
    assert_eq!(second.capture(), None);
}

#[test]
fn one_leaf_change_stays_on_its_path() {
    let mut node = grid();
    add_rows(&mut node, &["a", "b", "c"]);
    node.track();

    node.ensure_child::<CompositeNode>("Pager")
        .unwrap()
        .ensure_child::<Style>("PagerStyle")
        .unwrap()
        .set(StyleProps::FONT_BOLD, FONT_BOLD, true);

    let Some(Record::Slots(slots)) = node.capture() else {
        panic!("expected a positional record");
    };
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0], None);
    assert_eq!(slots[1], None);
    assert_eq!(slots[2], None);

    let Some(Record::Slots(pager)) = &slots[3] else {
        panic!("expected pager state");
    };
    assert_eq!(pager[0], None);
    assert!(pager[1].is_some());
}

#[test]
fn data_field_reset_survives_a_request() {
    let mut first = grid();
    first.track();
    first.own_mut().reset(DATA_FIELD);
    assert_eq!(
        first.capture(),
        Some(Record::Slots(vec![Some(Record::Entries(vec![(
            "DataField".into(),
            Record::Tombstone
        )]))]))
    );

    let second = next_request(first.capture(), &TextCodec::new(BinaryCodec::new()));
    assert_eq!(second.own().get(DATA_FIELD), "");
}

#[test]
fn only_children_with_state_are_created() {
    let created_first = Rc::new(Cell::new(0_u32));
    let created_second = Rc::new(Cell::new(0_u32));

    let build = || {
        let first = Rc::clone(&created_first);
        let second = Rc::clone(&created_second);
        CompositeNode::default()
            .with_child("First", move || {
                first.set(first.get() + 1);
                AttributeStore::new()
            })
            .with_child("Second", move || {
                second.set(second.get() + 1);
                AttributeStore::new()
            })
    };

    let mut node: CompositeNode = build();
    node.track();
    node.ensure_child::<AttributeStore>("Second")
        .unwrap()
        .set(ROW_TEXT, "changed".into());
    let record = node.capture();
    assert_eq!(
        record,
        Some(Record::Slots(vec![
            None,
            None,
            Some(Record::Entries(vec![(
                "Text".into(),
                Record::Str("changed".into())
            )])),
        ]))
    );
    assert_eq!(created_second.get(), 1);

    let mut restored = build();
    restored.restore(record).unwrap();
    assert_eq!(created_first.get(), 0);
    assert_eq!(created_second.get(), 2);
    assert_eq!(
        restored
            .child::<AttributeStore>("Second")
            .unwrap()
            .get(ROW_TEXT),
        "changed"
    );
}

#[test]
fn flags_restored_into_tracking_child_are_sticky() {
    let mut first = grid();
    first.track();
    first
        .ensure_child::<Style>("HeaderStyle")
        .unwrap()
        .set(StyleProps::FORE_COLOR, FORE_COLOR, "Red".into());
    let record = first.capture();

    // Tracking before restore: the restored child starts tracking on
    // creation, so its restored flags are emitted again.
    let mut second = grid();
    second.track();
    second.restore(record).unwrap();
    let Some(Record::Slots(slots)) = second.capture() else {
        panic!("expected sticky flags");
    };
    assert_eq!(
        slots[1],
        Some(Record::Slots(vec![None, Some(Record::Flags(0b01))]))
    );
}

#[test]
fn row_structure_change_is_rebuilt_next_request() {
    let mut first = grid();
    add_rows(&mut first, &["a", "b", "c"]);
    first.track();
    first
        .ensure_child::<ItemList<AttributeStore>>("Rows")
        .unwrap()
        .remove(1);

    let second = next_request(first.capture(), &BinaryCodec::new());
    let rows = second.child::<ItemList<AttributeStore>>("Rows").unwrap();
    let texts: Vec<_> = rows.iter().map(|row| row.get(ROW_TEXT)).collect();
    assert_eq!(texts, ["a", "c"]);
}

#[test]
fn disabled_mode_tree_persists_only_opted_in_children() {
    let mut node = grid().with_mode(PersistMode::Disabled);
    node.track();
    node.own_mut().set(PAGE_INDEX, 4);
    let pager = node.ensure_child::<CompositeNode>("Pager").unwrap();
    pager.set_mode(PersistMode::Enabled);
    pager.own_mut().set(BUTTON_COUNT, 3);

    let second = next_request(node.capture(), &BinaryCodec::new());
    assert_eq!(second.own().get(PAGE_INDEX), 0);
    assert_eq!(
        second
            .child::<CompositeNode>("Pager")
            .unwrap()
            .own()
            .get(BUTTON_COUNT),
        3
    );
}

#[test]
fn disabled_subtree_ignores_everything() {
    let mut node = grid();
    node.track();
    let pager = node.ensure_child::<CompositeNode>("Pager").unwrap();
    pager.set_enabled(false);
    pager.set_mode(PersistMode::Enabled);
    pager.own_mut().set(BUTTON_COUNT, 3);
    assert_eq!(node.capture(), None);
}

#[test]
fn disabled_subtree_keeps_required_state() {
    let mut node = grid();
    node.track();
    let pager = node.ensure_child::<CompositeNode>("Pager").unwrap();
    pager.set_enabled(false);
    pager.own_mut().set(BUTTON_COUNT, 3);
    pager.required_mut().set(PAGE_INDEX, 2);

    let second = next_request(node.capture(), &BinaryCodec::new());
    let pager = second.child::<CompositeNode>("Pager").unwrap();
    assert_eq!(pager.required().get(PAGE_INDEX), 2);
    assert_eq!(pager.own().get(BUTTON_COUNT), 10);

    // Required state is written again on the next, idle request.
    let third = next_request(second.capture(), &BinaryCodec::new());
    let pager = third.child::<CompositeNode>("Pager").unwrap();
    assert_eq!(pager.required().get(PAGE_INDEX), 2);
}

#[test]
fn unchanged_tree_has_no_blob() {
    let mut node = grid();
    node.track();
    assert_eq!(capture_blob(&node, &BinaryCodec::new()).unwrap(), None);
}

#[cfg(feature = "json")]
#[test]
fn json_round_trip() {
    let mut first = grid();
    first.track();
    first.own_mut().set(PAGE_INDEX, 7);
    let second = next_request(first.capture(), &holdover_record::JsonCodec::new());
    assert_eq!(second.own().get(PAGE_INDEX), 7);
}
