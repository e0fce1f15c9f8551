// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for capturing, restoring, and encoding state trees.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use bitflags::bitflags;
use holdover_node::{CompositeNode, ItemList, restore_blob};
use holdover_record::{BinaryCodec, Record, SnapshotCodec, TextCodec};
use holdover_store::{AttributeStore, FlaggedStore, StateKey, StateManager};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct Props: u32 {
        const COLOR = 1 << 0;
        const WIDTH = 1 << 1;
    }
}

const COLOR: StateKey<String> = StateKey::new("Color", String::new);
const WIDTH: StateKey<i32> = StateKey::new("Width", || 0);
const TEXT: StateKey<String> = StateKey::new("Text", String::new);
const SELECTED: StateKey<bool> = StateKey::new("Selected", || false);

type Rows = ItemList<AttributeStore>;

fn tree() -> CompositeNode {
    CompositeNode::default()
        .with_child("Style", FlaggedStore::<Props>::new)
        .with_child("Rows", || ItemList::new(AttributeStore::new))
}

/// A tracked tree with `rows` rows, every tenth one selected after tracking.
fn populated(rows: usize) -> CompositeNode {
    let mut node = tree();
    let list = node.ensure_child::<Rows>("Rows").unwrap();
    for i in 0..rows {
        let mut row = AttributeStore::new();
        row.set(TEXT, format!("row {i}"));
        list.push(row).unwrap();
    }
    node.track();

    let style = node.ensure_child::<FlaggedStore<Props>>("Style").unwrap();
    style.set(Props::COLOR, COLOR, "Navy".into());
    style.set(Props::WIDTH, WIDTH, 2);
    let list = node.ensure_child::<Rows>("Rows").unwrap();
    for i in (0..rows).step_by(10) {
        list.get_mut(i).unwrap().set(SELECTED, true);
    }
    node
}

fn full_record(rows: usize) -> Record {
    let mut node = populated(rows);
    node.mark_all_dirty();
    node.capture().unwrap()
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");
    for rows in [10_usize, 100, 1000] {
        let sparse = populated(rows);
        group.bench_with_input(BenchmarkId::new("sparse", rows), &sparse, |b, node| {
            b.iter(|| black_box(node.capture()));
        });

        let mut full = populated(rows);
        full.mark_all_dirty();
        group.bench_with_input(BenchmarkId::new("full", rows), &full, |b, node| {
            b.iter(|| black_box(node.capture()));
        });
    }
    group.finish();
}

fn bench_restore(c: &mut Criterion) {
    let mut group = c.benchmark_group("restore");
    for rows in [10_usize, 100, 1000] {
        let record = full_record(rows);
        group.bench_with_input(BenchmarkId::new("rebuild", rows), &record, |b, record| {
            b.iter_batched(
                || (tree(), record.clone()),
                |(mut node, record)| {
                    node.restore(Some(record)).unwrap();
                    black_box(node)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let record = full_record(100);
    let binary = BinaryCodec::new();
    let text = TextCodec::new(BinaryCodec::new());

    group.bench_function("binary_encode", |b| {
        b.iter(|| black_box(binary.encode(&record).unwrap()));
    });
    group.bench_function("text_encode", |b| {
        b.iter(|| black_box(text.encode(&record).unwrap()));
    });

    let binary_blob = binary.encode(&record).unwrap();
    let text_blob = text.encode(&record).unwrap();
    group.bench_function("binary_decode", |b| {
        b.iter(|| black_box(binary.decode(&binary_blob).unwrap()));
    });
    group.bench_function("text_decode", |b| {
        b.iter(|| black_box(text.decode(&text_blob).unwrap()));
    });

    group.bench_function("text_restore_blob", |b| {
        b.iter_batched(
            tree,
            |mut node| {
                restore_blob(&mut node, Some(text_blob.as_slice()), &text).unwrap();
                black_box(node)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_capture, bench_restore, bench_codecs);
criterion_main!(benches);
