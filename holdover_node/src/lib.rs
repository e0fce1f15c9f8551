// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Holdover Node: composite state trees.
//!
//! A component tree persists its state as one positional record per node:
//! the node's own holder in slot 0, then one slot per child in a fixed order.
//! Children that were never created, or that have nothing to persist,
//! contribute an empty slot, and trailing empty slots are trimmed, so an
//! untouched tree captures nothing at all.
//!
//! ## Core Concepts
//!
//! - [`CompositeNode`]: own state plus named, lazily created children behind
//!   factories. Restore only creates children whose slot carries state.
//! - [`LazyChild`]: a typed lazy child for components that lay out their
//!   record as a fixed-arity tuple with `pack_slots`/`unpack_slots`.
//! - [`ItemList`]: a variable-length list of item holders with sparse or full
//!   capture.
//! - [`PersistMode`]: per-node opt-in and opt-out of persistence, resolved
//!   against the enclosing [`PersistScope`](holdover_store::PersistScope).
//! - [`restore_blob`] / [`capture_blob`]: the host's per-request entry points.
//!
//! ## Quick Start
//!
//! ```rust
//! use holdover_node::{CompositeNode, capture_blob, restore_blob};
//! use holdover_record::{BinaryCodec, TextCodec};
//! use holdover_store::{AttributeStore, StateKey, StateManager};
//!
//! const PAGE_INDEX: StateKey<i32> = StateKey::new("PageIndex", || 0);
//! const BOLD: StateKey<bool> = StateKey::new("Bold", || false);
//!
//! fn grid() -> CompositeNode {
//!     CompositeNode::default()
//!         .with_child("HeaderStyle", AttributeStore::new)
//!         .with_child("PagerStyle", AttributeStore::new)
//! }
//!
//! let codec = TextCodec::new(BinaryCodec::new());
//!
//! // First request.
//! let mut tree = grid();
//! restore_blob(&mut tree, None, &codec).unwrap();
//! tree.track();
//! tree.own_mut().set(PAGE_INDEX, 3);
//! tree.ensure_child::<AttributeStore>("PagerStyle").unwrap().set(BOLD, true);
//! let blob = capture_blob(&tree, &codec).unwrap();
//!
//! // Second request.
//! let mut tree = grid();
//! restore_blob(&mut tree, blob.as_deref(), &codec).unwrap();
//! tree.track();
//! assert_eq!(tree.own().get(PAGE_INDEX), 3);
//! assert!(!tree.has_child("HeaderStyle"));
//! assert!(tree.child::<AttributeStore>("PagerStyle").unwrap().get(BOLD));
//! assert_eq!(capture_blob(&tree, &codec).unwrap(), None);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod blob;
mod composite;
mod items;
mod lazy;
mod mode;

pub use blob::{capture_blob, restore_blob};
pub use composite::CompositeNode;
pub use items::{ItemList, MAX_RESTORED_ITEMS};
pub use lazy::LazyChild;
pub use mode::PersistMode;
