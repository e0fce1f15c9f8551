// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Holdover Store: dirty-tracking state holders for a single component.
//!
//! A component keeps the properties it wants carried from one request to the
//! next in a state holder. Holders record which values changed after
//! [`StateManager::track`] was called, so a capture contains only the delta
//! from the component's declarative baseline.
//!
//! ## Core Concepts
//!
//! - [`AttributeStore`]: a key→value map with per-entry dirty bits and
//!   tombstones for removals.
//! - [`BitFlagSet`]: one "explicitly set" bit per property of a
//!   [`bitflags`] type.
//! - [`FlaggedStore`]: the two combined, with flags gating lookups.
//! - [`PolicySet`]: capture-time rules that force or suppress keys based on
//!   component context.
//! - [`StateManager`]: the capture/restore protocol every holder implements.
//!
//! ## Quick Start
//!
//! ```rust
//! use holdover_store::{AttributeStore, StateKey, StateManager};
//!
//! const DATA_FIELD: StateKey<String> = StateKey::new("DataField", String::new);
//!
//! // First request: markup sets a baseline, then business logic clears it.
//! let mut first = AttributeStore::new();
//! first.set(DATA_FIELD, "Name".into());
//! first.track();
//! first.reset(DATA_FIELD);
//! let captured = first.capture();
//!
//! // Second request: the same baseline, then the captured delta.
//! let mut second = AttributeStore::new();
//! second.set(DATA_FIELD, "Name".into());
//! second.restore(captured).unwrap();
//! second.track();
//! assert_eq!(second.get(DATA_FIELD), "");
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod flagged;
mod flags;
mod key;
mod manager;
mod policy;
mod store;

pub use flagged::FlaggedStore;
pub use flags::BitFlagSet;
pub use key::StateKey;
pub use manager::{PersistScope, StateManager};
pub use policy::{ForceIf, Inclusion, KeyFilter, PersistPolicy, PolicySet, SuppressIf};
pub use store::AttributeStore;
