// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample components built on the holdover state engine.
//!
//! Each component owns its state through the engine's building blocks and
//! implements [`StateManager`](holdover_store::StateManager), so a host can
//! carry it across requests with one capture and one restore:
//!
//! - [`Grid`]: a fixed positional layout with lazily created styles and a
//!   column list.
//! - [`CheckList`]: a selection that is persisted only when the client will
//!   not post it back.
//! - [`Style`]: properties tracked with one flag bit each.
//! - [`BoundField`]: a plain attribute store with a reset-to-default
//!   property.
//! - [`Rotator`]: persisted settings with a weighted random pick.
//!
//! Run the request walkthrough with:
//! - `cargo run -p holdover_demos --example two_requests`

mod check_list;
mod field;
mod grid;
mod rotator;
mod style;

pub use check_list::{CheckList, CheckListContext, ListItem};
pub use field::{BoundField, DATA_FIELD, HEADER_TEXT, NULL_DISPLAY_TEXT, READ_ONLY};
pub use grid::{Grid, PAGE_INDEX, PAGE_SIZE, SORT_EXPRESSION};
pub use rotator::{Ad, KEYWORD_FILTER, Rotator, TARGET};
pub use style::{Style, StyleProps};
