// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A data grid with a fixed positional state layout.
//!
//! Slot layout:
//!
//! | slot | contents |
//! |------|----------|
//! | 0 | grid properties |
//! | 1 | header style |
//! | 2 | row style |
//! | 3 | columns |
//! | 4 | paging and sorting |
//! | 5 | data keys of the rendered rows |
//!
//! Styles are created on first use, so a grid that never touches them pays
//! for neither the allocation nor a slot.
//!
//! Slots 4 and 5 are required state: they are written in full on every
//! request, even with persistence switched off, since paging and row commands
//! cannot work without them.

use holdover_node::{ItemList, LazyChild};
use holdover_record::{Record, StateShapeMismatch, StateValue, pack_slots, unpack_slots};
use holdover_store::{AttributeStore, StateKey, StateManager};

use crate::field::BoundField;
use crate::style::Style;

/// Zero-based page shown. Required state.
pub const PAGE_INDEX: StateKey<i32> = StateKey::new("PageIndex", || 0);
/// Rows per page.
pub const PAGE_SIZE: StateKey<i32> = StateKey::new("PageSize", || 10);
/// Current sort, `"<field>"` or `"<field> DESC"`. Required state.
pub const SORT_EXPRESSION: StateKey<String> = StateKey::new("SortExpression", String::new);

const SLOTS: usize = 6;
const DESCENDING: &str = " DESC";

/// A paged, sortable grid of bound columns.
#[derive(Debug)]
pub struct Grid {
    state: AttributeStore,
    header_style: LazyChild<Style>,
    row_style: LazyChild<Style>,
    columns: ItemList<BoundField>,
    required: AttributeStore,
    data_keys: Vec<String>,
    tracking: bool,
    enabled: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Creates a grid with no columns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AttributeStore::new(),
            header_style: LazyChild::new(Style::new),
            row_style: LazyChild::new(Style::new),
            columns: ItemList::new(BoundField::new),
            required: AttributeStore::new(),
            data_keys: Vec::new(),
            tracking: false,
            enabled: true,
        }
    }

    /// Returns `true` unless persistence is switched off.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switches persistence of properties, styles, and columns. Paging,
    /// sorting, and data keys persist either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Appends a column bound to `data_field` and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeMismatch`] if state restored for this column does
    /// not fit a bound field.
    pub fn add_column(&mut self, data_field: &str) -> Result<usize, StateShapeMismatch> {
        self.columns.push(BoundField::for_field(data_field))
    }

    /// The columns.
    #[must_use]
    pub fn columns(&self) -> &ItemList<BoundField> {
        &self.columns
    }

    /// The column at `index`, mutably.
    pub fn column_mut(&mut self, index: usize) -> Option<&mut BoundField> {
        self.columns.get_mut(index)
    }

    /// Removes the column at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_column(&mut self, index: usize) -> BoundField {
        self.columns.remove(index)
    }

    /// The header style, if it was ever touched.
    #[must_use]
    pub fn header_style(&self) -> Option<&Style> {
        self.header_style.get()
    }

    /// The header style, created on first use.
    pub fn header_style_mut(&mut self) -> &mut Style {
        self.header_style.get_or_create()
    }

    /// The row style, if it was ever touched.
    #[must_use]
    pub fn row_style(&self) -> Option<&Style> {
        self.row_style.get()
    }

    /// The row style, created on first use.
    pub fn row_style_mut(&mut self) -> &mut Style {
        self.row_style.get_or_create()
    }

    /// The page shown.
    #[must_use]
    pub fn page_index(&self) -> usize {
        usize::try_from(self.required.get(PAGE_INDEX)).unwrap_or(0)
    }

    /// Shows page `index`. Values beyond `i32::MAX` are clamped.
    pub fn set_page_index(&mut self, index: usize) {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        self.required.set(PAGE_INDEX, index);
    }

    /// Rows per page, at least one.
    #[must_use]
    pub fn page_size(&self) -> usize {
        usize::try_from(self.state.get(PAGE_SIZE))
            .unwrap_or(1)
            .max(1)
    }

    /// Sets the rows per page.
    pub fn set_page_size(&mut self, size: usize) {
        let size = i32::try_from(size.max(1)).unwrap_or(i32::MAX);
        self.state.set(PAGE_SIZE, size);
    }

    /// Number of pages needed for `row_count` rows.
    #[must_use]
    pub fn page_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size())
    }

    /// The current sort expression.
    #[must_use]
    pub fn sort_expression(&self) -> String {
        self.required.get(SORT_EXPRESSION)
    }

    /// Sorts by `field`, toggling direction when it is already the sort
    /// field. Returns the new sort expression.
    ///
    /// Changing the sort returns to the first page.
    pub fn sort(&mut self, field: &str) -> String {
        let current = self.sort_expression();
        let expression = if current == field {
            let mut descending = String::from(field);
            descending.push_str(DESCENDING);
            descending
        } else {
            String::from(field)
        };
        log::debug!("grid sort {current:?} -> {expression:?}");
        self.required.set(SORT_EXPRESSION, expression.clone());
        self.required.reset(PAGE_INDEX);
        expression
    }

    /// Keys of the rows rendered by the last data bind.
    #[must_use]
    pub fn data_keys(&self) -> &[String] {
        &self.data_keys
    }

    /// Records the keys of the rows just bound.
    pub fn set_data_keys(&mut self, keys: Vec<String>) {
        self.data_keys = keys;
    }

    fn capture_data_keys(&self) -> Option<Record> {
        (!self.data_keys.is_empty()).then(|| self.data_keys.to_record())
    }
}

impl StateManager for Grid {
    fn track(&mut self) {
        self.tracking = true;
        self.state.track();
        self.header_style.track();
        self.row_style.track();
        self.columns.track();
        self.required.track();
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn capture(&self) -> Option<Record> {
        let required = [self.required.capture_all(), self.capture_data_keys()];
        if !self.enabled {
            return pack_slots([None, None, None, None].into_iter().chain(required));
        }
        let slots: [Option<Record>; SLOTS - 2] = [
            self.state.capture(),
            self.header_style.capture(),
            self.row_style.capture(),
            self.columns.capture(),
        ];
        pack_slots(slots.into_iter().chain(required))
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        let [own, header, rows, columns, required, keys] = unpack_slots::<SLOTS>(record)?;
        self.required.restore(required).map_err(|e| e.in_slot(4))?;
        if let Some(keys) = keys {
            self.data_keys = Vec::from_record(&keys).map_err(|e| e.in_slot(5))?;
        }
        if !self.enabled {
            return Ok(());
        }
        self.state.restore(own).map_err(|e| e.in_slot(0))?;
        self.header_style.restore(header).map_err(|e| e.in_slot(1))?;
        self.row_style.restore(rows).map_err(|e| e.in_slot(2))?;
        self.columns.restore(columns).map_err(|e| e.in_slot(3))
    }

    fn mark_all_dirty(&mut self) {
        self.state.mark_all_dirty();
        self.header_style.mark_all_dirty();
        self.row_style.mark_all_dirty();
        self.columns.mark_all_dirty();
    }
}
