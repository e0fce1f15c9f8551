// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A data-bound grid column.

use holdover_record::{Record, StateShapeMismatch};
use holdover_store::{AttributeStore, StateKey, StateManager};

/// Name of the data field the column displays.
pub const DATA_FIELD: StateKey<String> = StateKey::new("DataField", String::new);
/// Column header.
pub const HEADER_TEXT: StateKey<String> = StateKey::new("HeaderText", String::new);
/// Text shown for missing values.
pub const NULL_DISPLAY_TEXT: StateKey<String> = StateKey::new("NullDisplayText", String::new);
/// Whether the column is excluded from edits.
pub const READ_ONLY: StateKey<bool> = StateKey::new("ReadOnly", || false);

/// A column bound to one field of the data source.
#[derive(Clone, Debug, Default)]
pub struct BoundField {
    state: AttributeStore,
}

impl BoundField {
    /// Creates a column with every property at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a column for `data_field`, as markup would.
    #[must_use]
    pub fn for_field(data_field: impl Into<String>) -> Self {
        let mut field = Self::new();
        field.set_data_field(data_field);
        field
    }

    /// The bound data field.
    #[must_use]
    pub fn data_field(&self) -> String {
        self.state.get(DATA_FIELD)
    }

    /// Binds the column to a data field.
    pub fn set_data_field(&mut self, name: impl Into<String>) {
        self.state.set(DATA_FIELD, name.into());
    }

    /// Unbinds the column, restoring the default.
    pub fn reset_data_field(&mut self) {
        self.state.reset(DATA_FIELD);
    }

    /// The header, falling back to the data field name.
    #[must_use]
    pub fn header_text(&self) -> String {
        if self.state.contains(HEADER_TEXT) {
            self.state.get(HEADER_TEXT)
        } else {
            self.data_field()
        }
    }

    /// Sets the header.
    pub fn set_header_text(&mut self, text: impl Into<String>) {
        self.state.set(HEADER_TEXT, text.into());
    }

    /// Sets the text shown for missing values.
    pub fn set_null_display_text(&mut self, text: impl Into<String>) {
        self.state.set(NULL_DISPLAY_TEXT, text.into());
    }

    /// Whether the column is read-only.
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.state.get(READ_ONLY)
    }

    /// Sets whether the column is read-only.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.state.set(READ_ONLY, read_only);
    }

    /// Formats a cell value for display.
    #[must_use]
    pub fn format_value(&self, value: Option<&str>) -> String {
        match value {
            Some(value) => String::from(value),
            None => self.state.get(NULL_DISPLAY_TEXT),
        }
    }
}

impl StateManager for BoundField {
    fn track(&mut self) {
        self.state.track();
    }

    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn capture(&self) -> Option<Record> {
        self.state.capture()
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        self.state.restore(record)
    }

    fn mark_all_dirty(&mut self) {
        self.state.mark_all_dirty();
    }
}
