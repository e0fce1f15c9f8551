// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A visual style whose properties are tracked with one flag bit each.

use bitflags::bitflags;
use holdover_record::{Record, StateShapeMismatch};
use holdover_store::{FlaggedStore, StateKey, StateManager};

bitflags! {
    /// One bit per style property.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct StyleProps: u32 {
        /// Background color.
        const BACK_COLOR = 1 << 0;
        /// Foreground color.
        const FORE_COLOR = 1 << 1;
        /// CSS class name.
        const CSS_CLASS = 1 << 2;
        /// Border width in pixels.
        const BORDER_WIDTH = 1 << 3;
        /// Bold font.
        const FONT_BOLD = 1 << 4;
    }
}

const BACK_COLOR: StateKey<String> = StateKey::new("BackColor", String::new);
const FORE_COLOR: StateKey<String> = StateKey::new("ForeColor", String::new);
const CSS_CLASS: StateKey<String> = StateKey::new("CssClass", String::new);
const BORDER_WIDTH: StateKey<i32> = StateKey::new("BorderWidth", || 0);
const FONT_BOLD: StateKey<bool> = StateKey::new("Font_Bold", || false);

/// Style properties shared by headers, rows, and pagers.
#[derive(Debug, Default)]
pub struct Style {
    props: FlaggedStore<StyleProps>,
}

impl Style {
    /// Creates a style with every property at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no property has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.flags().set_bits().is_empty()
    }

    /// Background color.
    #[must_use]
    pub fn back_color(&self) -> String {
        self.props.get(StyleProps::BACK_COLOR, BACK_COLOR)
    }

    /// Sets the background color.
    pub fn set_back_color(&mut self, color: impl Into<String>) {
        self.props
            .set(StyleProps::BACK_COLOR, BACK_COLOR, color.into());
    }

    /// Foreground color.
    #[must_use]
    pub fn fore_color(&self) -> String {
        self.props.get(StyleProps::FORE_COLOR, FORE_COLOR)
    }

    /// Sets the foreground color.
    pub fn set_fore_color(&mut self, color: impl Into<String>) {
        self.props
            .set(StyleProps::FORE_COLOR, FORE_COLOR, color.into());
    }

    /// CSS class name.
    #[must_use]
    pub fn css_class(&self) -> String {
        self.props.get(StyleProps::CSS_CLASS, CSS_CLASS)
    }

    /// Sets the CSS class name.
    pub fn set_css_class(&mut self, class: impl Into<String>) {
        self.props.set(StyleProps::CSS_CLASS, CSS_CLASS, class.into());
    }

    /// Border width in pixels.
    #[must_use]
    pub fn border_width(&self) -> i32 {
        self.props.get(StyleProps::BORDER_WIDTH, BORDER_WIDTH)
    }

    /// Sets the border width.
    pub fn set_border_width(&mut self, width: i32) {
        self.props.set(StyleProps::BORDER_WIDTH, BORDER_WIDTH, width);
    }

    /// Whether the font is bold.
    #[must_use]
    pub fn font_bold(&self) -> bool {
        self.props.get(StyleProps::FONT_BOLD, FONT_BOLD)
    }

    /// Sets the bold font.
    pub fn set_font_bold(&mut self, bold: bool) {
        self.props.set(StyleProps::FONT_BOLD, FONT_BOLD, bold);
    }

    /// Copies every property set on `other` but not on `self`.
    pub fn merge_with(&mut self, other: &Self) {
        let missing = other.props.flags().set_bits() - self.props.flags().set_bits();
        if missing.contains(StyleProps::BACK_COLOR) {
            self.set_back_color(other.back_color());
        }
        if missing.contains(StyleProps::FORE_COLOR) {
            self.set_fore_color(other.fore_color());
        }
        if missing.contains(StyleProps::CSS_CLASS) {
            self.set_css_class(other.css_class());
        }
        if missing.contains(StyleProps::BORDER_WIDTH) {
            self.set_border_width(other.border_width());
        }
        if missing.contains(StyleProps::FONT_BOLD) {
            self.set_font_bold(other.font_bold());
        }
    }

    /// Resets every property to its default.
    pub fn reset(&mut self) {
        self.props.reset(StyleProps::BACK_COLOR, BACK_COLOR);
        self.props.reset(StyleProps::FORE_COLOR, FORE_COLOR);
        self.props.reset(StyleProps::CSS_CLASS, CSS_CLASS);
        self.props.reset(StyleProps::BORDER_WIDTH, BORDER_WIDTH);
        self.props.reset(StyleProps::FONT_BOLD, FONT_BOLD);
    }
}

impl StateManager for Style {
    fn track(&mut self) {
        self.props.track();
    }

    fn is_tracking(&self) -> bool {
        self.props.is_tracking()
    }

    fn capture(&self) -> Option<Record> {
        self.props.capture()
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        self.props.restore(record)
    }

    fn mark_all_dirty(&mut self) {
        self.props.mark_all_dirty();
    }
}
