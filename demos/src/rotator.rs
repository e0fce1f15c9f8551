// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A banner that shows one of several weighted advertisements per request.
//!
//! The random generator is passed in by the caller; the host decides whether
//! it is per-request, per-thread, or seeded for tests.

use rand::Rng;

use holdover_record::{Record, StateShapeMismatch};
use holdover_store::{AttributeStore, StateKey, StateManager};

/// Only advertisements with this keyword are shown; empty shows all.
pub const KEYWORD_FILTER: StateKey<String> = StateKey::new("KeywordFilter", String::new);
/// Browser target for the advertisement link.
pub const TARGET: StateKey<String> = StateKey::new("Target", || String::from("_top"));

/// One advertisement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ad {
    /// Banner image.
    pub image_url: String,
    /// Link destination.
    pub navigate_url: String,
    /// Keyword matched against the filter.
    pub keyword: String,
    /// Relative weight; zero never shows.
    pub impressions: u32,
}

impl Ad {
    /// Creates an advertisement with a weight of one.
    #[must_use]
    pub fn new(image_url: impl Into<String>, navigate_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            navigate_url: navigate_url.into(),
            keyword: String::new(),
            impressions: 1,
        }
    }

    /// Sets the keyword, builder style.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Sets the weight, builder style.
    #[must_use]
    pub fn with_impressions(mut self, impressions: u32) -> Self {
        self.impressions = impressions;
        self
    }
}

/// Picks a weighted advertisement from a fixed list.
///
/// The list itself comes from configuration on every request; only the
/// properties set on the rotator are persisted.
#[derive(Clone, Debug)]
pub struct Rotator {
    state: AttributeStore,
    ads: Vec<Ad>,
}

impl Rotator {
    /// Creates a rotator over `ads`.
    #[must_use]
    pub fn new(ads: Vec<Ad>) -> Self {
        Self {
            state: AttributeStore::new(),
            ads,
        }
    }

    /// The keyword filter.
    #[must_use]
    pub fn keyword_filter(&self) -> String {
        self.state.get(KEYWORD_FILTER)
    }

    /// Sets the keyword filter.
    pub fn set_keyword_filter(&mut self, keyword: impl Into<String>) {
        self.state.set(KEYWORD_FILTER, keyword.into());
    }

    /// The link target.
    #[must_use]
    pub fn target(&self) -> String {
        self.state.get(TARGET)
    }

    /// Sets the link target.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.state.set(TARGET, target.into());
    }

    /// Picks an advertisement matching the filter, weighted by impressions.
    ///
    /// Returns `None` if nothing matches or every match has zero weight.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Ad> {
        let filter = self.keyword_filter();
        let candidates: Vec<&Ad> = self
            .ads
            .iter()
            .filter(|ad| filter.is_empty() || ad.keyword == filter)
            .filter(|ad| ad.impressions > 0)
            .collect();
        let total: u64 = candidates.iter().map(|ad| u64::from(ad.impressions)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.random_range(0..total);
        for ad in candidates {
            let weight = u64::from(ad.impressions);
            if roll < weight {
                return Some(ad);
            }
            roll -= weight;
        }
        None
    }
}

impl StateManager for Rotator {
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
