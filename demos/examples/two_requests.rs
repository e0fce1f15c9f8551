// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two requests against the same page.
//!
//! The first request builds the page, lets the user sort and restyle the grid,
//! and emits a hidden-field blob. The second request rebuilds the page from
//! markup, restores the blob, and shows the changes carried over.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p holdover_demos --example two_requests`

use holdover_demos::{Ad, CheckList, Grid, ListItem, Rotator};
use holdover_node::{capture_blob, restore_blob};
use holdover_record::{
    BinaryCodec, Record, StateShapeMismatch, TextCodec, pack_slots, unpack_slots,
};
use holdover_store::StateManager;

/// Everything on the page, in markup order.
#[derive(Debug)]
struct Page {
    grid: Grid,
    sizes: CheckList,
    banner: Rotator,
}

impl Page {
    /// Builds the page as markup declares it.
    fn from_markup() -> Self {
        let mut grid = Grid::new();
        for field in ["Id", "Name", "Price"] {
            grid.add_column(field).expect("no state restored yet");
        }
        let mut sizes = CheckList::new();
        for size in ["S", "M", "L"] {
            sizes
                .add_item(ListItem::new(size, size))
                .expect("no state restored yet");
        }
        let banner = Rotator::new(vec![
            Ad::new("sale.png", "/sale").with_impressions(3),
            Ad::new("new.png", "/new").with_keyword("new"),
        ]);
        Self {
            grid,
            sizes,
            banner,
        }
    }
}

impl StateManager for Page {
    fn track(&mut self) {
        self.grid.track();
        self.sizes.track();
        self.banner.track();
    }

    fn is_tracking(&self) -> bool {
        self.grid.is_tracking()
    }

    fn capture(&self) -> Option<Record> {
        pack_slots([
            self.grid.capture(),
            self.sizes.capture(),
            self.banner.capture(),
        ])
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        let [grid, sizes, banner] = unpack_slots::<3>(record)?;
        self.grid.restore(grid).map_err(|e| e.in_slot(0))?;
        self.sizes.restore(sizes).map_err(|e| e.in_slot(1))?;
        self.banner.restore(banner).map_err(|e| e.in_slot(2))
    }

    fn mark_all_dirty(&mut self) {
        self.grid.mark_all_dirty();
        self.sizes.mark_all_dirty();
        self.banner.mark_all_dirty();
    }
}

fn main() {
    env_logger::init();
    let codec = TextCodec::new(BinaryCodec::new());
    let mut rng = rand::rng();

    // First request: no blob yet.
    let mut page = Page::from_markup();
    restore_blob(&mut page, None, &codec).expect("nothing to restore");
    page.track();

    page.grid.sort("Price");
    page.grid.header_style_mut().set_font_bold(true);
    page.grid.set_data_keys(vec!["17".into(), "4".into()]);
    page.sizes.set_enabled(false);
    page.banner.set_keyword_filter("new");

    let blob = capture_blob(&page, &codec).expect("encoding never fails for this page");
    let blob = blob.unwrap_or_default();
    println!("hidden field: {}", String::from_utf8_lossy(&blob));

    // Second request: rebuild from markup, then restore.
    let mut page = Page::from_markup();
    restore_blob(&mut page, Some(blob.as_slice()), &codec).expect("blob came from this page");
    page.track();

    println!("sort expression: {}", page.grid.sort_expression());
    println!(
        "header bold: {}",
        page.grid.header_style().is_some_and(|style| style.font_bold())
    );
    println!("data keys: {:?}", page.grid.data_keys());
    println!("sizes enabled: {}", page.sizes.is_enabled());
    if let Some(ad) = page.banner.pick(&mut rng) {
        println!("banner: {} -> {}", ad.image_url, ad.navigate_url);
    }

    // Values restored before tracking are not written again. An idle second
    // request still carries the grid's sort and data keys, which are required
    // state.
    let blob = capture_blob(&page, &codec).expect("encoding never fails for this page");
    let blob = blob.unwrap_or_default();
    println!("second hidden field: {}", String::from_utf8_lossy(&blob));
}
