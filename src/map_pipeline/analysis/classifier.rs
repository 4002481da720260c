//! Exact-color pixel classification.

use indexmap::IndexMap;

use crate::map_pipeline::grid::types::{PixelGrid, Rgb};

/// Pure white marks water or unclaimed land on the main map.
pub fn is_background(color: Rgb) -> bool {
    color.is_white()
}

/// Counts pixels per non-background color, in first-seen order
/// (row-major, north to south).
pub fn classify(grid: &PixelGrid) -> IndexMap<Rgb, u64> {
    let mut counts = IndexMap::new();
    for row in 0..grid.height() {
        for color in grid.row_pixels(row).filter(|c| !is_background(*c)) {
            *counts.entry(color).or_insert(0) += 1;
        }
    }
    counts
}

/// Counts white pixels. On a population map white is the populated class,
/// the inverse of the main map's treatment.
pub fn count_white(grid: &PixelGrid) -> u64 {
    (0..grid.height())
        .map(|row| grid.row_pixels(row).filter(Rgb::is_white).count() as u64)
        .sum()
}
