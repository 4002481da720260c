//! Per-color accumulators.
//!
//! A `ColorTally` is the result of folding over any set of rows. Tallies of
//! disjoint row ranges merge by element-wise sum per color, which is what
//! lets the aggregator split a scan across threads.

use indexmap::IndexMap;

use crate::map_pipeline::grid::types::Rgb;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorAccumulator {
    /// Raw, unweighted pixel count.
    pub pixel_count: u64,
    /// Sum of the row weights of every counted pixel.
    pub area_km2: f64,
    /// Pixels of this class that are white on the population map.
    pub populated_pixels: u64,
}

impl ColorAccumulator {
    pub fn add_pixel(&mut self, weight: f64, populated: bool) {
        self.pixel_count += 1;
        self.area_km2 += weight;
        if populated {
            self.populated_pixels += 1;
        }
    }

    pub fn merge(&mut self, other: &ColorAccumulator) {
        self.pixel_count += other.pixel_count;
        self.area_km2 += other.area_km2;
        self.populated_pixels += other.populated_pixels;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColorTally {
    classes: IndexMap<Rgb, ColorAccumulator>,
    background_pixels: u64,
}

impl ColorTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, color: Rgb, weight: f64, populated: bool) {
        self.classes.entry(color).or_default().add_pixel(weight, populated);
    }

    pub fn record_background(&mut self) {
        self.background_pixels += 1;
    }

    /// Combines two tallies. Colors only present in `other` are appended
    /// after this tally's colors, so merging row ranges north to south keeps
    /// first-seen order.
    pub fn merge(mut self, other: ColorTally) -> ColorTally {
        for (color, acc) in other.classes {
            self.classes.entry(color).or_default().merge(&acc);
        }
        self.background_pixels += other.background_pixels;
        self
    }

    pub fn classes(&self) -> &IndexMap<Rgb, ColorAccumulator> {
        &self.classes
    }

    pub fn get(&self, color: &Rgb) -> Option<&ColorAccumulator> {
        self.classes.get(color)
    }

    pub fn background_pixels(&self) -> u64 {
        self.background_pixels
    }

    pub fn class_pixels(&self) -> u64 {
        self.classes.values().map(|acc| acc.pixel_count).sum()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
