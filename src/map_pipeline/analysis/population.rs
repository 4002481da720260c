//! Population map overlay.
//!
//! A population map is aligned pixel-for-pixel with the main map. Each white
//! population pixel counts toward whichever color class occupies the same
//! coordinate on the main map.

use crate::map_pipeline::analysis::classifier::count_white;
use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::grid::types::PixelGrid;

#[derive(Debug, Clone, Copy)]
pub struct PopulationLayer<'a> {
    grid: &'a PixelGrid,
    people_per_white_pixel: u64,
}

impl<'a> PopulationLayer<'a> {
    /// Pairs a population map with the main map it overlays. The two must
    /// have identical dimensions.
    pub fn new(grid: &'a PixelGrid, main: &PixelGrid, people_per_white_pixel: u64) -> Result<Self> {
        if grid.dimensions() != main.dimensions() {
            return Err(EstimationError::DimensionMismatch {
                width: main.width(),
                height: main.height(),
                pop_width: grid.width(),
                pop_height: grid.height(),
            });
        }

        Ok(Self {
            grid,
            people_per_white_pixel,
        })
    }

    pub fn grid(&self) -> &PixelGrid {
        self.grid
    }

    pub fn people_per_white_pixel(&self) -> u64 {
        self.people_per_white_pixel
    }

    pub fn is_populated(&self, row: usize, col: usize) -> bool {
        self.grid.pixel(row, col).is_white()
    }

    /// Population represented by `white_pixels` populated pixels.
    pub fn population_for(&self, white_pixels: u64) -> Result<u64> {
        white_pixels
            .checked_mul(self.people_per_white_pixel)
            .ok_or_else(|| {
                EstimationError::PopulationOverflow(format!(
                    "{} pixels x {} people per pixel",
                    white_pixels, self.people_per_white_pixel
                ))
            })
    }

    /// White pixels anywhere on the population map, including those over
    /// main-map background.
    pub fn populated_pixels(&self) -> u64 {
        count_white(self.grid)
    }
}
