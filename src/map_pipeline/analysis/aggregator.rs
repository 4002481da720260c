//! Latitude-weighted area aggregation.
//!
//! Classification and weighting happen in one pass: every pixel adds its
//! row's weight to its color's area and bumps the raw pixel count. A global
//! count per color cannot be turned into area afterwards because the weight
//! differs per row.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::map_pipeline::analysis::accumulator::ColorTally;
use crate::map_pipeline::analysis::classifier::is_background;
use crate::map_pipeline::analysis::population::PopulationLayer;
use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::geo::weights::LatitudeWeights;
use crate::map_pipeline::grid::types::PixelGrid;

pub struct AreaAggregator<'a> {
    weights: &'a LatitudeWeights,
    population: Option<PopulationLayer<'a>>,
}

impl<'a> AreaAggregator<'a> {
    pub fn new(weights: &'a LatitudeWeights) -> Self {
        Self {
            weights,
            population: None,
        }
    }

    pub fn with_population(mut self, layer: PopulationLayer<'a>) -> Self {
        self.population = Some(layer);
        self
    }

    fn check_grid(&self, grid: &PixelGrid) -> Result<()> {
        if grid.dimensions() != (self.weights.width(), self.weights.height()) {
            return Err(EstimationError::InvalidDimensions(grid.width(), grid.height()));
        }
        if let Some(layer) = &self.population {
            if layer.grid().dimensions() != grid.dimensions() {
                return Err(EstimationError::DimensionMismatch {
                    width: grid.width(),
                    height: grid.height(),
                    pop_width: layer.grid().width(),
                    pop_height: layer.grid().height(),
                });
            }
        }
        Ok(())
    }

    /// Folds one row into `tally`.
    fn scan_row(&self, grid: &PixelGrid, row: usize, tally: &mut ColorTally) {
        let weight = self.weights.row_weight(row);

        for (col, color) in grid.row_pixels(row).enumerate() {
            if is_background(color) {
                tally.record_background();
                continue;
            }
            let populated = self
                .population
                .as_ref()
                .is_some_and(|layer| layer.is_populated(row, col));
            tally.record(color, weight, populated);
        }
    }

    /// Single-threaded scan, north to south.
    #[instrument(skip_all, fields(width = grid.width(), height = grid.height()))]
    pub fn aggregate(&self, grid: &PixelGrid) -> Result<ColorTally> {
        self.check_grid(grid)?;

        let mut tally = ColorTally::new();
        for row in 0..grid.height() {
            self.scan_row(grid, row, &mut tally);
        }

        debug!("Sequential scan found {} color classes", tally.len());
        Ok(tally)
    }

    /// Row-partitioned scan on the rayon pool. Partial tallies are merged in
    /// row order, so class order matches [`AreaAggregator::aggregate`]; area
    /// sums may differ from it in the last few bits.
    #[instrument(skip_all, fields(width = grid.width(), height = grid.height()))]
    pub fn aggregate_parallel(&self, grid: &PixelGrid) -> Result<ColorTally> {
        self.check_grid(grid)?;

        let tally = (0..grid.height())
            .into_par_iter()
            .fold(ColorTally::new, |mut tally, row| {
                self.scan_row(grid, row, &mut tally);
                tally
            })
            .reduce(ColorTally::new, ColorTally::merge);

        debug!(
            "Parallel scan found {} color classes on {} threads",
            tally.len(),
            rayon::current_num_threads()
        );
        Ok(tally)
    }
}
