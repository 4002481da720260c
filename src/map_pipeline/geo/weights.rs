//! Latitude weight table
//!
//! On an equirectangular map every pixel spans the same number of degrees,
//! but a degree of longitude shrinks with `cos(latitude)`. Each row is
//! treated as a thin band at constant latitude, so one weight (km² per
//! pixel) covers every pixel in the row.
//!
//! The band approximation is first order: totals come out a few percent
//! under reference values on coarse or polar maps. `row_subdivisions`
//! samples the cosine at several latitudes inside each row to reduce that
//! error; with one subdivision the row center is used.

use tracing::debug;

use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::geo::bounds::MapBounds;

/// Degrees in a full circle of the equator or a meridian.
const DEGREES_PER_CIRCLE: f64 = 360.0;

/// Per-row pixel area for one map geometry.
#[derive(Debug, Clone)]
pub struct LatitudeWeights {
    bounds: MapBounds,
    width: usize,
    degrees_per_row: f64,
    weights: Vec<f64>,
}

impl LatitudeWeights {
    pub fn new(
        bounds: &MapBounds,
        width: usize,
        height: usize,
        equator_circumference_km: f64,
        row_subdivisions: u32,
    ) -> Result<Self> {
        bounds.validate()?;

        if width == 0 || height == 0 {
            return Err(EstimationError::InvalidDimensions(width, height));
        }
        if !equator_circumference_km.is_finite() || equator_circumference_km <= 0.0 {
            return Err(EstimationError::InvalidConfig(format!(
                "equator circumference must be a positive number of km, got {}",
                equator_circumference_km
            )));
        }
        if row_subdivisions == 0 {
            return Err(EstimationError::InvalidConfig(
                "row subdivisions must be at least 1".to_string(),
            ));
        }

        let km_per_degree = equator_circumference_km / DEGREES_PER_CIRCLE;
        let degrees_per_row = bounds.lat_span() / height as f64;
        let degrees_per_col = bounds.lon_span() / width as f64;

        // Meridian length is taken equal to the equator, so a degree of
        // latitude has the same length everywhere.
        let pixel_height_km = km_per_degree * degrees_per_row;
        let equator_pixel_width_km = km_per_degree * degrees_per_col;

        let weights = (0..height)
            .map(|row| {
                let cos_lat = mean_cosine(bounds.max_lat, degrees_per_row, row, row_subdivisions);
                equator_pixel_width_km * cos_lat * pixel_height_km
            })
            .collect::<Vec<_>>();

        debug!(
            "Built {} row weights, {:.6} degrees per row, {} subdivision(s)",
            height, degrees_per_row, row_subdivisions
        );

        Ok(Self {
            bounds: *bounds,
            width,
            degrees_per_row,
            weights,
        })
    }

    /// Area in km² represented by one pixel of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.height()`.
    pub fn row_weight(&self, row: usize) -> f64 {
        self.weights[row]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn height(&self) -> usize {
        self.weights.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn center_latitude(&self, row: usize) -> f64 {
        self.bounds.max_lat - (row as f64 + 0.5) * self.degrees_per_row
    }

    /// Area of the whole bounded region: every row weight times the width.
    pub fn total_area_km2(&self) -> f64 {
        self.weights.iter().sum::<f64>() * self.width as f64
    }
}

/// Mean of `cos(latitude)` over `samples` evenly spaced latitudes inside
/// `row`. Latitudes are clamped to the poles and the cosine to zero, so
/// a row touching ±90° weighs nothing rather than going negative or NaN.
fn mean_cosine(max_lat: f64, degrees_per_row: f64, row: usize, samples: u32) -> f64 {
    let n = samples as f64;
    let total: f64 = (0..samples)
        .map(|k| {
            let offset = row as f64 + (k as f64 + 0.5) / n;
            let lat = (max_lat - offset * degrees_per_row).clamp(-90.0, 90.0);
            lat.to_radians().cos().max(0.0)
        })
        .sum();
    total / n
}
