//! Estimation configuration types
//!
//! Replaces the interactive prompts of a map-size calculator with a plain
//! struct. Every field has a default, so a JSON config file only needs to
//! name what it changes:
//!
//! ```json
//! { "equator_circumference_km": 21344, "record_order": "area-descending" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::geo::bounds::MapBounds;
pub use crate::map_pipeline::report::types::RecordOrder;

/// Earth's equatorial circumference in km.
pub const DEFAULT_EQUATOR_CIRCUMFERENCE_KM: f64 = 40075.0;

pub const DEFAULT_PEOPLE_PER_WHITE_PIXEL: u64 = 10_000;

/// Configuration for one map area estimation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Circumference of the mapped planet at its equator
    pub equator_circumference_km: f64,
    /// Geographic extent of the image
    pub bounds: MapBounds,
    /// Whether a population map must be supplied and counted
    pub population_enabled: bool,
    /// People represented by one white pixel of the population map
    pub people_per_white_pixel: u64,
    /// Latitude samples per pixel row; 1 uses the row center only
    pub row_subdivisions: u32,
    /// Split the scan across the rayon thread pool
    pub parallel: bool,
    /// Row order of the exported table
    pub record_order: RecordOrder,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            equator_circumference_km: DEFAULT_EQUATOR_CIRCUMFERENCE_KM,
            bounds: MapBounds::WORLD,
            population_enabled: false,
            people_per_white_pixel: DEFAULT_PEOPLE_PER_WHITE_PIXEL,
            row_subdivisions: 1,
            parallel: false,
            record_order: RecordOrder::FirstSeen,
        }
    }
}

impl EstimationConfig {
    pub fn builder() -> EstimationConfigBuilder {
        EstimationConfigBuilder::default()
    }

    /// Checks every value before any pixel is scanned.
    pub fn validate(&self) -> Result<()> {
        if !self.equator_circumference_km.is_finite() || self.equator_circumference_km <= 0.0 {
            return Err(EstimationError::InvalidConfig(format!(
                "equator circumference must be a positive number of km, got {}",
                self.equator_circumference_km
            )));
        }

        if self.row_subdivisions == 0 {
            return Err(EstimationError::InvalidConfig(
                "row subdivisions must be at least 1".to_string(),
            ));
        }

        self.bounds.validate()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EstimationError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            EstimationError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EstimationError::EncodeError(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| {
            EstimationError::OutputWriteError(format!("{}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

/// Builder for EstimationConfig
#[derive(Default)]
pub struct EstimationConfigBuilder {
    equator_circumference_km: Option<f64>,
    bounds: Option<MapBounds>,
    population_enabled: Option<bool>,
    people_per_white_pixel: Option<u64>,
    row_subdivisions: Option<u32>,
    parallel: Option<bool>,
    record_order: Option<RecordOrder>,
}

impl EstimationConfigBuilder {
    pub fn equator_circumference_km(mut self, km: f64) -> Self {
        self.equator_circumference_km = Some(km);
        self
    }

    pub fn bounds(mut self, bounds: MapBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn population_enabled(mut self, enable: bool) -> Self {
        self.population_enabled = Some(enable);
        self
    }

    pub fn people_per_white_pixel(mut self, people: u64) -> Self {
        self.people_per_white_pixel = Some(people);
        self
    }

    pub fn row_subdivisions(mut self, subdivisions: u32) -> Self {
        self.row_subdivisions = Some(subdivisions);
        self
    }

    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = Some(enable);
        self
    }

    pub fn record_order(mut self, order: RecordOrder) -> Self {
        self.record_order = Some(order);
        self
    }

    /// Starts from `base` instead of the defaults for fields left unset.
    pub fn build_on(self, base: EstimationConfig) -> EstimationConfig {
        EstimationConfig {
            equator_circumference_km: self
                .equator_circumference_km
                .unwrap_or(base.equator_circumference_km),
            bounds: self.bounds.unwrap_or(base.bounds),
            population_enabled: self.population_enabled.unwrap_or(base.population_enabled),
            people_per_white_pixel: self
                .people_per_white_pixel
                .unwrap_or(base.people_per_white_pixel),
            row_subdivisions: self.row_subdivisions.unwrap_or(base.row_subdivisions),
            parallel: self.parallel.unwrap_or(base.parallel),
            record_order: self.record_order.unwrap_or(base.record_order),
        }
    }

    pub fn build(self) -> EstimationConfig {
        self.build_on(EstimationConfig::default())
    }
}
