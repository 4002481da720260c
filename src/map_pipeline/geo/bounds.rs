//! Geographic extent of a map image

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::map_pipeline::common::error::{EstimationError, Result};

/// Latitude/longitude extent in degrees covered by the map image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self::WORLD
    }
}

impl MapBounds {
    /// Full world map.
    pub const WORLD: MapBounds = MapBounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn validate(&self) -> Result<()> {
        check_axis("latitude", self.min_lat, self.max_lat, 90.0)?;
        check_axis("longitude", self.min_lon, self.max_lon, 180.0)
    }
}

fn check_axis(axis: &str, min: f64, max: f64, limit: f64) -> Result<()> {
    for value in [min, max] {
        if !value.is_finite() || value.abs() > limit {
            return Err(EstimationError::InvalidBounds(format!(
                "{} {} outside [-{}, {}]",
                axis, value, limit, limit
            )));
        }
    }

    if min >= max {
        return Err(EstimationError::InvalidBounds(format!(
            "{} minimum {} must be below maximum {}",
            axis, min, max
        )));
    }

    Ok(())
}

/// Parses `min_lat,max_lat,min_lon,max_lon`.
impl FromStr for MapBounds {
    type Err = EstimationError;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| EstimationError::InvalidBounds(format!("{}: {}", s, e)))?;

        match values.as_slice() {
            [min_lat, max_lat, min_lon, max_lon] => {
                let bounds = MapBounds::new(*min_lat, *max_lat, *min_lon, *max_lon);
                bounds.validate()?;
                Ok(bounds)
            }
            _ => Err(EstimationError::InvalidBounds(format!(
                "expected 4 comma-separated values, got {}",
                values.len()
            ))),
        }
    }
}
