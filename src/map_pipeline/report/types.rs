//! Result table types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::map_pipeline::analysis::accumulator::ColorTally;
use crate::map_pipeline::analysis::population::PopulationLayer;
use crate::map_pipeline::common::error::{EstimationError, Result};

/// Marker written in the color column of the totals row.
pub const TOTAL_LABEL: &str = "TOTAL";

/// Row ordering of the exported table. The totals row always comes last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOrder {
    /// Order in which colors are first met scanning north to south.
    #[default]
    FirstSeen,
    /// Largest area first.
    AreaDescending,
}

impl FromStr for RecordOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first-seen" => Ok(RecordOrder::FirstSeen),
            "area" | "area-descending" => Ok(RecordOrder::AreaDescending),
            other => Err(format!(
                "unknown record order '{}', expected 'first-seen' or 'area'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRecord {
    /// `#RRGGBB`, or [`TOTAL_LABEL`] for the totals row.
    pub hex_color: String,
    pub pixel_count: u64,
    pub area_km2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub records: Vec<ColorRecord>,
    pub total: ColorRecord,
    /// White pixels excluded from every class.
    pub background_pixels: u64,
}

impl ResultTable {
    /// Finalizes a tally into report rows. Population is filled in only when
    /// a population layer took part in the scan. A population that does not
    /// fit in a `u64` fails the whole table.
    pub fn from_tally(
        tally: &ColorTally,
        population: Option<&PopulationLayer<'_>>,
        order: RecordOrder,
    ) -> Result<Self> {
        let mut records = tally
            .classes()
            .iter()
            .map(|(color, acc)| -> Result<ColorRecord> {
                Ok(ColorRecord {
                    hex_color: color.to_hex(),
                    pixel_count: acc.pixel_count,
                    area_km2: acc.area_km2,
                    population: population
                        .map(|layer| layer.population_for(acc.populated_pixels))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if order == RecordOrder::AreaDescending {
            records.sort_by(|a, b| b.area_km2.total_cmp(&a.area_km2));
        }

        // Totals come from the class rows, not a second pass over the grid.
        let total = ColorRecord {
            hex_color: TOTAL_LABEL.to_string(),
            pixel_count: records.iter().map(|r| r.pixel_count).sum(),
            area_km2: records.iter().map(|r| r.area_km2).sum(),
            population: population.map(|_| total_population(&records)).transpose()?,
        };

        Ok(Self {
            records,
            total,
            background_pixels: tally.background_pixels(),
        })
    }

    pub fn has_population(&self) -> bool {
        self.total.population.is_some()
    }

    /// Class rows followed by the totals row.
    pub fn rows(&self) -> impl Iterator<Item = &ColorRecord> {
        self.records.iter().chain(std::iter::once(&self.total))
    }

    pub fn find(&self, hex_color: &str) -> Option<&ColorRecord> {
        self.records.iter().find(|r| r.hex_color == hex_color)
    }
}

fn total_population(records: &[ColorRecord]) -> Result<u64> {
    records
        .iter()
        .filter_map(|r| r.population)
        .try_fold(0u64, |sum, people| sum.checked_add(people))
        .ok_or_else(|| {
            EstimationError::PopulationOverflow(format!(
                "sum over {} color rows",
                records.len()
            ))
        })
}
