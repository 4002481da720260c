//! Pixel analysis module
//!
//! Classification of map pixels into color classes and the latitude-weighted
//! aggregation of those classes into area and population totals.

pub mod classifier;
pub mod accumulator;
pub mod aggregator;
pub mod population;

pub use classifier::{classify, count_white, is_background};
pub use accumulator::{ColorAccumulator, ColorTally};
pub use aggregator::AreaAggregator;
pub use population::PopulationLayer;
