//! Geographic model module
//!
//! Map bounds and the per-row area weighting of an equirectangular map.

pub mod bounds;
pub mod weights;

pub use bounds::MapBounds;
pub use weights::LatitudeWeights;
