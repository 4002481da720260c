//! Land area estimation for color-coded equirectangular maps.
//!
//! Every distinct non-white color of a map image is treated as one region.
//! Pixels are weighted by the cosine of their row's latitude and summed into
//! per-region area totals, optionally with population counted from a second,
//! aligned map. Results are exported as a spreadsheet or JSON.

pub mod logger;
pub mod map_pipeline;
