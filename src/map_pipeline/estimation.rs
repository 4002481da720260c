//! Estimation orchestration
//!
//! Ties decoding, validation, weighted aggregation and report export into one
//! run over a main map and an optional population map.

mod pipeline;

#[cfg(test)]
mod tests;

pub use pipeline::{MapAreaPipeline, default_output_path};
