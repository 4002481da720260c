//! Pixel grid module
//!
//! This module provides the decoded RGB grid the estimator scans, and the
//! reader seam that produces it from encoded image bytes.

mod reader;
mod image_reader;
pub mod types;

pub use reader::MapImageReader;
pub use image_reader::ImageCrateReader;
pub use types::{Rgb, PixelGrid};
