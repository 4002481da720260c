//! Map image reader implementation using the `image` library.
//!
//! Any format `image` can decode (PNG, JPEG, BMP, TIFF, ...) is accepted.
//! Alpha and higher bit depths are discarded by converting to RGB8, so the
//! estimator always sees exact 8-bit color values.

use tracing::debug;

use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::grid::reader::MapImageReader;
use crate::map_pipeline::grid::types::PixelGrid;

/// Map reader that decodes with the `image` crate, guessing the format from
/// the file's magic bytes.
pub struct ImageCrateReader;

impl MapImageReader for ImageCrateReader {
    /// Decodes encoded image bytes into an RGB pixel grid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use map_area_rs::map_pipeline::{ImageCrateReader, MapImageReader};
    ///
    /// let bytes = std::fs::read("world.png").unwrap();
    /// let grid = ImageCrateReader.read_map(&bytes).unwrap();
    /// println!("{}x{}", grid.width(), grid.height());
    /// ```
    fn read_map(&self, data: &[u8]) -> Result<PixelGrid> {
        debug!("Decoding map image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| EstimationError::DecodeError(e.to_string()))?;

        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        debug!("Decoded image: {}x{}", width, height);

        PixelGrid::from_raw(width as usize, height as usize, rgb.into_raw())
    }
}
