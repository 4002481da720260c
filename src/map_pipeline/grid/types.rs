//! Pixel grid data types

use std::fmt;

use crate::map_pipeline::common::error::{EstimationError, Result};

/// An 8-bit RGB triple. Identity is exact channel equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Background color of the main map, and the "populated" color of a
    /// population map.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_white(&self) -> bool {
        *self == Self::WHITE
    }

    /// Upper-case `#RRGGBB` form used in reports.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Decoded map image.
///
/// Row 0 is the northern edge of the map (`max_lat`), row `height - 1` the
/// southern edge. Pixels are stored interleaved `[R, G, B, R, G, B, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Number of channels per pixel.
pub const CHANNELS: usize = 3;

impl PixelGrid {
    /// Wraps an interleaved RGB8 buffer, rejecting empty grids and buffers
    /// whose length does not match `width * height * 3`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EstimationError::InvalidDimensions(width, height));
        }

        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
            .ok_or(EstimationError::InvalidDimensions(width, height))?;

        if data.len() != expected {
            return Err(EstimationError::MalformedGrid(format!(
                "expected {} bytes for {}x{} RGB pixels, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }

        Ok(Self { width, height, data })
    }

    /// Builds a grid by evaluating `f(row, col)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> Rgb,
    {
        let mut data = Vec::with_capacity(width.saturating_mul(height).saturating_mul(CHANNELS));
        for row in 0..height {
            for col in 0..width {
                let px = f(row, col);
                data.extend_from_slice(&[px.r, px.g, px.b]);
            }
        }
        Self::from_raw(width, height, data)
    }

    pub fn filled(width: usize, height: usize, color: Rgb) -> Result<Self> {
        Self::from_fn(width, height, |_, _| color)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn pixel(&self, row: usize, col: usize) -> Rgb {
        let offset = (row * self.width + col) * CHANNELS;
        Rgb::new(self.data[offset], self.data[offset + 1], self.data[offset + 2])
    }

    /// Raw interleaved bytes of one row.
    pub fn row_bytes(&self, row: usize) -> &[u8] {
        let stride = self.width * CHANNELS;
        &self.data[row * stride..(row + 1) * stride]
    }

    /// Iterates the pixels of one row, west to east.
    pub fn row_pixels(&self, row: usize) -> impl Iterator<Item = Rgb> + '_ {
        self.row_bytes(row)
            .chunks_exact(CHANNELS)
            .map(|px| Rgb::new(px[0], px[1], px[2]))
    }
}
