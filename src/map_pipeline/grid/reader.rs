use crate::map_pipeline::common::error::Result;
use crate::map_pipeline::grid::types::PixelGrid;

pub trait MapImageReader {
    fn read_map(&self, data: &[u8]) -> Result<PixelGrid>;
}
