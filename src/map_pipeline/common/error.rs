use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimationError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode map image: {0}")]
    DecodeError(String),

    #[error("Failed to encode report: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid map bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Population map is {pop_width}x{pop_height} but the main map is {width}x{height}"
    )]
    DimensionMismatch {
        width: usize,
        height: usize,
        pop_width: usize,
        pop_height: usize,
    },

    #[error("Population counting is enabled but no population map was supplied")]
    MissingPopulationMap,

    #[error("Population total does not fit in 64 bits: {0}")]
    PopulationOverflow(String),

    #[error("Malformed pixel grid: {0}")]
    MalformedGrid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EstimationError>;
