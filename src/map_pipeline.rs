//! Map area estimation pipeline
//!
//! This module turns a color-coded equirectangular map into per-region land
//! area totals, with separate modules for image decoding, latitude weighting,
//! pixel aggregation and report export.

pub mod common;
pub mod grid;
pub mod geo;
pub mod analysis;
pub mod report;
pub mod config;
pub mod estimation;
pub mod timing;

pub use common::{
    EstimationError,
    Result,
};

pub use grid::{
    Rgb,
    PixelGrid,
    MapImageReader,
    ImageCrateReader,
};

pub use geo::{
    MapBounds,
    LatitudeWeights,
};

pub use analysis::{
    ColorAccumulator,
    ColorTally,
    AreaAggregator,
    PopulationLayer,
    classify,
};

pub use report::{
    ColorRecord,
    ResultTable,
    ReportWriter,
    XlsxReportWriter,
    JsonReportWriter,
};

pub use config::{
    EstimationConfig,
    EstimationConfigBuilder,
    RecordOrder,
};

pub use estimation::{MapAreaPipeline, default_output_path};

pub use timing::{PipelineTimings, StepTiming, Timer};
