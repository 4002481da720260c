use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::map_pipeline::{
    analysis::{AreaAggregator, PopulationLayer},
    common::error::{EstimationError, Result},
    config::EstimationConfig,
    geo::LatitudeWeights,
    grid::{ImageCrateReader, MapImageReader, PixelGrid},
    report::{ReportWriter, ResultTable, XlsxReportWriter},
    timing::PipelineTimings,
};

/// Suffix appended to the map's file stem for the default report name.
const OUTPUT_SUFFIX: &str = "_map_sizes";

/// `<dir>/<stem>_map_sizes.<extension>` next to the input map.
pub fn default_output_path(map_path: &Path, extension: &str) -> PathBuf {
    let stem = map_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "map".to_string());
    map_path.with_file_name(format!("{}{}.{}", stem, OUTPUT_SUFFIX, extension))
}

pub struct MapAreaPipeline<R: MapImageReader, W: ReportWriter> {
    reader: R,
    writer: W,
    config: EstimationConfig,
}

impl MapAreaPipeline<ImageCrateReader, XlsxReportWriter> {
    pub fn new(config: EstimationConfig) -> Result<Self> {
        Self::with_custom(ImageCrateReader, XlsxReportWriter, config)
    }
}

impl<R: MapImageReader, W: ReportWriter> MapAreaPipeline<R, W> {
    /// Builds a pipeline around a custom reader and writer. The config is
    /// validated here so a bad value fails before any file is touched.
    pub fn with_custom(reader: R, writer: W, config: EstimationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            writer,
            config,
        })
    }

    /// Decides which population map, if any, takes part in the run.
    fn select_population<'a>(&self, population: Option<&'a PixelGrid>) -> Result<Option<&'a PixelGrid>> {
        match (self.config.population_enabled, population) {
            (true, None) => Err(EstimationError::MissingPopulationMap),
            (true, Some(grid)) => Ok(Some(grid)),
            (false, Some(_)) => {
                warn!("Population map supplied but population counting is disabled, ignoring it");
                Ok(None)
            }
            (false, None) => Ok(None),
        }
    }

    /// Core computation over already decoded grids. Nothing is written.
    #[instrument(skip_all, fields(width = map.width(), height = map.height()))]
    pub fn estimate_grids(&self, map: &PixelGrid, population: Option<&PixelGrid>) -> Result<ResultTable> {
        let (table, _) = self.estimate_grids_with_timings(map, population)?;
        Ok(table)
    }

    fn estimate_grids_with_timings(
        &self,
        map: &PixelGrid,
        population: Option<&PixelGrid>,
    ) -> Result<(ResultTable, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let config = &self.config;

        let (weights, layer) = {
            let _span = tracing::info_span!("validate").entered();
            let weights = timings.time("build_weights", || {
                LatitudeWeights::new(
                    &config.bounds,
                    map.width(),
                    map.height(),
                    config.equator_circumference_km,
                    config.row_subdivisions,
                )
            })?;
            let layer = self
                .select_population(population)?
                .map(|grid| PopulationLayer::new(grid, map, config.people_per_white_pixel))
                .transpose()?;
            (weights, layer)
        };

        self.log_geometry(map);

        let tally = {
            let _span = tracing::info_span!("aggregate", parallel = config.parallel).entered();
            let mut aggregator = AreaAggregator::new(&weights);
            if let Some(layer) = layer {
                aggregator = aggregator.with_population(layer);
            }
            timings.time("aggregate", || {
                if config.parallel {
                    aggregator.aggregate_parallel(map)
                } else {
                    aggregator.aggregate(map)
                }
            })?
        };

        let table = timings.time("build_table", || {
            ResultTable::from_tally(&tally, layer.as_ref(), config.record_order)
        })?;

        info!(
            unique_colors = table.records.len(),
            land_pixels = table.total.pixel_count,
            background_pixels = table.background_pixels,
            "Total land area: {:.2} km²",
            table.total.area_km2
        );
        if let (Some(people), Some(layer)) = (table.total.population, layer.as_ref()) {
            info!(
                populated_pixels = layer.populated_pixels(),
                "Total population: {}", people
            );
        }

        Ok((table, timings))
    }

    fn log_geometry(&self, map: &PixelGrid) {
        let config = &self.config;
        let km_per_degree = config.equator_circumference_km / 360.0;
        let pixel_width_km = km_per_degree * config.bounds.lon_span() / map.width() as f64;
        let pixel_height_km = km_per_degree * config.bounds.lat_span() / map.height() as f64;

        info!("Dimensions: {}x{} pixels", map.width(), map.height());
        info!("Equator circumference: {:.2} km", config.equator_circumference_km);
        info!("Km per pixel at the equator: {:.4} km", pixel_width_km);
        info!(
            "Area per pixel at the equator: {:.4} km²",
            pixel_width_km * pixel_height_km
        );
    }

    fn decode_inputs(
        &self,
        map_data: &[u8],
        population_data: Option<&[u8]>,
        timings: &mut PipelineTimings,
    ) -> Result<(PixelGrid, Option<PixelGrid>)> {
        if self.config.population_enabled && population_data.is_none() {
            return Err(EstimationError::MissingPopulationMap);
        }

        let _span = tracing::info_span!("decode").entered();
        let map = timings.time("decode_map", || self.reader.read_map(map_data))?;

        let population = match population_data {
            Some(data) if self.config.population_enabled => {
                Some(timings.time("decode_population", || self.reader.read_map(data))?)
            }
            _ => None,
        };

        Ok((map, population))
    }

    fn export(&self, table: &ResultTable, output: &mut dyn Write, timings: &mut PipelineTimings) -> Result<()> {
        let _span = tracing::info_span!("export").entered();
        timings.time("export", || self.writer.write_report(table, output))
    }

    #[instrument(skip_all, fields(map_size = map_data.len()))]
    pub fn estimate(
        &self,
        map_data: &[u8],
        population_data: Option<&[u8]>,
        output: &mut dyn Write,
    ) -> Result<ResultTable> {
        let (table, _) = self.estimate_with_timings(map_data, population_data, output)?;
        Ok(table)
    }

    pub fn estimate_with_timings(
        &self,
        map_data: &[u8],
        population_data: Option<&[u8]>,
        output: &mut dyn Write,
    ) -> Result<(ResultTable, PipelineTimings)> {
        info!("Starting map area estimation");
        let mut timings = PipelineTimings::new();

        let (map, population) = self.decode_inputs(map_data, population_data, &mut timings)?;
        let (table, steps) = self.estimate_grids_with_timings(&map, population.as_ref())?;
        for step in steps.steps() {
            timings.add_step(step.name.clone(), step.duration);
        }

        self.export(&table, output, &mut timings)?;

        info!(
            "Estimation complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok((table, timings))
    }

    #[instrument(skip_all)]
    pub fn estimate_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        map_path: P,
        population_path: Option<&Path>,
        output_path: Q,
    ) -> Result<ResultTable> {
        let (table, _) = self.estimate_file_with_timings(map_path, population_path, output_path)?;
        Ok(table)
    }

    /// File variant of [`MapAreaPipeline::estimate_with_timings`]. The output
    /// file is only created once the table has been computed, so a failed run
    /// leaves nothing behind.
    pub fn estimate_file_with_timings<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        map_path: P,
        population_path: Option<&Path>,
        output_path: Q,
    ) -> Result<(ResultTable, PipelineTimings)> {
        let map_path = map_path.as_ref();
        let output_path = output_path.as_ref();
        let mut timings = PipelineTimings::new();

        info!(
            input = %map_path.display(),
            output = %output_path.display(),
            "Estimating map file"
        );

        let map_data = timings.time("read_map_file", || read_input(map_path))?;
        let population_data = population_path
            .map(|path| timings.time("read_population_file", || read_input(path)))
            .transpose()?;

        let (map, population) =
            self.decode_inputs(&map_data, population_data.as_deref(), &mut timings)?;
        let (table, steps) = self.estimate_grids_with_timings(&map, population.as_ref())?;
        for step in steps.steps() {
            timings.add_step(step.name.clone(), step.duration);
        }

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                EstimationError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };
        self.export(&table, &mut output_file, &mut timings)?;

        info!("Exported results to '{}'", output_path.display());
        Ok((table, timings))
    }

    pub fn config(&self) -> &EstimationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EstimationConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| EstimationError::InputReadError(format!("{}: {}", path.display(), e)))
}
