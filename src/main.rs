use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use map_area_rs::logger;
use map_area_rs::map_pipeline::{
    EstimationConfig, ImageCrateReader, JsonReportWriter, MapAreaPipeline, MapBounds, RecordOrder,
    ReportWriter, XlsxReportWriter, default_output_path,
};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Xlsx,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "map_area_rs")]
#[command(about = "Estimate land area per color region of an equirectangular map")]
struct Args {
    /// Color-coded map image; pure white is background
    map: PathBuf,

    /// Population map of the same size; white pixels are populated
    #[arg(short, long)]
    population: Option<PathBuf>,

    /// Equator circumference in km (default 40075)
    #[arg(short, long)]
    circumference: Option<f64>,

    /// Map extent as MIN_LAT,MAX_LAT,MIN_LON,MAX_LON (default whole world)
    #[arg(short, long, allow_hyphen_values = true)]
    bounds: Option<MapBounds>,

    /// People per white population pixel (default 10000)
    #[arg(long)]
    people_per_pixel: Option<u64>,

    /// Latitude samples per pixel row (default 1)
    #[arg(long)]
    subdivisions: Option<u32>,

    /// Scan rows in parallel
    #[arg(long)]
    parallel: bool,

    /// Row order: first-seen or area
    #[arg(long)]
    sort: Option<RecordOrder>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Xlsx)]
    format: ReportFormat,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file (default <map stem>_map_sizes.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log per-step timings
    #[arg(long)]
    timings: bool,
}

impl Args {
    fn estimation_config(&self) -> anyhow::Result<EstimationConfig> {
        let base = match &self.config {
            Some(path) => EstimationConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EstimationConfig::default(),
        };

        let mut builder = EstimationConfig::builder();
        if let Some(km) = self.circumference {
            builder = builder.equator_circumference_km(km);
        }
        if let Some(bounds) = self.bounds {
            builder = builder.bounds(bounds);
        }
        if let Some(people) = self.people_per_pixel {
            builder = builder.people_per_white_pixel(people);
        }
        if let Some(subdivisions) = self.subdivisions {
            builder = builder.row_subdivisions(subdivisions);
        }
        if let Some(order) = self.sort {
            builder = builder.record_order(order);
        }
        if self.parallel {
            builder = builder.parallel(true);
        }
        if self.population.is_some() {
            builder = builder.population_enabled(true);
        }

        Ok(builder.build_on(base))
    }
}

fn run<W: ReportWriter>(args: &Args, writer: W, config: EstimationConfig) -> anyhow::Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.map, writer.extension()));

    let pipeline = MapAreaPipeline::with_custom(ImageCrateReader, writer, config)?;

    info!("Loading: {}", args.map.display());
    let (table, timings) = pipeline.estimate_file_with_timings(
        &args.map,
        args.population.as_deref(),
        &output,
    )?;
    info!("Done: {} colour regions", table.records.len());

    if args.timings {
        timings.log_summary();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logger::init("info");

    let args = Args::parse();
    let config = args.estimation_config()?;

    if !args.map.exists() {
        anyhow::bail!("map file '{}' not found", args.map.display());
    }

    let result = match args.format {
        ReportFormat::Xlsx => run(&args, XlsxReportWriter, config),
        ReportFormat::Json => run(&args, JsonReportWriter, config),
    };

    if let Err(e) = result {
        error!("Estimation failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
