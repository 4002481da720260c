use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::config::{EstimationConfig, RecordOrder};
use crate::map_pipeline::estimation::{MapAreaPipeline, default_output_path};
use crate::map_pipeline::geo::{LatitudeWeights, MapBounds};
use crate::map_pipeline::grid::{MapImageReader, PixelGrid, Rgb};
use crate::map_pipeline::report::{JsonReportWriter, ReportWriter, ResultTable, TOTAL_LABEL};

const EARTH_KM: f64 = 40075.0;
const RED: Rgb = Rgb::new(255, 0, 0);
const GREEN: Rgb = Rgb::new(0, 160, 0);
const BLACK: Rgb = Rgb::new(0, 0, 0);

const MAP_BYTES: &[u8] = b"main map";
const POP_BYTES: &[u8] = b"population map";

struct MockReader {
    should_fail: bool,
    map: PixelGrid,
    population: Option<PixelGrid>,
}

impl MapImageReader for MockReader {
    fn read_map(&self, data: &[u8]) -> Result<PixelGrid> {
        if self.should_fail {
            return Err(EstimationError::DecodeError("Mock decode error".to_string()));
        }
        if data == POP_BYTES {
            if let Some(pop) = &self.population {
                return Ok(pop.clone());
            }
        }
        Ok(self.map.clone())
    }
}

struct MockWriter {
    should_fail: bool,
    written_tables: Arc<Mutex<Vec<ResultTable>>>,
}

impl ReportWriter for MockWriter {
    fn write_report(&self, table: &ResultTable, _output: &mut dyn Write) -> Result<()> {
        if self.should_fail {
            return Err(EstimationError::EncodeError("Mock encode error".to_string()));
        }
        self.written_tables.lock().unwrap().push(table.clone());
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "mock"
    }
}

fn relative_diff(a: f64, b: f64) -> f64 {
    if b == 0.0 { a.abs() } else { ((a - b) / b).abs() }
}

/// West half red, east half green, white border column and row.
fn sample_map() -> PixelGrid {
    PixelGrid::from_fn(12, 6, |row, col| {
        if row == 0 || col == 11 {
            Rgb::WHITE
        } else if col < 6 {
            RED
        } else {
            GREEN
        }
    })
    .unwrap()
}

fn mock_pipeline(
    reader: MockReader,
    config: EstimationConfig,
) -> (MapAreaPipeline<MockReader, MockWriter>, Arc<Mutex<Vec<ResultTable>>>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        should_fail: false,
        written_tables: written.clone(),
    };
    let pipeline = MapAreaPipeline::with_custom(reader, writer, config).unwrap();
    (pipeline, written)
}

fn grid_pipeline(config: EstimationConfig) -> MapAreaPipeline<MockReader, MockWriter> {
    let reader = MockReader {
        should_fail: false,
        map: sample_map(),
        population: None,
    };
    mock_pipeline(reader, config).0
}

#[test]
fn test_successful_estimation() {
    let reader = MockReader {
        should_fail: false,
        map: sample_map(),
        population: None,
    };
    let (pipeline, written) = mock_pipeline(reader, EstimationConfig::default());

    let mut output = Cursor::new(Vec::new());
    let table = pipeline.estimate(MAP_BYTES, None, &mut output).unwrap();

    assert_eq!(written.lock().unwrap().len(), 1);
    assert_eq!(written.lock().unwrap()[0], table);
    assert_eq!(table.records.len(), 2);
    assert_eq!(table.total.hex_color, TOTAL_LABEL);
}

#[test]
fn test_pixel_counts_are_conserved() {
    let map = sample_map();
    let table = grid_pipeline(EstimationConfig::default())
        .estimate_grids(&map, None)
        .unwrap();

    let class_pixels: u64 = table.records.iter().map(|r| r.pixel_count).sum();
    assert_eq!(class_pixels, table.total.pixel_count);
    assert_eq!(class_pixels + table.background_pixels, map.pixel_count() as u64);
    assert_eq!(table.find("#FF0000").unwrap().pixel_count, 5 * 6);
    assert_eq!(table.find("#00A000").unwrap().pixel_count, 5 * 5);
}

#[test]
fn test_class_areas_sum_to_covered_region() {
    let bounds = MapBounds::new(-20.0, 70.0, -10.0, 80.0);
    let map = sample_map();
    let config = EstimationConfig::builder().bounds(bounds).build();
    let table = grid_pipeline(config).estimate_grids(&map, None).unwrap();

    let weights = LatitudeWeights::new(&bounds, 12, 6, EARTH_KM, 1).unwrap();
    // Land is every column but the last, in every row but the first.
    let land_area: f64 = (1..6).map(|row| weights.row_weight(row) * 11.0).sum();

    let class_area: f64 = table.records.iter().map(|r| r.area_km2).sum();
    assert!(relative_diff(class_area, land_area) < 1e-6);
    assert!(relative_diff(table.total.area_km2, class_area) < 1e-12);
}

#[test]
fn test_single_color_map_is_full_area() {
    let map = PixelGrid::filled(30, 15, GREEN).unwrap();
    let table = grid_pipeline(EstimationConfig::default())
        .estimate_grids(&map, None)
        .unwrap();

    let weights = LatitudeWeights::new(&MapBounds::WORLD, 30, 15, EARTH_KM, 1).unwrap();
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.background_pixels, 0);
    assert!(relative_diff(table.records[0].area_km2, weights.total_area_km2()) < 1e-6);
}

#[test]
fn test_white_map_yields_empty_table() {
    let map = PixelGrid::filled(8, 4, Rgb::WHITE).unwrap();
    let table = grid_pipeline(EstimationConfig::default())
        .estimate_grids(&map, None)
        .unwrap();

    assert!(table.records.is_empty());
    assert_eq!(table.total.pixel_count, 0);
    assert_eq!(table.total.area_km2, 0.0);
    assert_eq!(table.background_pixels, 32);
}

#[test]
fn test_area_scales_with_circumference_squared() {
    let map = sample_map();
    let earth = grid_pipeline(EstimationConfig::default())
        .estimate_grids(&map, None)
        .unwrap();
    let half = grid_pipeline(
        EstimationConfig::builder()
            .equator_circumference_km(EARTH_KM / 2.0)
            .build(),
    )
    .estimate_grids(&map, None)
    .unwrap();

    assert!(relative_diff(half.total.area_km2 * 4.0, earth.total.area_km2) < 1e-9);
    assert_eq!(half.total.pixel_count, earth.total.pixel_count);
}

#[test]
fn test_population_counts_white_pixels_per_class() {
    let map = sample_map();
    // Five white population pixels, all over red land.
    let populated = [(1, 0), (2, 1), (3, 2), (4, 3), (5, 5)];
    let pop = PixelGrid::from_fn(12, 6, |row, col| {
        if populated.contains(&(row, col)) { Rgb::WHITE } else { BLACK }
    })
    .unwrap();

    let reader = MockReader {
        should_fail: false,
        map,
        population: Some(pop),
    };
    let config = EstimationConfig::builder()
        .population_enabled(true)
        .people_per_white_pixel(10_000)
        .build();
    let (pipeline, _) = mock_pipeline(reader, config);

    let mut output = Cursor::new(Vec::new());
    let table = pipeline.estimate(MAP_BYTES, Some(POP_BYTES), &mut output).unwrap();

    assert_eq!(table.find("#FF0000").unwrap().population, Some(50_000));
    assert_eq!(table.find("#00A000").unwrap().population, Some(0));
    assert_eq!(table.total.population, Some(50_000));
}

#[test]
fn test_population_dimension_mismatch_rejected() {
    let reader = MockReader {
        should_fail: false,
        map: sample_map(),
        population: Some(PixelGrid::filled(12, 5, Rgb::WHITE).unwrap()),
    };
    let config = EstimationConfig::builder().population_enabled(true).build();
    let (pipeline, written) = mock_pipeline(reader, config);

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.estimate(MAP_BYTES, Some(POP_BYTES), &mut output);

    assert!(matches!(result, Err(EstimationError::DimensionMismatch { .. })));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_population_overflow_aborts_run() {
    // Red and green each hold one populated pixel; the total overflows u64.
    let pop = PixelGrid::from_fn(12, 6, |row, col| {
        if (row, col) == (1, 0) || (row, col) == (1, 6) { Rgb::WHITE } else { BLACK }
    })
    .unwrap();
    let reader = MockReader {
        should_fail: false,
        map: sample_map(),
        population: Some(pop),
    };
    let config = EstimationConfig::builder()
        .population_enabled(true)
        .people_per_white_pixel(u64::MAX / 2 + 1)
        .build();
    let (pipeline, written) = mock_pipeline(reader, config);

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.estimate(MAP_BYTES, Some(POP_BYTES), &mut output);

    assert!(matches!(result, Err(EstimationError::PopulationOverflow(_))));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_missing_population_map_rejected() {
    let config = EstimationConfig::builder().population_enabled(true).build();
    let pipeline = grid_pipeline(config);

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.estimate(MAP_BYTES, None, &mut output);
    assert!(matches!(result, Err(EstimationError::MissingPopulationMap)));
}

#[test]
fn test_population_ignored_when_disabled() {
    let map = sample_map();
    let pop = PixelGrid::filled(12, 6, Rgb::WHITE).unwrap();
    let table = grid_pipeline(EstimationConfig::default())
        .estimate_grids(&map, Some(&pop))
        .unwrap();

    assert!(!table.has_population());
    assert!(table.records.iter().all(|r| r.population.is_none()));
}

#[test]
fn test_invalid_bounds_rejected_at_construction() {
    let reader = MockReader {
        should_fail: false,
        map: sample_map(),
        population: None,
    };
    let writer = MockWriter {
        should_fail: false,
        written_tables: Arc::new(Mutex::new(Vec::new())),
    };
    let config = EstimationConfig::builder()
        .bounds(MapBounds::new(50.0, 10.0, -180.0, 180.0))
        .build();

    let result = MapAreaPipeline::with_custom(reader, writer, config);
    assert!(matches!(result, Err(EstimationError::InvalidBounds(_))));
}

#[test]
fn test_set_config_validates() {
    let mut pipeline = grid_pipeline(EstimationConfig::default());
    let bad = EstimationConfig::builder().equator_circumference_km(0.0).build();

    assert!(pipeline.set_config(bad).is_err());
    assert_eq!(pipeline.config(), &EstimationConfig::default());
}

#[test]
fn test_reader_failure() {
    let reader = MockReader {
        should_fail: true,
        map: sample_map(),
        population: None,
    };
    let (pipeline, written) = mock_pipeline(reader, EstimationConfig::default());

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.estimate(MAP_BYTES, None, &mut output);

    assert!(matches!(result, Err(EstimationError::DecodeError(_))));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_writer_failure() {
    let reader = MockReader {
        should_fail: false,
        map: sample_map(),
        population: None,
    };
    let writer = MockWriter {
        should_fail: true,
        written_tables: Arc::new(Mutex::new(Vec::new())),
    };
    let pipeline = MapAreaPipeline::with_custom(reader, writer, EstimationConfig::default()).unwrap();

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.estimate(MAP_BYTES, None, &mut output);
    assert!(matches!(result, Err(EstimationError::EncodeError(_))));
}

#[test]
fn test_parallel_config_matches_sequential() {
    let map = sample_map();
    let sequential = grid_pipeline(EstimationConfig::default())
        .estimate_grids(&map, None)
        .unwrap();
    let parallel = grid_pipeline(EstimationConfig::builder().parallel(true).build())
        .estimate_grids(&map, None)
        .unwrap();

    let seq_colors: Vec<&str> = sequential.records.iter().map(|r| r.hex_color.as_str()).collect();
    let par_colors: Vec<&str> = parallel.records.iter().map(|r| r.hex_color.as_str()).collect();
    assert_eq!(seq_colors, par_colors);
    assert!(relative_diff(parallel.total.area_km2, sequential.total.area_km2) < 1e-9);
}

#[test]
fn test_area_descending_order() {
    // Red is first seen but green covers more land.
    let map = PixelGrid::from_fn(10, 4, |_, col| if col < 3 { RED } else { GREEN }).unwrap();
    let config = EstimationConfig::builder()
        .record_order(RecordOrder::AreaDescending)
        .build();
    let table = grid_pipeline(config).estimate_grids(&map, None).unwrap();

    let colors: Vec<&str> = table.rows().map(|r| r.hex_color.as_str()).collect();
    assert_eq!(colors, vec!["#00A000", "#FF0000", TOTAL_LABEL]);
}

#[test]
fn test_timings_cover_every_step() {
    let pipeline = grid_pipeline(EstimationConfig::default());

    let mut output = Cursor::new(Vec::new());
    let (_, timings) = pipeline
        .estimate_with_timings(MAP_BYTES, None, &mut output)
        .unwrap();

    for step in ["decode_map", "build_weights", "aggregate", "build_table", "export"] {
        assert!(timings.get_step(step).is_some(), "missing step {}", step);
    }
}

#[test]
fn test_default_output_path() {
    assert_eq!(
        default_output_path(Path::new("/maps/world.png"), "xlsx"),
        Path::new("/maps/world_map_sizes.xlsx")
    );
    assert_eq!(
        default_output_path(Path::new("europe.bmp"), "json"),
        Path::new("europe_map_sizes.json")
    );
}

#[test]
fn test_file_estimation_with_real_codecs() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("world.png");
    let output_path = default_output_path(&map_path, JsonReportWriter.extension());

    let mut img = image::RgbImage::from_pixel(36, 18, image::Rgb([255, 255, 255]));
    for y in 4..10 {
        for x in 5..15 {
            img.put_pixel(x, y, image::Rgb([10, 120, 200]));
        }
    }
    img.save(&map_path).unwrap();

    let pipeline = MapAreaPipeline::with_custom(
        crate::map_pipeline::grid::ImageCrateReader,
        JsonReportWriter,
        EstimationConfig::default(),
    )
    .unwrap();
    let table = pipeline.estimate_file(&map_path, None, &output_path).unwrap();

    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].hex_color, "#0A78C8");
    assert_eq!(table.records[0].pixel_count, 60);

    let written: ResultTable =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written.records.len(), 1);
    assert_eq!(written.records[0].hex_color, "#0A78C8");
    assert_eq!(written.total.pixel_count, 60);
    assert!(relative_diff(written.total.area_km2, table.total.area_km2) < 1e-12);
}

#[test]
fn test_failed_file_run_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("out.xlsx");

    let pipeline = MapAreaPipeline::new(EstimationConfig::default()).unwrap();
    let result = pipeline.estimate_file(dir.path().join("missing.png"), None, &output_path);

    assert!(matches!(result, Err(EstimationError::InputReadError(_))));
    assert!(!output_path.exists());
}
