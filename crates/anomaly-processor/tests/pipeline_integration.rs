//! End-to-end pipeline tests over synthetic rasters.
//!
//! These exercise the full control flow (sanitize, align + crop,
//! aggregate, temporal pooling, anomaly, classification) without any
//! file I/O; layers are built in memory from the shared generators.

use anomaly_common::{Extent, ReferenceGrid};
use anomaly_processor::{pipeline, AnomalyError, PipelineConfig, RasterLayer, RasterStack};
use test_utils::uniform_grid;

/// Unit-degree reference grid so snapped coordinates are integers.
fn unit_grid() -> ReferenceGrid {
    let (lon, lat, cell, offset) = test_utils::grid::UNIT;
    ReferenceGrid::new(lon, lat, cell, offset)
}

fn layer(value: f32, width: usize, height: usize, extent: Extent, cell: f64) -> RasterLayer {
    RasterLayer::new(uniform_grid(width, height, value), width, height, extent, cell).unwrap()
}

fn stack(layers: Vec<RasterLayer>) -> RasterStack {
    RasterStack::new(layers).unwrap()
}

#[test]
fn zscore_pipeline_classifies_strong_positive_anomaly() -> anyhow::Result<()> {
    let grid = unit_grid();
    // Snaps to (10, 16, 40, 46): a 6x6 window at unit resolution.
    let aoi = Extent::new(10.3, 16.0, 40.0, 46.2)?;
    let coverage = Extent::new(8.0, 18.0, 38.0, 48.0)?;

    let current = layer(0.50, 10, 10, coverage, 1.0);
    // Two periods averaging to mean 0.25 and pooled sd 0.125; the values
    // are binary-exact so the z-score lands exactly on the boundary.
    let means = stack(vec![
        layer(0.1875, 10, 10, coverage, 1.0),
        layer(0.3125, 10, 10, coverage, 1.0),
    ]);
    let sds = stack(vec![
        layer(0.125, 10, 10, coverage, 1.0),
        layer(0.125, 10, 10, coverage, 1.0),
    ]);

    let config = PipelineConfig {
        method: "zscore".to_string(),
        sd_multipliers: Some((1.0, 2.0)),
        ..Default::default()
    };

    let classified = pipeline::run(&current, &means, &sds, &aoi, &grid, &config)?;

    // z = (0.50 - 0.25) / 0.125 = 2.0, inclusive upper boundary -> class 5.
    assert_eq!(classified.width, 6);
    assert_eq!(classified.height, 6);
    assert_eq!(classified.class_counts(), [0, 0, 0, 0, 36]);
    assert_eq!(classified.nodata_count(), 0);
    assert_eq!(classified.extent, Extent::new(10.0, 16.0, 40.0, 46.0)?);
    Ok(())
}

#[test]
fn saturated_samples_end_as_nodata_classes() -> anyhow::Result<()> {
    let grid = unit_grid();
    let aoi = Extent::new(10.0, 16.0, 40.0, 46.0)?;

    // One saturated sample inside the AOI window.
    let mut data = uniform_grid(10, 10, 0.50);
    data[2 * 10 + 2] = 0.95; // (col 2, row 2) of the coverage window
    let coverage = Extent::new(8.0, 18.0, 38.0, 48.0)?;
    let current = RasterLayer::new(data, 10, 10, coverage, 1.0)?;

    let means = stack(vec![layer(0.25, 10, 10, coverage, 1.0)]);
    let sds = stack(vec![layer(0.125, 10, 10, coverage, 1.0)]);

    let config = PipelineConfig {
        method: "zscore".to_string(),
        ..Default::default()
    };

    let classified = pipeline::run(&current, &means, &sds, &aoi, &grid, &config)?;

    // Coverage (col 2, row 2) is (col 0, row 0) of the cropped window.
    assert_eq!(classified.get(0, 0), Some(anomaly_processor::NO_CLASS));
    assert_eq!(classified.nodata_count(), 1);
    assert_eq!(classified.class_counts(), [0, 0, 0, 0, 35]);
    Ok(())
}

#[test]
fn simple_pipeline_aggregates_fine_current_layer() -> anyhow::Result<()> {
    // Reference lattice at 3 degrees; current layer three times finer.
    let grid = ReferenceGrid::new(0.0, 90.0, 3.0, false);
    // Snaps to (9, 18, 39, 45): 3x2 coarse cells, 9x6 fine cells.
    let aoi = Extent::new(9.5, 18.2, 39.1, 45.4)?;

    let fine_coverage = Extent::new(6.0, 21.0, 36.0, 48.0)?;
    let coarse_coverage = Extent::new(6.0, 21.0, 36.0, 48.0)?;

    let current = layer(0.50, 15, 12, fine_coverage, 1.0);
    let means = stack(vec![layer(0.25, 5, 4, coarse_coverage, 3.0)]);
    let sds = stack(vec![layer(0.20, 5, 4, coarse_coverage, 3.0)]);

    let config = PipelineConfig {
        method: "simple".to_string(),
        sd_multipliers: Some((1.0, 2.0)),
        aggregation_factor: 3,
        min_valid_count: 4,
        ..Default::default()
    };

    let classified = pipeline::run(&current, &means, &sds, &aoi, &grid, &config)?;

    // Anomaly 0.25 against per-pixel cuts at 0.20/0.40 -> class 4.
    assert_eq!(classified.width, 3);
    assert_eq!(classified.height, 2);
    assert_eq!(classified.class_counts(), [0, 0, 0, 6, 0]);
    Ok(())
}

#[test]
fn sparse_fine_blocks_are_suppressed_by_min_valid_rule() -> anyhow::Result<()> {
    let grid = ReferenceGrid::new(0.0, 90.0, 3.0, false);
    let aoi = Extent::new(9.0, 12.0, 42.0, 45.0)?; // one coarse cell

    // 3x3 fine block with only 4 valid samples: 4 > 4 fails.
    let mut data = uniform_grid(3, 3, 0.50);
    for idx in [1, 3, 5, 7, 8] {
        data[idx] = f32::NAN;
    }
    let coverage = Extent::new(9.0, 12.0, 42.0, 45.0)?;
    let current = RasterLayer::new(data, 3, 3, coverage, 1.0)?;

    let means = stack(vec![layer(0.40, 1, 1, coverage, 3.0)]);
    let sds = stack(vec![layer(0.10, 1, 1, coverage, 3.0)]);

    let config = PipelineConfig {
        method: "simple".to_string(),
        ..Default::default()
    };

    let classified = pipeline::run(&current, &means, &sds, &aoi, &grid, &config)?;
    assert_eq!(classified.nodata_count(), 1);
    assert_eq!(classified.class_counts(), [0, 0, 0, 0, 0]);
    Ok(())
}

#[test]
fn unknown_method_token_aborts_pipeline() {
    let grid = unit_grid();
    let aoi = Extent::new(10.0, 16.0, 40.0, 46.0).unwrap();
    let coverage = Extent::new(8.0, 18.0, 38.0, 48.0).unwrap();

    let current = layer(0.50, 10, 10, coverage, 1.0);
    let means = stack(vec![layer(0.40, 10, 10, coverage, 1.0)]);
    let sds = stack(vec![layer(0.05, 10, 10, coverage, 1.0)]);

    let config = PipelineConfig {
        method: "median".to_string(),
        ..Default::default()
    };

    let result = pipeline::run(&current, &means, &sds, &aoi, &grid, &config);
    assert!(matches!(result, Err(AnomalyError::UnknownMethod(_))));
}

#[test]
fn zero_variance_pixels_stay_nodata_through_classification() -> anyhow::Result<()> {
    let grid = unit_grid();
    let aoi = Extent::new(10.0, 12.0, 40.0, 42.0)?;
    let coverage = aoi;

    let current = layer(0.50, 2, 2, coverage, 1.0);
    let means = stack(vec![layer(0.25, 2, 2, coverage, 1.0)]);

    let mut sd_data = uniform_grid(2, 2, 0.125);
    sd_data[0] = 0.0; // zero variance at one pixel
    let sds = stack(vec![RasterLayer::new(sd_data, 2, 2, coverage, 1.0)?]);

    let config = PipelineConfig {
        method: "zscore".to_string(),
        ..Default::default()
    };

    let classified = pipeline::run(&current, &means, &sds, &aoi, &grid, &config)?;
    assert_eq!(classified.get(0, 0), Some(anomaly_processor::NO_CLASS));
    assert_eq!(classified.class_counts(), [0, 0, 0, 0, 3]);
    Ok(())
}
