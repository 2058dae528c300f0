//! Conditional block aggregation onto a coarser grid.
//!
//! Downsamples a fine-resolution layer by an integer factor so it can be
//! compared pixel-for-pixel against reference statistics on the coarse
//! grid (333 m onto 1 km uses factor 3). Unlike a plain masked mean, an
//! output cell is only kept when its block carries strictly more than
//! `min_valid_count` valid samples; sparse blocks would otherwise yield
//! statistically weak aggregates.

use crate::error::{AnomalyError, Result};
use crate::layer::RasterLayer;
use anomaly_common::Extent;
use rayon::prelude::*;

/// Block-downsample a layer by `block_factor` in both axes.
///
/// Each output cell is the arithmetic mean of the valid samples in its
/// `block_factor x block_factor` input block when their count exceeds
/// `min_valid_count`, and no-data otherwise.
///
/// Partial blocks at the east/south edges are padded with no-data before
/// counting, so the output covers `ceil(dim / factor)` cells per axis and
/// the min-valid rule suppresses edge cells with too few real samples.
///
/// Output rows are computed in parallel; each worker writes its own
/// pre-partitioned slice of the output, so reassembly order is the
/// spatial order.
pub fn aggregate(
    layer: &RasterLayer,
    block_factor: usize,
    min_valid_count: usize,
) -> Result<RasterLayer> {
    if block_factor == 0 {
        return Err(AnomalyError::invalid_aggregation_factor(
            "block factor must be a positive integer",
        ));
    }

    let out_width = (layer.width + block_factor - 1) / block_factor;
    let out_height = (layer.height + block_factor - 1) / block_factor;
    let out_cell = layer.cell_size * block_factor as f64;

    tracing::debug!(
        in_shape = format!("{}x{}", layer.width, layer.height),
        out_shape = format!("{}x{}", out_width, out_height),
        block_factor,
        min_valid_count,
        "aggregating layer"
    );

    let mut output = vec![f32::NAN; out_width * out_height];

    output
        .par_chunks_mut(out_width)
        .enumerate()
        .for_each(|(out_row, out_cells)| {
            for (out_col, cell) in out_cells.iter_mut().enumerate() {
                *cell = block_mean(layer, out_col, out_row, block_factor, min_valid_count);
            }
        });

    let extent = Extent::new(
        layer.extent.west,
        layer.extent.west + out_width as f64 * out_cell,
        layer.extent.north - out_height as f64 * out_cell,
        layer.extent.north,
    )?;

    RasterLayer::new(output, out_width, out_height, extent, out_cell)
}

/// Mean of the valid samples in one block, or NaN when the count does
/// not exceed the minimum. Cells beyond the input edge count as no-data.
fn block_mean(
    layer: &RasterLayer,
    out_col: usize,
    out_row: usize,
    factor: usize,
    min_valid_count: usize,
) -> f32 {
    let mut sum = 0.0f64;
    let mut n_valid = 0usize;

    for row in out_row * factor..((out_row + 1) * factor).min(layer.height) {
        for col in out_col * factor..((out_col + 1) * factor).min(layer.width) {
            let v = layer.data[row * layer.width + col];
            if !v.is_nan() {
                sum += v as f64;
                n_valid += 1;
            }
        }
    }

    if n_valid > min_valid_count {
        (sum / n_valid as f64) as f32
    } else {
        f32::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_3x3(data: Vec<f32>) -> RasterLayer {
        let extent = Extent::new(0.0, 3.0, 0.0, 3.0).unwrap();
        RasterLayer::new(data, 3, 3, extent, 1.0).unwrap()
    }

    #[test]
    fn test_zero_factor_rejected() {
        let layer = layer_3x3(vec![0.0; 9]);
        assert!(matches!(
            aggregate(&layer, 0, 4),
            Err(AnomalyError::InvalidAggregationFactor(_))
        ));
    }

    #[test]
    fn test_block_with_enough_valid_samples() {
        // 5 valid of 9, min_valid_count = 4 -> "more than 4" holds.
        let layer = layer_3x3(vec![
            0.1,
            f32::NAN,
            0.2,
            f32::NAN,
            0.3,
            f32::NAN,
            0.4,
            f32::NAN,
            0.5,
        ]);
        let out = aggregate(&layer, 3, 4).unwrap();

        assert_eq!(out.width, 1);
        assert_eq!(out.height, 1);
        assert!((out.get(0, 0).unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_sparse_block_suppressed() {
        // Only 4 valid samples: 4 > 4 is false, so the block is no-data.
        let layer = layer_3x3(vec![
            0.1,
            f32::NAN,
            0.2,
            f32::NAN,
            0.3,
            f32::NAN,
            0.4,
            f32::NAN,
            f32::NAN,
        ]);
        let out = aggregate(&layer, 3, 4).unwrap();
        assert!(out.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_output_geometry() {
        let extent = Extent::new(10.0, 16.0, 40.0, 46.0).unwrap();
        let layer = RasterLayer::new(vec![1.0; 36], 6, 6, extent, 1.0).unwrap();

        let out = aggregate(&layer, 3, 4).unwrap();
        assert_eq!(out.width, 2);
        assert_eq!(out.height, 2);
        assert_eq!(out.cell_size, 3.0);
        assert_eq!(out.extent, extent);
        assert_eq!(out.get(1, 1), Some(1.0));
    }

    #[test]
    fn test_partial_edge_blocks_padded_with_nodata() {
        // 4x4 input, factor 3: edge blocks only cover 3 or 1 real cells,
        // which never exceeds min_valid_count = 4.
        let extent = Extent::new(0.0, 4.0, 0.0, 4.0).unwrap();
        let layer = RasterLayer::new(vec![1.0; 16], 4, 4, extent, 1.0).unwrap();

        let out = aggregate(&layer, 3, 4).unwrap();
        assert_eq!(out.width, 2);
        assert_eq!(out.height, 2);
        assert_eq!(out.get(0, 0), Some(1.0));
        assert!(out.get(1, 0).unwrap().is_nan());
        assert!(out.get(0, 1).unwrap().is_nan());
        assert!(out.get(1, 1).unwrap().is_nan());
        // Extent still covers the padded input.
        assert_eq!(out.extent.east, 6.0);
        assert_eq!(out.extent.south, -2.0);
    }

    #[test]
    fn test_min_valid_zero_keeps_any_valid_sample() {
        let mut data = vec![f32::NAN; 9];
        data[4] = 0.7;
        let out = aggregate(&layer_3x3(data), 3, 0).unwrap();
        assert_eq!(out.get(0, 0), Some(0.7));
    }
}
