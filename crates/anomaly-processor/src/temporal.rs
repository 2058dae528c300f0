//! Pooling per-pixel statistics across time periods.
//!
//! When the comparison window spans several dekads, the per-period LTS
//! layers collapse into one mean layer and one pooled
//! standard-deviation layer before anomaly scoring. A pixel contributes
//! whatever periods are valid there and becomes no-data only when every
//! period is no-data at that pixel.

use crate::error::{AnomalyError, Result};
use crate::layer::{RasterLayer, RasterStack};
use rayon::prelude::*;

/// Per-pixel arithmetic mean across the stack.
///
/// Periods that are no-data at a pixel are excluded from that pixel's
/// mean; the output is no-data only where all periods are.
pub fn average_mean(stack: &RasterStack) -> Result<RasterLayer> {
    combine(stack, "average_mean", |values| {
        let sum: f64 = values.iter().map(|&v| v as f64).sum();
        (sum / values.len() as f64) as f32
    })
}

/// Per-pixel pooled standard deviation across the stack.
///
/// Computed as `sqrt(sum(sd_i^2) / n)` over the `n` periods valid at the
/// pixel. Plain averaging of standard deviations understates the
/// combined variance (pooled-variance identity for equal-sample-size
/// periods), so the squares are pooled, not the deviations.
pub fn average_pooled_sd(stack: &RasterStack) -> Result<RasterLayer> {
    combine(stack, "average_pooled_sd", |values| {
        let sum_sq: f64 = values.iter().map(|&v| (v as f64) * (v as f64)).sum();
        (sum_sq / values.len() as f64).sqrt() as f32
    })
}

/// Apply a per-pixel reduction over the valid samples of the stack.
///
/// Output rows are computed in parallel over pre-partitioned slices, so
/// reassembly order is spatial order.
fn combine(
    stack: &RasterStack,
    op: &str,
    reduce: impl Fn(&[f32]) -> f32 + Sync,
) -> Result<RasterLayer> {
    let first = stack
        .first()
        .ok_or_else(|| AnomalyError::empty_stack(format!("{op} needs at least one layer")))?;

    tracing::debug!(periods = stack.len(), op, "combining temporal stack");

    let width = first.width;
    let mut output = vec![f32::NAN; first.len()];

    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out_cells)| {
            let mut valid = Vec::with_capacity(stack.len());
            for (col, cell) in out_cells.iter_mut().enumerate() {
                let idx = row * width + col;
                valid.clear();
                for layer in stack.layers() {
                    let v = layer.data[idx];
                    if !v.is_nan() {
                        valid.push(v);
                    }
                }
                if !valid.is_empty() {
                    *cell = reduce(&valid);
                }
            }
        });

    Ok(first.with_data(output))
}
