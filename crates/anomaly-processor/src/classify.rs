//! Multi-threshold classification into five ordinal anomaly classes.
//!
//! Class 1 is the strongest negative anomaly, class 3 is normal, class 5
//! the strongest positive. Two threshold modes exist and the choice is
//! carried explicitly in [`ThresholdSpec`], never inferred from value
//! shape.

use crate::error::{AnomalyError, Result};
use crate::layer::{ClassifiedLayer, RasterLayer, NO_CLASS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the two class-boundary values are specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdSpec {
    /// Absolute cut values in anomaly units; bin edges additionally
    /// stretch to the anomaly layer's own min/max.
    Absolute { t1: f32, t2: f32 },
    /// Multipliers of the per-pixel reference standard deviation (simple
    /// anomalies), or of 1.0 for already-standardized z-scores.
    SdMultiplier { m1: f32, m2: f32 },
}

impl ThresholdSpec {
    /// Absolute mode, validating `t1 < t2`.
    pub fn absolute(t1: f32, t2: f32) -> Result<Self> {
        check_ordered(t1, t2)?;
        Ok(Self::Absolute { t1, t2 })
    }

    /// SD-multiplier mode, validating `m1 < m2`.
    pub fn sd_multiplier(m1: f32, m2: f32) -> Result<Self> {
        check_ordered(m1, m2)?;
        Ok(Self::SdMultiplier { m1, m2 })
    }
}

fn check_ordered(t1: f32, t2: f32) -> Result<()> {
    if t1 >= t2 {
        return Err(AnomalyError::invalid_thresholds(format!(
            "lower threshold {t1} must be strictly below upper threshold {t2}"
        )));
    }
    Ok(())
}

/// Classify an anomaly layer into five ordinal classes.
///
/// `ref_sd` is consulted only in SD-multiplier mode: when present the
/// class boundaries are computed per pixel as `±m × sd[pixel]` (simple
/// anomalies), when absent the multipliers cut the anomaly directly
/// (z-scores are already standardized).
///
/// Any pixel that is no-data in a binning input stays [`NO_CLASS`] in
/// the output, never silently falls into a class. Classes left empty by
/// thresholds beyond the data range are valid.
pub fn classify(
    anomaly: &RasterLayer,
    spec: ThresholdSpec,
    ref_sd: Option<&RasterLayer>,
) -> Result<ClassifiedLayer> {
    if let Some(sd) = ref_sd {
        if !anomaly.same_shape(sd) {
            return Err(AnomalyError::layer_mismatch(
                "ref_sd is not co-registered with the anomaly layer",
            ));
        }
    }

    tracing::debug!(?spec, "classifying anomaly layer");

    let classes = match spec {
        ThresholdSpec::Absolute { t1, t2 } => classify_absolute(anomaly, t1, t2),
        ThresholdSpec::SdMultiplier { m1, m2 } => classify_sd_multiplier(anomaly, ref_sd, m1, m2),
    };

    Ok(ClassifiedLayer {
        classes,
        width: anomaly.width,
        height: anomaly.height,
        extent: anomaly.extent,
        cell_size: anomaly.cell_size,
    })
}

/// Data-driven mode: bin edges `[min, -t2, -t1, t1, t2, max]`.
///
/// The lowest interval is closed on both ends, so exactly `-t2` lands in
/// class 1; the upper intervals are `[low, high)` with the top one
/// closed at `max`.
fn classify_absolute(anomaly: &RasterLayer, t1: f32, t2: f32) -> Vec<u8> {
    par_bin(anomaly, |v| {
        if v <= -t2 {
            1
        } else if v < -t1 {
            2
        } else if v < t1 {
            3
        } else if v < t2 {
            4
        } else {
            5
        }
    })
}

/// SD-multiplier mode: half-open intervals with ties toward the lower
/// class (`>=` lower bound, `<` upper bound).
fn classify_sd_multiplier(
    anomaly: &RasterLayer,
    ref_sd: Option<&RasterLayer>,
    m1: f32,
    m2: f32,
) -> Vec<u8> {
    match ref_sd {
        Some(sd) => {
            let width = anomaly.width;
            let mut classes = vec![NO_CLASS; anomaly.len()];
            classes
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, out_cells)| {
                    for (col, cell) in out_cells.iter_mut().enumerate() {
                        let idx = row * width + col;
                        let v = anomaly.data[idx];
                        let s = sd.data[idx];
                        if !v.is_nan() && !s.is_nan() {
                            *cell = bin(v, m1 * s, m2 * s);
                        }
                    }
                });
            classes
        }
        None => par_bin(anomaly, |v| bin(v, m1, m2)),
    }
}

/// The five-class ladder: `< -t2 -> 1`, `[-t2, -t1) -> 2`,
/// `[-t1, t1) -> 3`, `[t1, t2) -> 4`, `>= t2 -> 5`.
fn bin(v: f32, t1: f32, t2: f32) -> u8 {
    if v < -t2 {
        1
    } else if v < -t1 {
        2
    } else if v < t1 {
        3
    } else if v < t2 {
        4
    } else {
        5
    }
}

/// Row-parallel binning of valid samples; NaN stays NO_CLASS.
fn par_bin(anomaly: &RasterLayer, assign: impl Fn(f32) -> u8 + Sync) -> Vec<u8> {
    let width = anomaly.width;
    let mut classes = vec![NO_CLASS; anomaly.len()];
    classes
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out_cells)| {
            for (col, cell) in out_cells.iter_mut().enumerate() {
                let v = anomaly.data[row * width + col];
                if !v.is_nan() {
                    *cell = assign(v);
                }
            }
        });
    classes
}
