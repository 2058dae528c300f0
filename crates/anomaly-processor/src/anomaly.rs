//! Anomaly scoring against long-term reference statistics.

use crate::error::{AnomalyError, Result};
use crate::layer::RasterLayer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Anomaly formula selector.
///
/// Carried as an explicit tagged variant; the configuration token is
/// validated once at the boundary via [`AnomalyMethod::from_token`] and
/// never re-inspected downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyMethod {
    /// `current - ref_mean`, in index units.
    Simple,
    /// `(current - ref_mean) / ref_sd`, standardized.
    ZScore,
}

impl AnomalyMethod {
    /// Parse a method token (case-insensitive).
    ///
    /// Anything other than `"simple"` or `"zscore"` is a hard failure;
    /// the pipeline aborts rather than falling back silently.
    pub fn from_token(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "zscore" => Ok(Self::ZScore),
            _ => Err(AnomalyError::UnknownMethod(s.to_string())),
        }
    }

    /// Get the method token as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::ZScore => "zscore",
        }
    }
}

impl std::fmt::Display for AnomalyMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signed difference anomaly: `current - ref_mean` per pixel.
///
/// No-data in either input propagates to the output.
pub fn simple_anomaly(current: &RasterLayer, ref_mean: &RasterLayer) -> Result<RasterLayer> {
    check_registered(current, ref_mean, "ref_mean")?;
    Ok(current.with_data(per_pixel(current, |i| {
        current.data[i] - ref_mean.data[i]
    })))
}

/// Standardized anomaly: `(current - ref_mean) / ref_sd` per pixel.
///
/// Pixels with zero reference variance produce no-data rather than an
/// infinite or NaN-by-division value; zero spread means the z-score is
/// undefined there, not extreme.
pub fn zscore_anomaly(
    current: &RasterLayer,
    ref_mean: &RasterLayer,
    ref_sd: &RasterLayer,
) -> Result<RasterLayer> {
    check_registered(current, ref_mean, "ref_mean")?;
    check_registered(current, ref_sd, "ref_sd")?;
    Ok(current.with_data(per_pixel(current, |i| {
        let sd = ref_sd.data[i];
        if sd == 0.0 {
            f32::NAN
        } else {
            (current.data[i] - ref_mean.data[i]) / sd
        }
    })))
}

/// Dispatch on the method variant.
///
/// `ZScore` requires a reference standard-deviation layer; asking for it
/// without one is a configuration error.
pub fn compute(
    current: &RasterLayer,
    ref_mean: &RasterLayer,
    ref_sd: Option<&RasterLayer>,
    method: AnomalyMethod,
) -> Result<RasterLayer> {
    match method {
        AnomalyMethod::Simple => simple_anomaly(current, ref_mean),
        AnomalyMethod::ZScore => {
            let sd = ref_sd.ok_or_else(|| {
                AnomalyError::config_error("zscore method requires a reference sd layer")
            })?;
            zscore_anomaly(current, ref_mean, sd)
        }
    }
}

fn check_registered(current: &RasterLayer, other: &RasterLayer, name: &str) -> Result<()> {
    if !current.same_shape(other) {
        return Err(AnomalyError::layer_mismatch(format!(
            "{name} is not co-registered with the current layer ({}x{} vs {}x{})",
            other.width, other.height, current.width, current.height
        )));
    }
    Ok(())
}

/// Row-parallel per-pixel map. NaN operands propagate through the
/// arithmetic on their own; only the division guard needs explicit
/// handling.
fn per_pixel(current: &RasterLayer, op: impl Fn(usize) -> f32 + Sync) -> Vec<f32> {
    let width = current.width;
    let mut output = vec![f32::NAN; current.len()];
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out_cells)| {
            for (col, cell) in out_cells.iter_mut().enumerate() {
                *cell = op(row * width + col);
            }
        });
    output
}
