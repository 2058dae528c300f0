//! End-to-end pipeline composition.
//!
//! Wires the stages together for the common case: one current-period
//! layer against LTS mean/sd stacks, all cropped to an AOI snapped onto
//! the reference grid. Callers with unusual flows (pre-aggregated
//! inputs, single-stage reuse) call the stage functions directly.

use crate::aggregate::aggregate;
use crate::align::{align, crop};
use crate::anomaly::{compute, AnomalyMethod};
use crate::classify::{classify, ThresholdSpec};
use crate::config::PipelineConfig;
use crate::error::{AnomalyError, Result};
use crate::layer::{ClassifiedLayer, RasterLayer, RasterStack};
use crate::sanitize::sanitize;
use crate::temporal::{average_mean, average_pooled_sd};
use anomaly_common::{Extent, ReferenceGrid};

/// Run the full anomaly pipeline.
///
/// Control flow: sanitize -> align + crop -> aggregate (only when the
/// current layer is finer than the reference stacks) -> temporal
/// average -> anomaly -> classify. Inputs are untouched; the result is
/// a freshly allocated [`ClassifiedLayer`] for the aligned AOI.
///
/// The LTS stacks must be on the reference-grid resolution and cover
/// the aligned AOI; the current layer may be on the fine grid, in which
/// case it is block-aggregated by `config.aggregation_factor`.
pub fn run(
    current: &RasterLayer,
    lts_means: &RasterStack,
    lts_sds: &RasterStack,
    aoi: &Extent,
    grid: &ReferenceGrid,
    config: &PipelineConfig,
) -> Result<ClassifiedLayer> {
    config.validate()?;
    let method = config.anomaly_method()?;
    let thresholds = config.threshold_spec()?;

    tracing::info!(%method, ?thresholds, periods = lts_means.len(), "running anomaly pipeline");

    let aligned = align(aoi, grid)?;
    tracing::debug!(?aoi, ?aligned, "aligned AOI to reference grid");

    let current = crop(&sanitize(current, config.index_upper_bound), &aligned)?;
    let means = sanitize_and_crop(lts_means, config.index_upper_bound, &aligned)?;
    let sds = sanitize_and_crop(lts_sds, config.sd_upper_bound, &aligned)?;

    let ref_mean = average_mean(&means)?;
    let ref_sd = average_pooled_sd(&sds)?;

    let current = match resolution_factor(&current, &ref_mean, config)? {
        1 => current,
        factor => aggregate(&current, factor, config.min_valid_count)?,
    };

    let anomaly = match method {
        AnomalyMethod::Simple => compute(&current, &ref_mean, None, method)?,
        AnomalyMethod::ZScore => compute(&current, &ref_mean, Some(&ref_sd), method)?,
    };

    // Per-pixel SD cuts only apply to unstandardized anomalies; z-scores
    // take the multipliers directly.
    let classify_sd = match (method, thresholds) {
        (AnomalyMethod::Simple, ThresholdSpec::SdMultiplier { .. }) => Some(&ref_sd),
        _ => None,
    };

    let classified = classify(&anomaly, thresholds, classify_sd)?;
    tracing::info!(
        class_counts = ?classified.class_counts(),
        nodata = classified.nodata_count(),
        "pipeline complete"
    );
    Ok(classified)
}

fn sanitize_and_crop(
    stack: &RasterStack,
    upper_bound: f32,
    target: &Extent,
) -> Result<RasterStack> {
    let layers = stack
        .layers()
        .iter()
        .map(|layer| crop(&sanitize(layer, upper_bound), target))
        .collect::<Result<Vec<_>>>()?;
    RasterStack::new(layers)
}

/// Ratio between the reference resolution and the current layer's,
/// checked against the configured aggregation factor.
fn resolution_factor(
    current: &RasterLayer,
    reference: &RasterLayer,
    config: &PipelineConfig,
) -> Result<usize> {
    let ratio = reference.cell_size / current.cell_size;
    if (ratio - 1.0).abs() < 1e-6 {
        return Ok(1);
    }

    let factor = ratio.round();
    if factor < 1.0 || (ratio - factor).abs() > 1e-6 {
        return Err(AnomalyError::config_error(format!(
            "reference/current resolution ratio {ratio} is not an integer aggregation factor"
        )));
    }
    if factor as usize != config.aggregation_factor {
        return Err(AnomalyError::config_error(format!(
            "resolution ratio {factor} does not match configured aggregation factor {}",
            config.aggregation_factor
        )));
    }
    Ok(config.aggregation_factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(value: f32, n: usize, extent: Extent, cell: f64) -> RasterLayer {
        RasterLayer::new(vec![value; n * n], n, n, extent, cell).unwrap()
    }

    #[test]
    fn test_resolution_factor_detection() {
        let extent = Extent::new(0.0, 6.0, 0.0, 6.0).unwrap();
        let fine = layer(0.5, 6, extent, 1.0);
        let coarse = layer(0.5, 2, extent, 3.0);
        let config = PipelineConfig::default();

        assert_eq!(resolution_factor(&coarse, &coarse, &config).unwrap(), 1);
        assert_eq!(resolution_factor(&fine, &coarse, &config).unwrap(), 3);
    }

    #[test]
    fn test_resolution_factor_mismatch_rejected() {
        let extent = Extent::new(0.0, 6.0, 0.0, 6.0).unwrap();
        let fine = layer(0.5, 6, extent, 1.0);
        let coarse = layer(0.5, 3, extent, 2.0);
        let config = PipelineConfig::default(); // factor 3, data says 2

        assert!(matches!(
            resolution_factor(&fine, &coarse, &config),
            Err(AnomalyError::ConfigError(_))
        ));
    }
}
