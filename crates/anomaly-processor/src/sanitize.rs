//! Masking saturated digital values to no-data.
//!
//! Source samples are stored as low-precision fixed-point digital
//! numbers and rescaled to floating point on read. Values at or above
//! the nominal saturation point are rescaling artifacts, not valid
//! measurements, and must not reach downstream arithmetic. The index
//! value and the standard-deviation band saturate at different points,
//! so each is sanitized with its own bound (see `PipelineConfig`).

use crate::layer::RasterLayer;

/// Replace every sample `>= upper_bound` with no-data.
///
/// Never fails; an output that is entirely no-data is valid. Sanitizing
/// a layer whose values all lie below the bound returns an equal layer.
pub fn sanitize(layer: &RasterLayer, upper_bound: f32) -> RasterLayer {
    let data = layer
        .data
        .iter()
        .map(|&v| if v >= upper_bound { f32::NAN } else { v })
        .collect();
    layer.with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anomaly_common::Extent;

    fn layer(data: Vec<f32>) -> RasterLayer {
        let extent = Extent::new(0.0, 2.0, 0.0, 2.0).unwrap();
        RasterLayer::new(data, 2, 2, extent, 1.0).unwrap()
    }

    #[test]
    fn test_saturated_values_become_nodata() {
        let out = sanitize(&layer(vec![0.1, 0.92, 0.95, 0.5]), 0.92);
        assert_eq!(out.get(0, 0), Some(0.1));
        assert!(out.get(1, 0).unwrap().is_nan());
        assert!(out.get(0, 1).unwrap().is_nan());
        assert_eq!(out.get(1, 1), Some(0.5));
    }

    #[test]
    fn test_noop_below_bound() {
        let input = layer(vec![0.1, 0.2, 0.3, 0.4]);
        let out = sanitize(&input, 0.92);
        assert_eq!(out, input);
    }

    #[test]
    fn test_existing_nodata_passes_through() {
        let out = sanitize(&layer(vec![f32::NAN, 0.2, 0.3, 0.4]), 0.92);
        assert!(out.get(0, 0).unwrap().is_nan());
        assert_eq!(out.valid_count(), 3);
    }

    #[test]
    fn test_all_nodata_output_is_valid() {
        let out = sanitize(&layer(vec![0.95, 0.93, 0.92, 1.0]), 0.92);
        assert_eq!(out.valid_count(), 0);
    }
}
