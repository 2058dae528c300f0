//! Configuration for the anomaly pipeline.
//!
//! The orchestration layer supplies these values (CLI, env, or a job
//! description); the pipeline validates them once at the boundary and
//! works with typed variants from then on.

use crate::anomaly::AnomalyMethod;
use crate::classify::ThresholdSpec;
use crate::error::{AnomalyError, Result};
use serde::{Deserialize, Serialize};

/// Saturation point of the rescaled vegetation index. Digital numbers at
/// or above it are flag values, not measurements.
pub const DEFAULT_INDEX_UPPER_BOUND: f32 = 0.92;

/// Saturation point of the rescaled standard-deviation band.
pub const DEFAULT_SD_UPPER_BOUND: f32 = 0.92;

/// Configuration for one anomaly pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Anomaly method token: "simple" or "zscore".
    pub method: String,

    /// Absolute threshold pair (t1, t2) in anomaly units. Mutually
    /// exclusive with `sd_multipliers`.
    pub absolute_thresholds: Option<(f32, f32)>,

    /// SD-multiplier threshold pair (m1, m2). Mutually exclusive with
    /// `absolute_thresholds`; when neither is given the source defaults
    /// (1, 2) apply.
    pub sd_multipliers: Option<(f32, f32)>,

    /// Block factor for aggregating the fine grid onto the reference
    /// grid (3 for 333 m onto 1 km).
    pub aggregation_factor: usize,

    /// An aggregated cell is kept only when its block carries strictly
    /// more than this many valid samples.
    pub min_valid_count: usize,

    /// Sanitization bound for the index band.
    pub index_upper_bound: f32,

    /// Sanitization bound for the standard-deviation band.
    pub sd_upper_bound: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            method: "zscore".to_string(),
            absolute_thresholds: None,
            sd_multipliers: None,
            aggregation_factor: 3,
            min_valid_count: 4,
            index_upper_bound: DEFAULT_INDEX_UPPER_BOUND,
            sd_upper_bound: DEFAULT_SD_UPPER_BOUND,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ANOM_METHOD") {
            config.method = val;
        }

        if let (Ok(t1), Ok(t2)) = (std::env::var("ANOM_ABS_T1"), std::env::var("ANOM_ABS_T2")) {
            if let (Ok(t1), Ok(t2)) = (t1.parse(), t2.parse()) {
                config.absolute_thresholds = Some((t1, t2));
            }
        }

        if let (Ok(m1), Ok(m2)) = (std::env::var("ANOM_SD_M1"), std::env::var("ANOM_SD_M2")) {
            if let (Ok(m1), Ok(m2)) = (m1.parse(), m2.parse()) {
                config.sd_multipliers = Some((m1, m2));
            }
        }

        if let Ok(val) = std::env::var("AGGREGATION_FACTOR") {
            if let Ok(factor) = val.parse() {
                config.aggregation_factor = factor;
            }
        }

        if let Ok(val) = std::env::var("MIN_VALID_COUNT") {
            if let Ok(count) = val.parse() {
                config.min_valid_count = count;
            }
        }

        if let Ok(val) = std::env::var("INDEX_UPPER_BOUND") {
            if let Ok(bound) = val.parse() {
                config.index_upper_bound = bound;
            }
        }

        if let Ok(val) = std::env::var("SD_UPPER_BOUND") {
            if let Ok(bound) = val.parse() {
                config.sd_upper_bound = bound;
            }
        }

        config
    }

    /// The validated anomaly method.
    pub fn anomaly_method(&self) -> Result<AnomalyMethod> {
        AnomalyMethod::from_token(&self.method)
    }

    /// The validated threshold specification.
    ///
    /// Exactly one mode may be specified; both at once is an error, and
    /// neither selects the source defaults of 1 and 2 standard
    /// deviations.
    pub fn threshold_spec(&self) -> Result<ThresholdSpec> {
        match (self.absolute_thresholds, self.sd_multipliers) {
            (Some(_), Some(_)) => Err(AnomalyError::invalid_thresholds(
                "absolute thresholds and sd multipliers are mutually exclusive",
            )),
            (Some((t1, t2)), None) => ThresholdSpec::absolute(t1, t2),
            (None, Some((m1, m2))) => ThresholdSpec::sd_multiplier(m1, m2),
            (None, None) => ThresholdSpec::sd_multiplier(1.0, 2.0),
        }
    }

    /// Validate the whole configuration, failing fast on the first
    /// malformed value.
    pub fn validate(&self) -> Result<()> {
        self.anomaly_method()?;
        self.threshold_spec()?;

        if self.aggregation_factor == 0 {
            return Err(AnomalyError::invalid_aggregation_factor(
                "aggregation_factor must be > 0",
            ));
        }

        if !self.index_upper_bound.is_finite() || !self.sd_upper_bound.is_finite() {
            return Err(AnomalyError::config_error(
                "sanitization bounds must be finite",
            ));
        }

        Ok(())
    }
}
