//! Error types for the anomaly computation core.
//!
//! Only malformed configuration fails: bad extent ordering, an unknown
//! method token, overlapping thresholds. Data-level conditions (missing
//! samples, saturated values, zero variance) are represented as no-data
//! and never surface as errors.

use anomaly_common::ExtentError;
use thiserror::Error;

/// Errors that can occur in the anomaly pipeline.
#[derive(Error, Debug)]
pub enum AnomalyError {
    /// The extent is malformed (west >= east or south >= north).
    #[error("invalid extent: {0}")]
    InvalidExtent(#[from] ExtentError),

    /// The block aggregation factor is not a positive integer.
    #[error("invalid aggregation factor: {0}")]
    InvalidAggregationFactor(String),

    /// A temporal operation was asked to average zero layers.
    #[error("empty raster stack: {0}")]
    EmptyStack(String),

    /// The anomaly method token is not one of the recognized ones.
    #[error("unknown anomaly method: {0}")]
    UnknownMethod(String),

    /// Threshold values are out of order or both modes were specified.
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// Layers that must be co-registered differ in shape or extent.
    #[error("layer mismatch: {0}")]
    LayerMismatch(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl AnomalyError {
    /// Create an InvalidAggregationFactor error.
    pub fn invalid_aggregation_factor(msg: impl Into<String>) -> Self {
        Self::InvalidAggregationFactor(msg.into())
    }

    /// Create an EmptyStack error.
    pub fn empty_stack(msg: impl Into<String>) -> Self {
        Self::EmptyStack(msg.into())
    }

    /// Create an InvalidThresholds error.
    pub fn invalid_thresholds(msg: impl Into<String>) -> Self {
        Self::InvalidThresholds(msg.into())
    }

    /// Create a LayerMismatch error.
    pub fn layer_mismatch(msg: impl Into<String>) -> Self {
        Self::LayerMismatch(msg.into())
    }

    /// Create a ConfigError.
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Result type for anomaly pipeline operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;
