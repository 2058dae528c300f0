//! Vegetation-Index Anomaly Computation Core
//!
//! This crate compares a current satellite-derived vegetation-index
//! raster against long-term reference statistics and classifies each
//! pixel into one of five ordinal anomaly classes. It is pure compute
//! over in-memory layers: file decoding, polygon masking and rendering
//! live in collaborator crates.
//!
//! # Architecture
//!
//! ```text
//! current + LTS rasters (from the reader)
//!      │
//!      ▼
//! sanitize(layer, upper_bound)       mask saturated digital values
//!      │
//!      ▼
//! align(aoi, grid) + crop            snap the AOI to the reference grid
//!      │
//!      ▼
//! aggregate(layer, factor, min)     [only on resolution mismatch]
//!      │
//!      ▼
//! average_mean / average_pooled_sd  [only over multi-period stacks]
//!      │
//!      ▼
//! compute(current, mean, sd, method) signed anomaly layer
//!      │
//!      ▼
//! classify(anomaly, thresholds)      five ordinal classes
//!      │
//!      ▼
//! ClassifiedLayer (to the renderer)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use anomaly_processor::{pipeline, PipelineConfig, RasterLayer, RasterStack};
//! use anomaly_common::{grid::grids, Extent};
//!
//! let aoi = Extent::from_csv_string("-17.54,12.29,-11.34,16.69")?;
//! let config = PipelineConfig::from_env();
//! let classified = pipeline::run(
//!     &current, &lts_means, &lts_sds, &aoi, &grids::cgls_1km(), &config,
//! )?;
//! for (class, count) in classified.class_counts().iter().enumerate() {
//!     // hand off to the legend renderer...
//! }
//! ```

pub mod aggregate;
pub mod align;
pub mod anomaly;
pub mod classify;
pub mod config;
pub mod error;
pub mod layer;
pub mod pipeline;
pub mod sanitize;
pub mod temporal;

// Re-export commonly used types at crate root
pub use aggregate::aggregate;
pub use align::{align, crop};
pub use anomaly::{compute, simple_anomaly, zscore_anomaly, AnomalyMethod};
pub use classify::{classify, ThresholdSpec};
pub use config::PipelineConfig;
pub use error::{AnomalyError, Result};
pub use layer::{ClassifiedLayer, RasterLayer, RasterStack, NO_CLASS, NUM_CLASSES};
pub use sanitize::sanitize;
pub use temporal::{average_mean, average_pooled_sd};
