//! In-memory raster types.
//!
//! No-data is `f32::NAN` throughout the core; the I/O collaborator maps
//! its file sentinel to NaN when it constructs a [`RasterLayer`] and maps
//! it back when persisting. Layers are never mutated across component
//! boundaries: every pipeline stage consumes by reference and returns a
//! new layer.

use crate::error::{AnomalyError, Result};
use anomaly_common::grid::coords_equal;
use anomaly_common::Extent;

/// A single raster band for one geographic extent.
///
/// Samples are stored in row-major order, row 0 at the northern edge,
/// matching the scan order of the source products.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    /// The samples (row-major, top-to-bottom). NaN marks no-data.
    pub data: Vec<f32>,
    /// Width in cells.
    pub width: usize,
    /// Height in cells.
    pub height: usize,
    /// Geographic bounds of the layer.
    pub extent: Extent,
    /// Cell size in degrees.
    pub cell_size: f64,
}

impl RasterLayer {
    /// Create a new raster layer, checking that the sample count matches
    /// the declared shape.
    pub fn new(
        data: Vec<f32>,
        width: usize,
        height: usize,
        extent: Extent,
        cell_size: f64,
    ) -> Result<Self> {
        // A zero-cell layer can never be consistent with its (validated,
        // non-degenerate) extent, and chunked row iteration needs a
        // positive width.
        if width == 0 || height == 0 {
            return Err(AnomalyError::layer_mismatch(format!(
                "layer shape {}x{} has no cells",
                width, height
            )));
        }
        if data.len() != width * height {
            return Err(AnomalyError::layer_mismatch(format!(
                "sample count {} does not match shape {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            extent,
            cell_size,
        })
    }

    /// Get the sample at a grid position.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the layer has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of valid (non-NaN) samples.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Minimum and maximum over the valid samples, if any exist.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for &v in &self.data {
            if v.is_nan() {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        range
    }

    /// Check that another layer shares this layer's shape and extent.
    ///
    /// Extent edges are compared with the 7-decimal-digit coordinate
    /// tolerance; recomputed extents carry floating-point noise.
    pub fn same_shape(&self, other: &RasterLayer) -> bool {
        self.width == other.width
            && self.height == other.height
            && coords_equal(self.extent.west, other.extent.west)
            && coords_equal(self.extent.east, other.extent.east)
            && coords_equal(self.extent.south, other.extent.south)
            && coords_equal(self.extent.north, other.extent.north)
    }

    /// Build a new layer with the same geometry but different samples.
    pub(crate) fn with_data(&self, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            data,
            width: self.width,
            height: self.height,
            extent: self.extent,
            cell_size: self.cell_size,
        }
    }
}

/// An ordered sequence of co-registered layers (a time series, or an
/// LTS mean/sd pair split into per-period layers).
///
/// All members share one shape and extent; this is checked at
/// construction so downstream per-pixel arithmetic can index freely.
#[derive(Debug, Clone)]
pub struct RasterStack {
    layers: Vec<RasterLayer>,
}

impl RasterStack {
    /// Create a stack, rejecting members that are not co-registered.
    pub fn new(layers: Vec<RasterLayer>) -> Result<Self> {
        if let Some(first) = layers.first() {
            for (i, layer) in layers.iter().enumerate().skip(1) {
                if !first.same_shape(layer) {
                    return Err(AnomalyError::layer_mismatch(format!(
                        "stack member {} has shape {}x{}, expected {}x{}",
                        i, layer.width, layer.height, first.width, first.height
                    )));
                }
            }
        }
        Ok(Self { layers })
    }

    /// The stack members in order.
    pub fn layers(&self) -> &[RasterLayer] {
        &self.layers
    }

    /// Number of layers in the stack.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The first layer, which fixes the stack geometry.
    pub fn first(&self) -> Option<&RasterLayer> {
        self.layers.first()
    }
}

/// Class value marking no-data in a [`ClassifiedLayer`].
pub const NO_CLASS: u8 = 0;

/// Number of ordinal anomaly classes.
pub const NUM_CLASSES: usize = 5;

/// Terminal pipeline output: one ordinal class (1-5) per cell,
/// [`NO_CLASS`] where any binning input was no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLayer {
    /// Class per cell (row-major, top-to-bottom).
    pub classes: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub extent: Extent,
    pub cell_size: f64,
}

impl ClassifiedLayer {
    /// Get the class at a grid position.
    pub fn get(&self, col: usize, row: usize) -> Option<u8> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.classes.get(row * self.width + col).copied()
    }

    /// Per-class cell tallies, classes 1-5. Used by the legend renderer.
    pub fn class_counts(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0usize; NUM_CLASSES];
        for &c in &self.classes {
            if (1..=NUM_CLASSES as u8).contains(&c) {
                counts[(c - 1) as usize] += 1;
            }
        }
        counts
    }

    /// Number of no-data cells.
    pub fn nodata_count(&self) -> usize {
        self.classes.iter().filter(|&&c| c == NO_CLASS).count()
    }
}
