//! Snapping extents onto the reference grid and cropping layers to them.
//!
//! Rasters of different native resolution can only be compared
//! pixel-for-pixel when their extents sit on the same cell-boundary
//! lattice. The aligner replaces each edge of an arbitrary extent with
//! the nearest boundary of the matching axis; extents already on the
//! lattice pass through untouched.

use crate::error::Result;
use crate::layer::RasterLayer;
use crate::AnomalyError;
use anomaly_common::{Extent, ReferenceGrid};

/// Snap an extent to the nearest cell boundaries of the reference grid.
///
/// Pure function of its inputs and idempotent: aligning an already
/// aligned extent returns it unchanged (edges are compared with the
/// 7-decimal-digit tolerance, so floating-point noise does not trigger
/// a re-snap). Ties at exact half-cell distances resolve toward the
/// lower coordinate value, per [`ReferenceGrid::snap_lon`].
///
/// Fails with `InvalidExtent` when snapping collapses a degenerate
/// extent (input ordering is guaranteed by `Extent` itself).
pub fn align(extent: &Extent, grid: &ReferenceGrid) -> Result<Extent> {
    let already_aligned = grid.is_on_lon_boundary(extent.west)
        && grid.is_on_lon_boundary(extent.east)
        && grid.is_on_lat_boundary(extent.south)
        && grid.is_on_lat_boundary(extent.north);
    if already_aligned {
        return Ok(*extent);
    }

    let snapped = Extent::new(
        grid.snap_lon(extent.west),
        grid.snap_lon(extent.east),
        grid.snap_lat(extent.south),
        grid.snap_lat(extent.north),
    )?;
    Ok(snapped)
}

/// Extract the sub-window of a layer covering `target`.
///
/// The target extent must lie inside the layer's extent and on the
/// layer's own cell lattice (i.e. it was produced by [`align`] against
/// the grid the layer is defined on). Returns a new layer; the input is
/// untouched.
pub fn crop(layer: &RasterLayer, target: &Extent) -> Result<RasterLayer> {
    let cell = layer.cell_size;

    let col0 = (target.west - layer.extent.west) / cell;
    let row0 = (layer.extent.north - target.north) / cell;
    let ncols = target.width() / cell;
    let nrows = target.height() / cell;

    let col0 = col0.round() as i64;
    let row0 = row0.round() as i64;
    let ncols = ncols.round() as i64;
    let nrows = nrows.round() as i64;

    if col0 < 0
        || row0 < 0
        || ncols < 1
        || nrows < 1
        || col0 + ncols > layer.width as i64
        || row0 + nrows > layer.height as i64
    {
        return Err(AnomalyError::layer_mismatch(format!(
            "crop extent {:?} is outside layer extent {:?}",
            target, layer.extent
        )));
    }

    let (col0, row0, ncols, nrows) = (col0 as usize, row0 as usize, ncols as usize, nrows as usize);
    let mut data = Vec::with_capacity(ncols * nrows);
    for row in row0..row0 + nrows {
        let start = row * layer.width + col0;
        data.extend_from_slice(&layer.data[start..start + ncols]);
    }

    RasterLayer::new(data, ncols, nrows, *target, cell)
}
