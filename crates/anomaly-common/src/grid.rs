//! Reference grid specification and cell-boundary snapping.

use serde::{Deserialize, Serialize};

/// Number of decimal digits to which coordinates agree before they are
/// considered equal. Source rasters carry coordinates rescaled from
/// fixed-point digital numbers, so anything beyond this is noise.
const COORD_DECIMALS: f64 = 1e7;

/// Compare two coordinates after independent rounding to 7 decimal digits.
pub fn coords_equal(a: f64, b: f64) -> bool {
    (a * COORD_DECIMALS).round() == (b * COORD_DECIMALS).round()
}

/// Specification of the fixed global reference grid.
///
/// All rasters that participate in arithmetic together must be defined on
/// the same `ReferenceGrid`. The struct is a process-wide constant: build
/// it once (usually via [`grids`]) and pass it by value.
///
/// Cell boundaries are never materialized as sequences; snapping uses
/// closed-form index arithmetic on the boundary lattice:
///
/// - longitude boundaries: `lon_start + i * cell_size`, up to the
///   antimeridian (180°E)
/// - latitude boundaries: `lat_start - j * cell_size`, down to 90°S
///
/// where `lon_start`/`lat_start` are the grid origin shifted outward by
/// half a cell when `half_cell_offset` is set (pixel centers on the
/// origin lattice, boundaries between them).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceGrid {
    /// Longitude of the grid origin in degrees.
    pub origin_lon: f64,
    /// Latitude of the grid origin in degrees.
    pub origin_lat: f64,
    /// Cell size in degrees (square cells).
    pub cell_size: f64,
    /// Grid lines are offset by half a cell from the origin lattice.
    pub half_cell_offset: bool,
}

impl ReferenceGrid {
    /// Create a new reference grid specification.
    pub fn new(origin_lon: f64, origin_lat: f64, cell_size: f64, half_cell_offset: bool) -> Self {
        Self {
            origin_lon,
            origin_lat,
            cell_size,
            half_cell_offset,
        }
    }

    /// Westernmost cell boundary.
    pub fn lon_start(&self) -> f64 {
        if self.half_cell_offset {
            self.origin_lon - self.cell_size / 2.0
        } else {
            self.origin_lon
        }
    }

    /// Northernmost cell boundary.
    pub fn lat_start(&self) -> f64 {
        if self.half_cell_offset {
            self.origin_lat + self.cell_size / 2.0
        } else {
            self.origin_lat
        }
    }

    /// Number of longitude boundaries between `lon_start` and the antimeridian.
    fn lon_boundary_count(&self) -> i64 {
        ((180.0 - self.lon_start()) / self.cell_size + 1e-9).floor() as i64 + 1
    }

    /// Number of latitude boundaries between `lat_start` and 90°S.
    fn lat_boundary_count(&self) -> i64 {
        ((self.lat_start() + 90.0) / self.cell_size + 1e-9).floor() as i64 + 1
    }

    /// Snap a longitude to the nearest cell boundary.
    ///
    /// At an exact half-cell distance the tie resolves toward the lower
    /// coordinate value. Results are clamped to the boundary range.
    pub fn snap_lon(&self, lon: f64) -> f64 {
        let t = (lon - self.lon_start()) / self.cell_size;
        let floor = t.floor();
        let frac = t - floor;
        // frac == 0.5 takes the western (lower-valued) boundary
        let i = if frac <= 0.5 { floor as i64 } else { floor as i64 + 1 };
        let i = i.clamp(0, self.lon_boundary_count() - 1);
        self.lon_start() + i as f64 * self.cell_size
    }

    /// Snap a latitude to the nearest cell boundary.
    ///
    /// Boundaries descend from `lat_start`; at an exact half-cell distance
    /// the tie resolves toward the lower coordinate value (the southern
    /// boundary). Results are clamped to the boundary range.
    pub fn snap_lat(&self, lat: f64) -> f64 {
        let t = (self.lat_start() - lat) / self.cell_size;
        let floor = t.floor();
        let frac = t - floor;
        // frac == 0.5 takes the southern (lower-valued) boundary
        let j = if frac < 0.5 { floor as i64 } else { floor as i64 + 1 };
        let j = j.clamp(0, self.lat_boundary_count() - 1);
        self.lat_start() - j as f64 * self.cell_size
    }

    /// Check whether a longitude already lies on a cell boundary
    /// (within the 7-decimal-digit tolerance).
    pub fn is_on_lon_boundary(&self, lon: f64) -> bool {
        coords_equal(lon, self.snap_lon(lon))
    }

    /// Check whether a latitude already lies on a cell boundary.
    pub fn is_on_lat_boundary(&self, lat: f64) -> bool {
        coords_equal(lat, self.snap_lat(lat))
    }
}

/// Reference grids of the source product lines.
pub mod grids {
    use super::*;

    /// Copernicus Global Land 1 km grid (1/112°, boundaries at half-cell
    /// offsets from integer degrees).
    pub fn cgls_1km() -> ReferenceGrid {
        ReferenceGrid::new(-180.0, 80.0, 1.0 / 112.0, true)
    }

    /// Copernicus Global Land 333 m grid (1/336°).
    pub fn cgls_333m() -> ReferenceGrid {
        ReferenceGrid::new(-180.0, 80.0, 1.0 / 336.0, true)
    }
}
