//! Common test fixtures for vi-anomaly tests.
//!
//! This module provides pre-defined AOI extents and grid parameters that
//! represent common scenarios in vegetation-index anomaly processing.

/// Common AOI extent definitions for testing, as (west, south, east, north).
pub mod aoi {
    /// Global extent (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Senegal window from the reference use case
    pub const SENEGAL: (f64, f64, f64, f64) = (-17.54, 12.29, -11.34, 16.69);

    /// Horn of Africa drought-monitoring window
    pub const HORN_OF_AFRICA: (f64, f64, f64, f64) = (32.0, -5.0, 51.5, 15.0);

    /// A small one-degree test window
    pub const SMALL_WINDOW: (f64, f64, f64, f64) = (-17.0, 14.0, -16.0, 15.0);

    /// Invalid extent (west > east)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Reference-grid parameters for testing, as
/// (origin_lon, origin_lat, cell_size, half_cell_offset).
pub mod grid {
    /// Unit-degree grid anchored at Greenwich; convenient for tests
    /// where snapped coordinates should be integers.
    pub const UNIT: (f64, f64, f64, bool) = (0.0, 90.0, 1.0, false);

    /// Copernicus Global Land 1 km grid.
    pub const CGLS_1KM: (f64, f64, f64, bool) = (-180.0, 80.0, 1.0 / 112.0, true);

    /// Copernicus Global Land 333 m grid.
    pub const CGLS_333M: (f64, f64, f64, bool) = (-180.0, 80.0, 1.0 / 336.0, true);
}

/// Index values around the saturation bound.
pub mod values {
    /// Nominal saturation point of the rescaled index.
    pub const SATURATION: f32 = 0.92;

    /// A healthy dense-vegetation index value.
    pub const DENSE_VEGETATION: f32 = 0.75;

    /// A sparse-vegetation index value.
    pub const SPARSE_VEGETATION: f32 = 0.25;
}
