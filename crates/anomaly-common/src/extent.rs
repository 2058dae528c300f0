//! Geographic extent types and operations.

use serde::{Deserialize, Serialize};

/// A geographic extent in WGS84 degrees.
///
/// Unlike a raw corner pair, an `Extent` is validated on construction:
/// `west < east` and `south < north` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Extent {
    /// Create a new extent from its four edges.
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Result<Self, ExtentError> {
        if west >= east || south >= north {
            return Err(ExtentError::BadOrdering {
                west,
                east,
                south,
                north,
            });
        }
        Ok(Self {
            west,
            east,
            south,
            north,
        })
    }

    /// Parse an AOI parameter string: "west,south,east,north"
    pub fn from_csv_string(s: &str) -> Result<Self, ExtentError> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(ExtentError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| ExtentError::InvalidNumber(part.trim().to_string()))?;
        }

        Self::new(values[0], values[2], values[1], values[3])
    }

    /// Width of the extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Check if a point is contained within this extent.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Check if this extent intersects another.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Compute the intersection of two extents.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        if !self.intersects(other) {
            return None;
        }

        Some(Extent {
            west: self.west.max(other.west),
            east: self.east.min(other.east),
            south: self.south.max(other.south),
            north: self.north.min(other.north),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtentError {
    #[error("invalid extent ordering: west={west}, east={east}, south={south}, north={north}")]
    BadOrdering {
        west: f64,
        east: f64,
        south: f64,
        north: f64,
    },

    #[error("invalid extent format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("invalid number in extent: {0}")]
    InvalidNumber(String),
}
