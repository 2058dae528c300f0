//! Common types shared across the vegetation-index anomaly workspace.

pub mod dekad;
pub mod extent;
pub mod grid;

pub use dekad::{Dekad, DekadParseError};
pub use extent::{Extent, ExtentError};
pub use grid::ReferenceGrid;
