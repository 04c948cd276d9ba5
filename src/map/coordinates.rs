mod boxes;
mod coords;

/// Bounding boxes in degrees.
pub use boxes::*;
/// Coordinates.
pub use coords::*;
