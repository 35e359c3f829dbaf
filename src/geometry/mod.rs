//! Planar geometry for site placement.
//!
//! Coordinates and distances are rounded to [`COORD_DECIMALS`] decimal
//! digits so that distances computed at generation time and distances read
//! back from an instance file are bit-identical.

mod point;

pub use point::{round_coord, Point, COORD_DECIMALS};
