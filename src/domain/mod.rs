//! Pure domain types with minimal dependencies
//!
//! Markers and points know nothing about rendering, capture or delivery.

pub mod geometry;
pub mod marker;

pub use geometry::*;
pub use marker::*;
