//! Spatial indexing for vehicle-position search.

pub mod index;

pub use index::{NearestPositionIndex, DEFAULT_K_NEIGHBORS};
