//! Data models for the segment-speed engine.

pub mod shape;
pub mod types;

// Re-exports for convenience
pub use shape::ShapePath;
pub use types::{
    CardinalDirection, Result, Segment, SpeedError, StopVisit, VpObservation, MISSING_VP_IDX,
    MPH_PER_MPS,
};
