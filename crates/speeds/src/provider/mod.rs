//! Input relations and batch assembly.

pub mod batch;

pub use batch::{assemble_trips, ShapeRow, StopTimeRow, TripData, TripRow, VpPing, VpRow};
