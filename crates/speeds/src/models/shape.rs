//! Trip path geometry and linear referencing.

use geo::{EuclideanLength, LineLocatePoint, LineString, Point};

use crate::identifiers::ShapeId;
use crate::models::types::{Result, SpeedError};

/// A trip's route geometry as an ordered polyline, validated on
/// construction and immutable afterwards.
///
/// Coordinates are planar meters. A polyline with fewer than two vertices
/// cannot be linearly referenced, so it is rejected here; the projection
/// below is total for every validated path.
#[derive(Clone, Debug)]
pub struct ShapePath {
    line: LineString,
    length_m: f64,
}

impl ShapePath {
    pub fn new(shape_id: &ShapeId, line: LineString) -> Result<Self> {
        let vertices = line.0.len();
        if vertices < 2 {
            return Err(SpeedError::DegeneratePath(shape_id.clone(), vertices));
        }
        let length_m = line.euclidean_length();
        Ok(Self { line, length_m })
    }

    /// Arc length of the whole path in meters.
    pub fn length_meters(&self) -> f64 {
        self.length_m
    }

    /// Linear referencing: distance along the path of the point on the
    /// polyline nearest to `point`, in `[0, length_meters()]`.
    ///
    /// Defined for any query point, including points far off the path.
    pub fn project(&self, point: Point) -> f64 {
        // line_locate_point only returns None for degenerate geometry,
        // which construction rules out; fall back to the path start.
        let fraction = self.line.line_locate_point(&point).unwrap_or(0.0);
        fraction * self.length_m
    }

    pub fn line(&self) -> &LineString {
        &self.line
    }
}
