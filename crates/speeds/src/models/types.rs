//! Core data types for the speed engine.
//!
//! All positions are planar coordinates in meters (callers project to a
//! metric CRS before handing data in); all derived fields are recomputed
//! per analysis run and are never authoritative.

use std::fmt;

use chrono::NaiveDateTime;
use geo::Point;

use crate::identifiers::*;

/// Meters/second to miles/hour.
pub const MPH_PER_MPS: f64 = 2.237;

/// Sentinel for a missing bracket side. Real `vp_idx` values are assigned
/// from a non-negative running counter, so -1 can never collide.
pub const MISSING_VP_IDX: i64 = -1;

// ============================================================================
// Cardinal Directions
// ============================================================================

/// Coarse compass direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CardinalDirection {
    Northbound,
    Southbound,
    Eastbound,
    Westbound,
    Unknown,
}

impl CardinalDirection {
    /// Classify a displacement vector into its primary compass direction.
    ///
    /// The larger component wins; on a tie the north/south branch decides.
    /// A winning component of exactly zero is `Unknown`.
    pub fn from_displacement(dx: f64, dy: f64) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Self::Eastbound
            } else if dx < 0.0 {
                Self::Westbound
            } else {
                Self::Unknown
            }
        } else if dy > 0.0 {
            Self::Northbound
        } else if dy < 0.0 {
            Self::Southbound
        } else {
            Self::Unknown
        }
    }

    /// The opposing direction of travel, used to exclude wrong-way vehicle
    /// passes. `Unknown` has no opposite.
    pub fn opposite(self) -> Option<Self> {
        match self {
            Self::Northbound => Some(Self::Southbound),
            Self::Southbound => Some(Self::Northbound),
            Self::Eastbound => Some(Self::Westbound),
            Self::Westbound => Some(Self::Eastbound),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Northbound => "Northbound",
            Self::Southbound => "Southbound",
            Self::Eastbound => "Eastbound",
            Self::Westbound => "Westbound",
            Self::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// Observations and Visits
// ============================================================================

/// One real-time vehicle-position ping, annotated with its travel direction.
///
/// `vp_idx` is a global ordinal over the whole batch: unique everywhere,
/// increasing within a trip, not reset per trip.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VpObservation {
    pub vp_idx: i64,
    pub location_timestamp: NaiveDateTime,
    pub position: Point,
    pub primary_direction: CardinalDirection,
}

/// One stop of a trip with every field the engine derives for it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StopVisit {
    pub stop_id: StopId,
    pub stop_sequence: u32,
    pub position: Point,
    /// Raw scheduled arrival (seconds after midnight), carried as metadata.
    pub scheduled_arrival_sec: Option<u32>,

    /// Projection of `position` onto the trip's shape, meters from its start.
    pub stop_meters: f64,
    /// Direction of travel approaching this stop; first stop is `Unknown`.
    pub primary_direction: CardinalDirection,
    /// Interpolated observed arrival; `None` when no estimate exists.
    pub arrival_time: Option<NaiveDateTime>,

    /// Bracketing vp indices ([`MISSING_VP_IDX`] when a side is absent).
    pub before_vp_idx: i64,
    pub after_vp_idx: i64,
}

// ============================================================================
// Segments
// ============================================================================

/// The travel span between two consecutive stops of one trip.
///
/// `speed_mph` is `None` when an endpoint arrival time is missing, and may
/// legitimately be infinite (zero elapsed seconds) or negative (ordering
/// violation). Filtering implausible values is the consumer's concern.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    pub trip_key: TripInstanceKey,
    pub stop_sequence: u32,
    pub subseq_stop_sequence: u32,
    pub stop_id: StopId,
    pub subseq_stop_id: StopId,
    pub meters_elapsed: f64,
    pub sec_elapsed: Option<f64>,
    pub speed_mph: Option<f64>,
}

impl Segment {
    /// Stop-sequence pair label, e.g. `"3__4"`.
    pub fn stop_seq_pair(&self) -> String {
        format!("{}__{}", self.stop_sequence, self.subseq_stop_sequence)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SpeedError {
    #[error("shape {0} has {1} vertices, need at least 2")]
    DegeneratePath(ShapeId, usize),

    #[error("trip {trip_key} references missing shape {shape_id}")]
    MissingShape {
        trip_key: TripInstanceKey,
        shape_id: ShapeId,
    },
}

pub type Result<T> = std::result::Result<T, SpeedError>;

#[cfg(test)]
mod tests {
    use super::*;
    use CardinalDirection::*;

    #[test]
    fn test_classifier_is_total() {
        assert_eq!(CardinalDirection::from_displacement(5.0, 1.0), Eastbound);
        assert_eq!(CardinalDirection::from_displacement(-5.0, 1.0), Westbound);
        assert_eq!(CardinalDirection::from_displacement(1.0, 5.0), Northbound);
        assert_eq!(CardinalDirection::from_displacement(1.0, -5.0), Southbound);
        assert_eq!(CardinalDirection::from_displacement(0.0, 0.0), Unknown);
    }

    #[test]
    fn test_classifier_tie_goes_north_south() {
        // Equal magnitudes fall through to the north/south branch.
        assert_eq!(CardinalDirection::from_displacement(3.0, 3.0), Northbound);
        assert_eq!(CardinalDirection::from_displacement(3.0, -3.0), Southbound);
    }

    #[test]
    fn test_zero_winning_component_is_unknown() {
        // dy wins the comparison but is exactly zero.
        assert_eq!(CardinalDirection::from_displacement(0.0, 0.0), Unknown);
    }

    #[test]
    fn test_opposite_table() {
        assert_eq!(Northbound.opposite(), Some(Southbound));
        assert_eq!(Southbound.opposite(), Some(Northbound));
        assert_eq!(Eastbound.opposite(), Some(Westbound));
        assert_eq!(Westbound.opposite(), Some(Eastbound));
        assert_eq!(Unknown.opposite(), None);
    }

    #[test]
    fn test_stop_seq_pair_label() {
        let seg = Segment {
            trip_key: TripInstanceKey::new(
                "op",
                chrono::NaiveDate::from_ymd_opt(2024, 10, 16).unwrap(),
                "t1",
            ),
            stop_sequence: 3,
            subseq_stop_sequence: 4,
            stop_id: StopId::new("a"),
            subseq_stop_id: StopId::new("b"),
            meters_elapsed: 500.0,
            sec_elapsed: Some(100.0),
            speed_mph: Some(500.0 / 100.0 * MPH_PER_MPS),
        };
        assert_eq!(seg.stop_seq_pair(), "3__4");
    }
}
