//! Segment-level bus speeds from GTFS schedules and realtime vehicle positions.
//!
//! The engine takes four flat relations (trips, shape paths, stop times with
//! stop positions, and vehicle-position pings, all in planar meters), matches
//! each stop of each trip against the pings that bracket it along the trip's
//! path, interpolates an arrival time at every stop, repairs non-monotonic
//! arrival curves, and differences consecutive stops into per-segment speeds
//! in miles per hour.
//!
//! Trips are independent work units, so batches fan out across a rayon pool.
//!
//! # Example
//!
//! One eastbound trip on a straight 2 km path, two stops, four pings:
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use geo::{LineString, Point};
//! use segment_speeds::prelude::*;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 10, 16).unwrap();
//! let key = TripInstanceKey::new("big-blue-bus", date, "trip-7");
//! let t0 = date.and_hms_opt(8, 0, 0).unwrap();
//!
//! let trips = vec![TripRow {
//!     trip_key: key.clone(),
//!     shape_id: ShapeId::new("shape-1"),
//! }];
//! let shapes = vec![ShapeRow {
//!     shape_id: ShapeId::new("shape-1"),
//!     geometry: LineString::from(vec![(0.0, 0.0), (2000.0, 0.0)]),
//! }];
//! let stop_times = vec![
//!     StopTimeRow {
//!         trip_key: key.clone(),
//!         stop_id: StopId::new("s1"),
//!         stop_sequence: 1,
//!         position: Point::new(500.0, 0.0),
//!         scheduled_arrival_sec: None,
//!     },
//!     StopTimeRow {
//!         trip_key: key.clone(),
//!         stop_id: StopId::new("s2"),
//!         stop_sequence: 2,
//!         position: Point::new(1200.0, 0.0),
//!         scheduled_arrival_sec: None,
//!     },
//! ];
//! let ping = |secs: i64, x: f64| VpRow {
//!     trip_key: key.clone(),
//!     location_timestamp: t0 + Duration::seconds(secs),
//!     position: Point::new(x, 0.0),
//! };
//! let vps = vec![
//!     ping(90, 450.0),
//!     ping(110, 550.0),
//!     ping(230, 1150.0),
//!     ping(250, 1250.0),
//! ];
//!
//! let batch = assemble_trips(trips, shapes, stop_times, vps);
//! let results = compute_batch(&batch, &MatchConfig::default());
//!
//! // 700 m in 140 s is 5 m/s, or 11.185 mph.
//! let segment = &results[0].segments[0];
//! assert_eq!(segment.stop_seq_pair(), "1__2");
//! assert!((segment.speed_mph.unwrap() - 11.185).abs() < 1e-9);
//! ```

pub mod identifiers;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod spatial;

/// Everything a typical caller needs.
pub mod prelude {
    pub use crate::identifiers::{OperatorKey, ShapeId, StopId, TripId, TripInstanceKey};
    pub use crate::models::{
        CardinalDirection, Segment, ShapePath, SpeedError, StopVisit, MPH_PER_MPS,
    };
    pub use crate::pipeline::{compute_batch, compute_trip, MatchConfig, TripSpeeds};
    pub use crate::provider::{assemble_trips, ShapeRow, StopTimeRow, TripData, TripRow, VpRow};
}
