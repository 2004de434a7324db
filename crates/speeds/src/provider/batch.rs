//! Batch assembly: typed input relations joined into per-trip work units.
//!
//! This is the engine's face toward the data-access layer. Callers hand in
//! four flat relations (trips, shapes, stop times, vehicle positions) in
//! whatever order they come; assembly joins them on the composite trip key,
//! establishes the per-trip orderings the core requires, and assigns the
//! global `vp_idx` ordinal. Trips with unusable inputs are skipped with a
//! warning — a bad trip never aborts the batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use geo::{LineString, Point};
use tracing::{debug, warn};

use crate::identifiers::{ShapeId, StopId, TripInstanceKey};
use crate::models::shape::ShapePath;

// ============================================================================
// Input Relations
// ============================================================================

/// Trip-to-path linkage.
#[derive(Clone, Debug)]
pub struct TripRow {
    pub trip_key: TripInstanceKey,
    pub shape_id: ShapeId,
}

/// One path per shape. Coordinates are planar meters.
#[derive(Clone, Debug)]
pub struct ShapeRow {
    pub shape_id: ShapeId,
    pub geometry: LineString,
}

/// One scheduled stop of a trip, with its stop's position attached.
#[derive(Clone, Debug)]
pub struct StopTimeRow {
    pub trip_key: TripInstanceKey,
    pub stop_id: StopId,
    pub stop_sequence: u32,
    pub position: Point,
    pub scheduled_arrival_sec: Option<u32>,
}

/// One raw vehicle-position ping. Need not be pre-sorted.
#[derive(Clone, Debug)]
pub struct VpRow {
    pub trip_key: TripInstanceKey,
    pub location_timestamp: NaiveDateTime,
    pub position: Point,
}

// ============================================================================
// Assembled Work Units
// ============================================================================

/// A vehicle-position ping after assembly: ordered by timestamp within its
/// trip and carrying its batch-global ordinal.
#[derive(Clone, Debug)]
pub struct VpPing {
    pub vp_idx: i64,
    pub location_timestamp: NaiveDateTime,
    pub position: Point,
}

/// Everything the per-trip worker needs, immutable for the whole run.
#[derive(Clone, Debug)]
pub struct TripData {
    pub key: TripInstanceKey,
    pub path: Arc<ShapePath>,
    /// Sorted by `stop_sequence`.
    pub stops: Vec<StopTimeRow>,
    /// Sorted by `location_timestamp`; `vp_idx` increases within the trip.
    pub vps: Vec<VpPing>,
}

/// Join the four input relations into per-trip work units.
///
/// Establishes the core's preconditions: stops sorted by sequence, vps
/// sorted ascending by timestamp, `vp_idx` unique across the batch and
/// increasing within each trip, and every path validated (degenerate or
/// missing shapes drop their trips). Trip order follows the input `trips`
/// relation, which keeps `vp_idx` assignment deterministic.
pub fn assemble_trips(
    trips: Vec<TripRow>,
    shapes: Vec<ShapeRow>,
    stop_times: Vec<StopTimeRow>,
    vps: Vec<VpRow>,
) -> Vec<TripData> {
    let mut paths: HashMap<ShapeId, Arc<ShapePath>> = HashMap::with_capacity(shapes.len());
    for shape in shapes {
        match ShapePath::new(&shape.shape_id, shape.geometry) {
            Ok(path) => {
                paths.insert(shape.shape_id, Arc::new(path));
            }
            Err(err) => warn!("dropping shape: {err}"),
        }
    }

    let mut stops_by_trip: HashMap<TripInstanceKey, Vec<StopTimeRow>> = HashMap::new();
    for row in stop_times {
        stops_by_trip.entry(row.trip_key.clone()).or_default().push(row);
    }

    let mut vps_by_trip: HashMap<TripInstanceKey, Vec<VpRow>> = HashMap::new();
    for row in vps {
        vps_by_trip.entry(row.trip_key.clone()).or_default().push(row);
    }

    let mut seen: HashSet<TripInstanceKey> = HashSet::with_capacity(trips.len());
    let mut next_vp_idx: i64 = 0;
    let mut out = Vec::with_capacity(trips.len());

    for trip in trips {
        if !seen.insert(trip.trip_key.clone()) {
            debug!("duplicate trip row for {}", trip.trip_key);
            continue;
        }

        let Some(path) = paths.get(&trip.shape_id) else {
            warn!(
                "skipping trip {}: missing or invalid shape {}",
                trip.trip_key, trip.shape_id
            );
            continue;
        };

        let mut stops = stops_by_trip.remove(&trip.trip_key).unwrap_or_default();
        let raw_vps = vps_by_trip.remove(&trip.trip_key).unwrap_or_default();
        if stops.is_empty() || raw_vps.is_empty() {
            debug!(
                "skipping trip {}: {} stops, {} vps",
                trip.trip_key,
                stops.len(),
                raw_vps.len()
            );
            continue;
        }

        stops.sort_by_key(|s| s.stop_sequence);

        let mut sorted_vps = raw_vps;
        sorted_vps.sort_by_key(|v| v.location_timestamp);
        let vps = sorted_vps
            .into_iter()
            .map(|v| {
                let ping = VpPing {
                    vp_idx: next_vp_idx,
                    location_timestamp: v.location_timestamp,
                    position: v.position,
                };
                next_vp_idx += 1;
                ping
            })
            .collect();

        out.push(TripData {
            key: trip.trip_key,
            path: Arc::clone(path),
            stops,
            vps,
        });
    }

    out
}
