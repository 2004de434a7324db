//! The per-trip matching pipeline and the batch driver.
//!
//! Everything here is scoped to one trip: raw pings are classified by
//! direction, each stop gets its nearest wrong-way-filtered candidates,
//! a bracket, and an interpolated arrival, then the trip's arrival curve
//! is repaired and differenced into segment speeds. Trips share nothing
//! mutable, so the batch fans out with one stateless worker per trip.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::debug;

use crate::identifiers::TripInstanceKey;
use crate::matching::{
    bracket_stop, derive_segments, estimate_between, fill_missing_arrivals, repair_arrival_times,
    BracketCandidate, TripMonotonicity,
};
use crate::models::types::{
    CardinalDirection, Segment, StopVisit, VpObservation, MISSING_VP_IDX,
};
use crate::provider::batch::{TripData, VpPing};
use crate::spatial::{NearestPositionIndex, DEFAULT_K_NEIGHBORS};

/// Tuning knobs for the matching pipeline.
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    /// Nearest vehicle positions considered per stop.
    pub k_neighbors: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
        }
    }
}

/// One trip's full output: annotated stop visits and derived segments.
#[derive(Clone, Debug)]
pub struct TripSpeeds {
    pub key: TripInstanceKey,
    pub stops: Vec<StopVisit>,
    pub segments: Vec<Segment>,
    pub monotonicity: TripMonotonicity,
}

/// Direction of travel at each ping, classified from the displacement to
/// the previous ping of the same trip. The first ping has no predecessor
/// and stays `Unknown`.
fn annotate_vp_directions(pings: &[VpPing]) -> Vec<VpObservation> {
    let mut out = Vec::with_capacity(pings.len());
    for (i, ping) in pings.iter().enumerate() {
        let primary_direction = if i == 0 {
            CardinalDirection::Unknown
        } else {
            let prev = &pings[i - 1];
            CardinalDirection::from_displacement(
                ping.position.x() - prev.position.x(),
                ping.position.y() - prev.position.y(),
            )
        };
        out.push(VpObservation {
            vp_idx: ping.vp_idx,
            location_timestamp: ping.location_timestamp,
            position: ping.position,
            primary_direction,
        });
    }
    out
}

fn init_stop_visits(trip: &TripData) -> Vec<StopVisit> {
    let mut out: Vec<StopVisit> = Vec::with_capacity(trip.stops.len());
    for (i, row) in trip.stops.iter().enumerate() {
        let primary_direction = if i == 0 {
            CardinalDirection::Unknown
        } else {
            let prev = &trip.stops[i - 1];
            CardinalDirection::from_displacement(
                row.position.x() - prev.position.x(),
                row.position.y() - prev.position.y(),
            )
        };
        out.push(StopVisit {
            stop_id: row.stop_id.clone(),
            stop_sequence: row.stop_sequence,
            position: row.position,
            scheduled_arrival_sec: row.scheduled_arrival_sec,
            stop_meters: trip.path.project(row.position),
            primary_direction,
            arrival_time: None,
            before_vp_idx: MISSING_VP_IDX,
            after_vp_idx: MISSING_VP_IDX,
        });
    }
    out
}

/// Per-trip spatial indexes, one per excluded direction, built lazily.
///
/// Stops heading the same way share the same filtered candidate set, so at
/// most five indexes exist per trip and all of them drop with the worker.
struct DirectionalIndexes<'a> {
    vps: &'a [VpObservation],
    cache: HashMap<Option<CardinalDirection>, (Vec<usize>, NearestPositionIndex)>,
}

impl<'a> DirectionalIndexes<'a> {
    fn new(vps: &'a [VpObservation]) -> Self {
        Self {
            vps,
            cache: HashMap::new(),
        }
    }

    fn get(
        &mut self,
        excluded: Option<CardinalDirection>,
    ) -> &(Vec<usize>, NearestPositionIndex) {
        let vps = self.vps;
        self.cache.entry(excluded).or_insert_with(|| {
            let slots: Vec<usize> = vps
                .iter()
                .enumerate()
                .filter(|(_, vp)| excluded.map_or(true, |d| vp.primary_direction != d))
                .map(|(i, _)| i)
                .collect();
            let points: Vec<_> = slots.iter().map(|&i| vps[i].position).collect();
            let index = NearestPositionIndex::new(&points);
            (slots, index)
        })
    }
}

/// Run the whole matching pipeline for one trip.
///
/// Control flow per the stop-matching design: candidate search with
/// wrong-way exclusion, bracket selection, arrival interpolation, a global
/// fill for stops without a complete bracket, monotonicity repair, and
/// finally segment speed derivation.
pub fn compute_trip(trip: &TripData, config: &MatchConfig) -> TripSpeeds {
    let vps = annotate_vp_directions(&trip.vps);
    let mut stops = init_stop_visits(trip);
    let mut indexes = DirectionalIndexes::new(&vps);

    for stop in &mut stops {
        // A vehicle heading the opposite way must not bracket this stop.
        let excluded = stop.primary_direction.opposite();
        let (slots, index) = indexes.get(excluded);
        let nearest = index.k_nearest(stop.position, config.k_neighbors);

        let candidates: Vec<(BracketCandidate, NaiveDateTime)> = nearest
            .iter()
            .map(|&slot| {
                let vp = &vps[slots[slot]];
                (
                    BracketCandidate {
                        vp_idx: vp.vp_idx,
                        vp_meters: trip.path.project(vp.position),
                    },
                    vp.location_timestamp,
                )
            })
            .collect();

        let projected: Vec<BracketCandidate> = candidates.iter().map(|&(c, _)| c).collect();
        let bracket = bracket_stop(&projected, stop.stop_meters);
        stop.before_vp_idx = bracket.before_idx;
        stop.after_vp_idx = bracket.after_idx;

        if bracket.is_complete() {
            let timestamp_of = |vp_idx: i64| {
                candidates
                    .iter()
                    .find(|(c, _)| c.vp_idx == vp_idx)
                    .map(|&(_, t)| t)
            };
            if let (Some(t_before), Some(t_after)) = (
                timestamp_of(bracket.before_idx),
                timestamp_of(bracket.after_idx),
            ) {
                stop.arrival_time = estimate_between(
                    stop.stop_meters,
                    (bracket.before_meters, t_before),
                    (bracket.after_meters, t_after),
                );
            }
        }
    }

    // Stops left without an estimate borrow the trip's own arrival curve.
    fill_missing_arrivals(&mut stops);
    let monotonicity = repair_arrival_times(&mut stops);
    let segments = derive_segments(&trip.key, &stops);

    debug!(
        "trip {}: {} stops, {} segments, {:?}",
        trip.key,
        stops.len(),
        segments.len(),
        monotonicity
    );

    TripSpeeds {
        key: trip.key.clone(),
        stops,
        segments,
        monotonicity,
    }
}

/// Fan the batch out across trips. Workers are stateless and every trip's
/// inputs are immutable, so this is a plain data-parallel map.
pub fn compute_batch(trips: &[TripData], config: &MatchConfig) -> Vec<TripSpeeds> {
    trips
        .par_iter()
        .map(|trip| compute_trip(trip, config))
        .collect()
}
