//! Segment speed derivation from consecutive stop visits.

use itertools::Itertools;

use crate::identifiers::TripInstanceKey;
use crate::matching::interpolate::to_epoch_seconds;
use crate::models::types::{Segment, StopVisit, MPH_PER_MPS};

pub fn calculate_speed_mph(meters_elapsed: f64, sec_elapsed: f64) -> f64 {
    meters_elapsed / sec_elapsed * MPH_PER_MPS
}

/// Difference consecutive stops (sorted by `stop_sequence`) into segments.
///
/// Deliberately no guard against zero or negative elapsed values: infinite
/// and negative speeds are valid, representable outputs, filtered by the
/// consumer rather than here. A missing arrival on either endpoint makes
/// `sec_elapsed` and `speed_mph` `None` for that segment.
pub fn derive_segments(trip_key: &TripInstanceKey, stops: &[StopVisit]) -> Vec<Segment> {
    debug_assert!(stops.windows(2).all(|w| w[0].stop_sequence < w[1].stop_sequence));

    stops
        .iter()
        .tuple_windows()
        .map(|(cur, next)| {
            let meters_elapsed = next.stop_meters - cur.stop_meters;
            let sec_elapsed = match (cur.arrival_time, next.arrival_time) {
                (Some(a), Some(b)) => Some(to_epoch_seconds(b) - to_epoch_seconds(a)),
                _ => None,
            };
            Segment {
                trip_key: trip_key.clone(),
                stop_sequence: cur.stop_sequence,
                subseq_stop_sequence: next.stop_sequence,
                stop_id: cur.stop_id.clone(),
                subseq_stop_id: next.stop_id.clone(),
                meters_elapsed,
                sec_elapsed,
                speed_mph: sec_elapsed.map(|s| calculate_speed_mph(meters_elapsed, s)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::StopId;
    use crate::models::types::{CardinalDirection, MISSING_VP_IDX};
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};
    use geo::Point;

    fn key() -> TripInstanceKey {
        TripInstanceKey::new(
            "op",
            NaiveDate::from_ymd_opt(2024, 10, 16).unwrap(),
            "t1",
        )
    }

    fn t(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 16)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + chrono::Duration::seconds(secs as i64)
    }

    fn visit(seq: u32, stop_meters: f64, arrival: Option<u32>) -> StopVisit {
        StopVisit {
            stop_id: StopId::new(format!("s{seq}")),
            stop_sequence: seq,
            position: Point::new(0.0, 0.0),
            scheduled_arrival_sec: None,
            stop_meters,
            primary_direction: CardinalDirection::Unknown,
            arrival_time: arrival.map(t),
            before_vp_idx: MISSING_VP_IDX,
            after_vp_idx: MISSING_VP_IDX,
        }
    }

    #[test]
    fn test_speed_constant() {
        assert_relative_eq!(calculate_speed_mph(500.0, 100.0), 11.185, epsilon = 1e-9);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // Three stops at [0, 500, 1200] meters arriving at [0, 100, 260] s.
        let stops = vec![
            visit(1, 0.0, Some(0)),
            visit(2, 500.0, Some(100)),
            visit(3, 1200.0, Some(260)),
        ];
        let segments = derive_segments(&key(), &stops);

        assert_eq!(segments.len(), 2);
        assert_relative_eq!(segments[0].meters_elapsed, 500.0);
        assert_relative_eq!(segments[0].sec_elapsed.unwrap(), 100.0);
        assert_relative_eq!(
            segments[0].speed_mph.unwrap(),
            500.0 / 100.0 * MPH_PER_MPS,
            epsilon = 1e-9
        );
        assert_relative_eq!(segments[1].meters_elapsed, 700.0);
        assert_relative_eq!(segments[1].sec_elapsed.unwrap(), 160.0);
        assert_relative_eq!(
            segments[1].speed_mph.unwrap(),
            700.0 / 160.0 * MPH_PER_MPS,
            epsilon = 1e-9
        );
        assert_eq!(segments[0].stop_seq_pair(), "1__2");
    }

    #[test]
    fn test_zero_elapsed_seconds_is_infinite_not_fatal() {
        let stops = vec![visit(1, 0.0, Some(50)), visit(2, 400.0, Some(50))];
        let segments = derive_segments(&key(), &stops);
        assert!(segments[0].speed_mph.unwrap().is_infinite());
    }

    #[test]
    fn test_time_going_backwards_yields_negative_speed() {
        let stops = vec![visit(1, 0.0, Some(100)), visit(2, 400.0, Some(40))];
        let segments = derive_segments(&key(), &stops);
        assert!(segments[0].speed_mph.unwrap() < 0.0);
        assert_relative_eq!(segments[0].sec_elapsed.unwrap(), -60.0);
    }

    #[test]
    fn test_missing_arrival_leaves_speed_undefined() {
        let stops = vec![
            visit(1, 0.0, Some(0)),
            visit(2, 500.0, None),
            visit(3, 1200.0, Some(260)),
        ];
        let segments = derive_segments(&key(), &stops);
        assert!(segments[0].sec_elapsed.is_none());
        assert!(segments[0].speed_mph.is_none());
        assert!(segments[1].speed_mph.is_none());
        // Distances are still well-defined.
        assert_relative_eq!(segments[0].meters_elapsed, 500.0);
    }
}
