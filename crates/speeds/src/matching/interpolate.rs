//! Arrival-time interpolation.
//!
//! Two layers share one clamped 1-D linear interpolation primitive:
//! a local two-point estimate between a stop's bracketing vehicle
//! positions, and a global per-trip fill that interpolates stops with
//! missing arrivals against the trip's full curve of valid stops. The
//! global fill is deliberately not limited to the immediate bracket; using
//! the whole trip as the reference curve is more robust to local GPS noise.

use chrono::{DateTime, NaiveDateTime};

use crate::models::types::StopVisit;

/// Linear interpolation of `ys` as a function of `xs` at `x`, clamping to
/// the endpoint values outside the known range.
///
/// `xs` must be sorted ascending and the slices non-empty and equal length.
pub fn interpolate_at(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert!(!xs.is_empty());

    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }

    // First index with xs[hi] >= x; in 1..=last because of the clamps above.
    let hi = xs.partition_point(|&v| v < x);
    let lo = hi - 1;
    let span = xs[hi] - xs[lo];
    if span == 0.0 {
        return ys[lo];
    }
    ys[lo] + (ys[hi] - ys[lo]) * (x - xs[lo]) / span
}

pub fn to_epoch_seconds(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64
}

pub fn from_epoch_seconds(secs: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs.round() as i64, 0).map(|dt| dt.naive_utc())
}

/// Two-point arrival estimate for a stop with a complete bracket:
/// interpolate time as a function of distance along the shape between the
/// before and after vehicle positions.
pub fn estimate_between(
    stop_meters: f64,
    before: (f64, NaiveDateTime),
    after: (f64, NaiveDateTime),
) -> Option<NaiveDateTime> {
    let xs = [before.0, after.0];
    let ys = [to_epoch_seconds(before.1), to_epoch_seconds(after.1)];
    from_epoch_seconds(interpolate_at(stop_meters, &xs, &ys))
}

/// Global per-trip fill: interpolate every stop with a missing arrival
/// against the sorted (stop_meters, arrival) curve of the trip's stops
/// that do have one.
///
/// A trip with zero valid stops is left untouched: interpolation is
/// undefined there and every arrival stays missing. Fully-populated trips
/// are returned unchanged, making the fill idempotent.
pub fn fill_missing_arrivals(stops: &mut [StopVisit]) {
    let mut curve: Vec<(f64, f64)> = stops
        .iter()
        .filter_map(|s| {
            s.arrival_time
                .map(|t| (s.stop_meters, to_epoch_seconds(t)))
        })
        .collect();
    if curve.is_empty() {
        return;
    }
    // stop_meters should already rise with stop_sequence, but violations
    // are detected elsewhere, not assumed impossible.
    curve.sort_by(|a, b| a.0.total_cmp(&b.0));

    let xs: Vec<f64> = curve.iter().map(|&(x, _)| x).collect();
    let ys: Vec<f64> = curve.iter().map(|&(_, y)| y).collect();

    for stop in stops.iter_mut().filter(|s| s.arrival_time.is_none()) {
        stop.arrival_time = from_epoch_seconds(interpolate_at(stop.stop_meters, &xs, &ys));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::StopId;
    use crate::models::types::{CardinalDirection, MISSING_VP_IDX};
    use approx::assert_relative_eq;
    use geo::Point;

    fn t(secs: i64) -> NaiveDateTime {
        DateTime::from_timestamp(1_729_000_000 + secs, 0)
            .unwrap()
            .naive_utc()
    }

    fn visit(seq: u32, stop_meters: f64, arrival_sec: Option<i64>) -> StopVisit {
        StopVisit {
            stop_id: StopId::new(format!("s{seq}")),
            stop_sequence: seq,
            position: Point::new(0.0, 0.0),
            scheduled_arrival_sec: None,
            stop_meters,
            primary_direction: CardinalDirection::Unknown,
            arrival_time: arrival_sec.map(t),
            before_vp_idx: MISSING_VP_IDX,
            after_vp_idx: MISSING_VP_IDX,
        }
    }

    #[test]
    fn test_interior_interpolation() {
        let xs = [0.0, 100.0, 300.0];
        let ys = [10.0, 20.0, 60.0];
        assert_relative_eq!(interpolate_at(50.0, &xs, &ys), 15.0);
        assert_relative_eq!(interpolate_at(200.0, &xs, &ys), 40.0);
    }

    #[test]
    fn test_clamps_outside_range() {
        let xs = [100.0, 200.0];
        let ys = [5.0, 9.0];
        assert_relative_eq!(interpolate_at(-50.0, &xs, &ys), 5.0);
        assert_relative_eq!(interpolate_at(1000.0, &xs, &ys), 9.0);
    }

    #[test]
    fn test_duplicate_positions_do_not_divide_by_zero() {
        let xs = [100.0, 100.0, 200.0];
        let ys = [5.0, 7.0, 9.0];
        let got = interpolate_at(100.0, &xs, &ys);
        assert!(got.is_finite());
    }

    #[test]
    fn test_estimate_between_brackets() {
        let got = estimate_between(500.0, (450.0, t(90)), (550.0, t(110))).unwrap();
        assert_eq!(got, t(100));
    }

    #[test]
    fn test_fill_uses_trip_curve_and_clamps() {
        let mut stops = vec![
            visit(1, 0.0, None),
            visit(2, 500.0, Some(100)),
            visit(3, 1000.0, None),
            visit(4, 1200.0, Some(240)),
        ];
        fill_missing_arrivals(&mut stops);

        // Before the first valid stop, clamp to its value.
        assert_eq!(stops[0].arrival_time, Some(t(100)));
        // Interior stop interpolates on the (500, 1200) span.
        assert_eq!(stops[2].arrival_time, Some(t(200)));
        assert_eq!(stops[3].arrival_time, Some(t(240)));
    }

    #[test]
    fn test_fill_is_idempotent_on_populated_trips() {
        let mut stops = vec![
            visit(1, 0.0, Some(0)),
            visit(2, 500.0, Some(100)),
            visit(3, 1200.0, Some(260)),
        ];
        let before: Vec<_> = stops.iter().map(|s| s.arrival_time).collect();
        fill_missing_arrivals(&mut stops);
        let after: Vec<_> = stops.iter().map(|s| s.arrival_time).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_fill_with_no_valid_stops_is_a_no_op() {
        let mut stops = vec![visit(1, 0.0, None), visit(2, 500.0, None)];
        fill_missing_arrivals(&mut stops);
        assert!(stops.iter().all(|s| s.arrival_time.is_none()));
    }
}
