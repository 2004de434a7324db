//! Monotonicity repair for interpolated arrival times.
//!
//! Interpolated arrivals inherit GPS noise, so a trip's arrival times do
//! not always increase with stop order. Violating stops get their arrival
//! nulled and recomputed from the trip's surviving stops in one pass; a
//! repaired value is not re-checked.

use chrono::Timelike;

use crate::matching::interpolate::fill_missing_arrivals;
use crate::models::types::StopVisit;

/// Per-trip monotonicity state after the check or repair pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TripMonotonicity {
    /// Arrival times strictly increase with stop order.
    Clean,
    /// At least one stop failed the strict-increase test.
    Violating,
}

/// Mark each stop's arrival as monotonic or not.
///
/// Arrival times are compared as seconds of day. A stop is flagged when it
/// fails strict increase against the last unflagged stop before it; the
/// first stop with a known arrival is never flagged. Stops with no arrival
/// at all are ignored by the check.
fn flag_non_monotonic(stops: &[StopVisit]) -> Vec<bool> {
    let mut flags = vec![false; stops.len()];
    let mut prev_sec: Option<u32> = None;

    for (i, stop) in stops.iter().enumerate() {
        let Some(arrival) = stop.arrival_time else {
            continue;
        };
        let sec_of_day = arrival.time().num_seconds_from_midnight();
        if let Some(prev) = prev_sec {
            if sec_of_day <= prev {
                flags[i] = true;
                // The violator does not become the baseline for the next
                // window; its successor is judged against the last good stop.
                continue;
            }
        }
        prev_sec = Some(sec_of_day);
    }

    flags
}

/// One-pass monotonicity repair over a trip's stops (sorted by
/// `stop_sequence`).
///
/// `Clean` trips pass through unmodified. For `Violating` trips, every
/// flagged stop's arrival is nulled and recomputed by the global per-trip
/// interpolation against the surviving stops. No fixed-point iteration:
/// residual violations after one pass are left as-is.
pub fn repair_arrival_times(stops: &mut [StopVisit]) -> TripMonotonicity {
    let flags = flag_non_monotonic(stops);
    if !flags.iter().any(|&f| f) {
        return TripMonotonicity::Clean;
    }

    for (stop, flagged) in stops.iter_mut().zip(&flags) {
        if *flagged {
            stop.arrival_time = None;
        }
    }
    fill_missing_arrivals(stops);

    TripMonotonicity::Violating
}
