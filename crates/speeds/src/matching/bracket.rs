//! Bracketing selector: the nearest vehicle position strictly before and
//! strictly after a stop, measured along the trip's shape.

use crate::models::types::MISSING_VP_IDX;

/// A candidate vehicle position as seen by the selector: its global ordinal
/// and its projection onto the trip's shape.
#[derive(Clone, Copy, Debug)]
pub struct BracketCandidate {
    pub vp_idx: i64,
    pub vp_meters: f64,
}

/// The bracket around one stop. A missing side carries the sentinel pair
/// (`vp_idx = MISSING_VP_IDX`, `meters = 0.0`) rather than an error: the
/// condition is data, filterable downstream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VpBracket {
    pub before_idx: i64,
    pub after_idx: i64,
    pub before_meters: f64,
    pub after_meters: f64,
}

impl VpBracket {
    pub fn has_before(&self) -> bool {
        self.before_idx != MISSING_VP_IDX
    }

    pub fn has_after(&self) -> bool {
        self.after_idx != MISSING_VP_IDX
    }

    pub fn is_complete(&self) -> bool {
        self.has_before() && self.has_after()
    }
}

/// Partition the nearest candidates by `vp_meters - stop_meters` and pick
/// the closest position on each side of the stop.
///
/// "Before" is the candidate with the largest projection still short of the
/// stop; "after" is the smallest projection past it. A candidate projecting
/// exactly onto the stop joins neither side.
pub fn bracket_stop(candidates: &[BracketCandidate], stop_meters: f64) -> VpBracket {
    let mut before: Option<BracketCandidate> = None;
    let mut after: Option<BracketCandidate> = None;

    for &c in candidates {
        let delta = c.vp_meters - stop_meters;
        if delta < 0.0 {
            if before.map_or(true, |b| c.vp_meters > b.vp_meters) {
                before = Some(c);
            }
        } else if delta > 0.0 && after.map_or(true, |a| c.vp_meters < a.vp_meters) {
            after = Some(c);
        }
    }

    VpBracket {
        before_idx: before.map_or(MISSING_VP_IDX, |c| c.vp_idx),
        after_idx: after.map_or(MISSING_VP_IDX, |c| c.vp_idx),
        before_meters: before.map_or(0.0, |c| c.vp_meters),
        after_meters: after.map_or(0.0, |c| c.vp_meters),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(vp_idx: i64, vp_meters: f64) -> BracketCandidate {
        BracketCandidate { vp_idx, vp_meters }
    }

    #[test]
    fn test_empty_before_side_yields_sentinel() {
        let got = bracket_stop(&[c(7, 120.0)], 100.0);
        assert_eq!(got.before_idx, MISSING_VP_IDX);
        assert_eq!(got.after_idx, 7);
        assert_eq!(got.before_meters, 0.0);
        assert_eq!(got.after_meters, 120.0);
        assert!(!got.has_before());
        assert!(got.has_after());
    }

    #[test]
    fn test_picks_closest_on_each_side() {
        let candidates = [c(1, 40.0), c(2, 85.0), c(3, 110.0), c(4, 300.0)];
        let got = bracket_stop(&candidates, 100.0);
        assert_eq!(got.before_idx, 2);
        assert_eq!(got.before_meters, 85.0);
        assert_eq!(got.after_idx, 3);
        assert_eq!(got.after_meters, 110.0);
        assert!(got.is_complete());
    }

    #[test]
    fn test_exact_tie_joins_neither_side() {
        let got = bracket_stop(&[c(5, 100.0)], 100.0);
        assert_eq!(got.before_idx, MISSING_VP_IDX);
        assert_eq!(got.after_idx, MISSING_VP_IDX);
    }

    #[test]
    fn test_no_candidates() {
        let got = bracket_stop(&[], 100.0);
        assert!(!got.has_before());
        assert!(!got.has_after());
        assert_eq!(got.before_meters, 0.0);
        assert_eq!(got.after_meters, 0.0);
    }
}
