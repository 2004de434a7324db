//! Stop-to-vehicle-position matching and arrival-time inference.

pub mod bracket;
pub mod interpolate;
pub mod monotonic;
pub mod speed;

pub use bracket::{bracket_stop, BracketCandidate, VpBracket};
pub use interpolate::{estimate_between, fill_missing_arrivals, interpolate_at};
pub use monotonic::{repair_arrival_times, TripMonotonicity};
pub use speed::{calculate_speed_mph, derive_segments};
