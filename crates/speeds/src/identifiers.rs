//! Type-safe identifiers for GTFS entities.
//!
//! All identifiers use Arc<str> for cheap cloning and minimal memory overhead.
//! Trip identity is deliberately composite: a bare `trip_id` is only unique
//! within one operator's feed on one service date, so the engine keys
//! everything on [`TripInstanceKey`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::NaiveDate;

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }
    };
}

impl_identifier!(OperatorKey);
impl_identifier!(TripId);
impl_identifier!(ShapeId);
impl_identifier!(StopId);

/// Composite key for one realized trip: operator, service date, trip id.
///
/// `trip_id` alone collides across operators (and across dates for frequency
/// feeds), so this is the only trip key the engine accepts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TripInstanceKey {
    pub operator: OperatorKey,
    pub service_date: NaiveDate,
    pub trip_id: TripId,
}

impl TripInstanceKey {
    pub fn new(
        operator: impl Into<OperatorKey>,
        service_date: NaiveDate,
        trip_id: impl Into<TripId>,
    ) -> Self {
        Self {
            operator: operator.into(),
            service_date,
            trip_id: trip_id.into(),
        }
    }
}

impl fmt::Display for TripInstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.operator, self.service_date, self.trip_id)
    }
}
