//! Common types used throughout the fieldtrack engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate pair in signed floating-point degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// A device location sample with its capture time (client clock)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub point: GeoPoint,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    /// Create a new fix
    pub fn new(point: GeoPoint, timestamp: DateTime<Utc>) -> Self {
        Self { point, timestamp }
    }
}

/// Identifier of a work session, assigned by the remote authority on start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A work session as reported by the remote authority
///
/// `end_time` of `None` means the session is still open; the authority's
/// epoch-zero sentinel is mapped away at the wire layer and never leaks
/// into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: SessionId,
    /// Worker that owns the session
    pub worker: String,
    /// Free text supplied at start, immutable afterward
    pub description: String,
    /// Set by the authority at start
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Computed by the authority once the session is closed
    pub duration_hours: Option<f64>,
}

impl WorkSession {
    /// Whether the session is still open
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Closed-session duration in minutes, if the authority reported one
    pub fn duration_minutes(&self) -> Option<f64> {
        self.duration_hours.map(|hours| hours * 60.0)
    }
}

/// The worker's current-day view as reported by the authority:
/// the resolved account name and today's session, if any exists
#[derive(Debug, Clone, PartialEq)]
pub struct TodayWork {
    pub username: String,
    pub session: Option<WorkSession>,
}
