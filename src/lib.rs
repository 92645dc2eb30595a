//! Fieldtrack
//!
//! Facade over the fieldtrack engine for programmatic use. The actual
//! implementation lives in `fieldtrack-core`; this crate re-exports the
//! public API so downstream code depends on one name.

// Re-export commonly used types from core
pub use fieldtrack_core::{
    background::{ExecutionHandle, ExecutionPlatform, TrackingNotice},
    config::{RemoteConfig, TrackerConfig},
    error::{TrackError, TrackResult},
    geo::{haversine_meters, MovementFilter, MOVEMENT_THRESHOLD_METERS},
    history::PlaybackEngine,
    location::{FixRequest, LocationProvider, LocationSampler, SamplerEvent},
    session::{SessionState, SessionTracker, TrackerEvent},
    sync::{SyncClient, WorkAuthority},
    types::{GeoPoint, LocationFix, SessionId, TodayWork, WorkSession},
};
