//! Fieldtrack Core Library
//!
//! This crate provides the core functionality of the fieldtrack system:
//! the work-session lifecycle, movement-filtered location sampling that
//! stays alive in the background, synchronization with the remote work
//! authority, and playback of recorded paths.

pub mod background;
pub mod config;
pub mod error;
pub mod geo;
pub mod history;
pub mod location;
pub mod session;
pub mod sync;
pub mod types;

// Re-export commonly used types
pub use background::{ExecutionHandle, ExecutionPlatform, TrackingNotice};
pub use config::{RemoteConfig, TrackerConfig};
pub use error::{TrackError, TrackResult};
pub use geo::{haversine_meters, MovementFilter, MOVEMENT_THRESHOLD_METERS};
pub use history::PlaybackEngine;
pub use location::{FixRequest, LocationProvider, LocationSampler, SamplerEvent};
pub use session::{SessionState, SessionTracker, TrackerEvent};
pub use sync::{SyncClient, WorkAuthority};
pub use types::{GeoPoint, LocationFix, SessionId, TodayWork, WorkSession};
