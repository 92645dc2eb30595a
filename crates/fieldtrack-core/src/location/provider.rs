//! Device boundary for acquiring location fixes

use crate::error::TrackResult;
use crate::types::LocationFix;
use async_trait::async_trait;
use std::time::Duration;

/// Parameters of a single acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixRequest {
    /// Ask the device for its most precise positioning mode
    pub high_accuracy: bool,
    /// Give up on the attempt after this long
    pub timeout: Duration,
    /// A cached fix no older than this is acceptable
    pub max_age: Duration,
}

impl Default for FixRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(15),
            max_age: Duration::from_secs(10),
        }
    }
}

/// Platform capability that resolves the device's current position.
///
/// Implementations map a missing fix or revoked permission to
/// [`TrackError::Acquisition`](crate::error::TrackError::Acquisition);
/// the sampler treats that as transient and retries on its next tick.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Resolve the current position, honoring the request's accuracy,
    /// timeout, and cache-tolerance settings
    async fn acquire(&self, request: &FixRequest) -> TrackResult<LocationFix>;
}
