//! Background execution capability
//!
//! Keeping the sampler alive while the app is not user-visible is a
//! resource the host platform grants or denies. It is modeled as a scoped
//! acquire/release handle: nothing is held unless acquisition fully
//! succeeded, and release is idempotent.

use crate::error::TrackResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Text shown by the platform's persistent tracking indicator while the
/// execution handle is held
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingNotice {
    pub title: String,
    pub body: String,
}

impl Default for TrackingNotice {
    fn default() -> Self {
        Self {
            title: "Fieldtrack".to_string(),
            body: "Tracking your location while working".to_string(),
        }
    }
}

/// Host capability granting non-suspendable execution.
///
/// `begin` starts the platform's persistent user-visible indicator that
/// tracking is active, a required side effect of holding the handle
/// rather than a logging concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionPlatform: Send + Sync {
    /// Request fine-location and background-execution authorization.
    /// Denial fails with [`TrackError::PermissionDenied`](crate::error::TrackError::PermissionDenied).
    async fn request_authorization(&self) -> TrackResult<()>;

    /// Begin background execution and show the tracking indicator
    async fn begin(&self, notice: &TrackingNotice) -> TrackResult<()>;

    /// End background execution and remove the indicator
    async fn end(&self);
}

/// Proof that background execution is held. Owned exclusively by the
/// session that acquired it; only that session releases it.
pub struct ExecutionHandle {
    platform: Arc<dyn ExecutionPlatform>,
    released: AtomicBool,
}

impl ExecutionHandle {
    /// Request authorization, then begin execution. On any failure nothing
    /// is held and there is nothing to release.
    pub async fn acquire(
        platform: Arc<dyn ExecutionPlatform>,
        notice: &TrackingNotice,
    ) -> TrackResult<Self> {
        platform.request_authorization().await?;
        platform.begin(notice).await?;
        debug!("background execution acquired");
        Ok(Self {
            platform,
            released: AtomicBool::new(false),
        })
    }

    /// Release the handle. Idempotent: only the first call reaches the
    /// platform.
    pub async fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.platform.end().await;
            debug!("background execution released");
        }
    }

    /// Whether `release` has already run
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Drop for ExecutionHandle {
    fn drop(&mut self) {
        // release is async and cannot run here
        if !self.released.load(Ordering::SeqCst) {
            warn!("execution handle dropped without release");
        }
    }
}
