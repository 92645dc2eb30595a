//! Desktop stand-ins for the mobile platform capabilities

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use fieldtrack_core::{
    ExecutionPlatform, FixRequest, GeoPoint, LocationFix, LocationProvider, TrackError,
    TrackResult, TrackingNotice,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// On a desktop host there is nothing to suspend: authorization always
/// succeeds and the tracking indicator is a log line.
pub struct HostPlatform;

#[async_trait]
impl ExecutionPlatform for HostPlatform {
    async fn request_authorization(&self) -> TrackResult<()> {
        Ok(())
    }

    async fn begin(&self, notice: &TrackingNotice) -> TrackResult<()> {
        info!(title = %notice.title, body = %notice.body, "tracking indicator shown");
        Ok(())
    }

    async fn end(&self) {
        info!("tracking indicator removed");
    }
}

/// Replays a fixed route from a JSON file, one point per acquisition,
/// holding the last point once the route is exhausted.
pub struct RouteProvider {
    points: Vec<GeoPoint>,
    next: AtomicUsize,
}

impl RouteProvider {
    /// Load a route from a JSON array of `{ "latitude", "longitude" }`
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read route file {}", path.display()))?;
        let points: Vec<GeoPoint> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse route file {}", path.display()))?;
        Ok(Self {
            points,
            next: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LocationProvider for RouteProvider {
    async fn acquire(&self, _request: &FixRequest) -> TrackResult<LocationFix> {
        if self.points.is_empty() {
            return Err(TrackError::acquisition("route file has no points"));
        }
        let index = self
            .next
            .fetch_add(1, Ordering::SeqCst)
            .min(self.points.len() - 1);
        Ok(LocationFix::new(self.points[index], Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_route_provider_holds_last_point() {
        let dir = std::env::temp_dir().join("fieldtrack-route-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("route.json");
        std::fs::write(
            &path,
            r#"[{"latitude":24.0,"longitude":46.0},{"latitude":24.0002,"longitude":46.0}]"#,
        )
        .unwrap();

        let provider = RouteProvider::from_file(&path).unwrap();
        let request = FixRequest::default();
        let first = provider.acquire(&request).await.unwrap();
        let second = provider.acquire(&request).await.unwrap();
        let third = provider.acquire(&request).await.unwrap();

        assert_eq!(first.point, GeoPoint::new(24.0, 46.0));
        assert_eq!(second.point, GeoPoint::new(24.0002, 46.0));
        assert_eq!(third.point, second.point);
    }
}
