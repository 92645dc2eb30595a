//! Replays a session's recorded path at a fixed cadence
//!
//! The cursor timer and the data-refresh timer are independent: a refresh
//! that extends the path never resets or jumps the cursor.

use crate::error::TrackResult;
use crate::sync::WorkAuthority;
use crate::types::{GeoPoint, SessionId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cadence at which the playback cursor advances
pub const PLAYBACK_TICK: Duration = Duration::from_secs(1);

/// Cadence at which an open session's path is re-fetched
pub const REFRESH_PERIOD: Duration = Duration::from_secs(5);

struct PlaybackShared {
    path: RwLock<Vec<GeoPoint>>,
    cursor: AtomicUsize,
}

/// Fetches a session's path and replays it one point per second,
/// holding on the last point. While the session is still open the path is
/// re-fetched every five seconds and replaced only if it grew.
pub struct PlaybackEngine {
    shared: Arc<PlaybackShared>,
    cancel: CancellationToken,
}

impl PlaybackEngine {
    /// Fetch the recorded path and start the timers. `still_open` controls
    /// whether the refresh timer runs at all.
    pub async fn start(
        authority: Arc<dyn WorkAuthority>,
        session: SessionId,
        still_open: bool,
    ) -> TrackResult<Self> {
        let initial = authority.fetch_points(session).await?;
        debug!(session = %session, points = initial.len(), "playback starting");

        let shared = Arc::new(PlaybackShared {
            path: RwLock::new(initial),
            cursor: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();

        tokio::spawn(advance_cursor(shared.clone(), cancel.clone()));
        if still_open {
            tokio::spawn(refresh_path(authority, session, shared.clone(), cancel.clone()));
        }

        Ok(Self { shared, cancel })
    }

    /// Snapshot of the current path
    pub fn path(&self) -> Vec<GeoPoint> {
        self.shared.path.read().clone()
    }

    /// Number of points currently known
    pub fn point_count(&self) -> usize {
        self.shared.path.read().len()
    }

    /// Current cursor index
    pub fn cursor(&self) -> usize {
        self.shared.cursor.load(Ordering::SeqCst)
    }

    /// The point under the cursor, if any points exist
    pub fn current_point(&self) -> Option<GeoPoint> {
        let path = self.shared.path.read();
        path.get(self.cursor()).or_else(|| path.last()).copied()
    }

    /// Whether the cursor rests on the last known point
    pub fn at_end(&self) -> bool {
        let len = self.point_count();
        len == 0 || self.cursor() + 1 >= len
    }

    /// Cancel both timers. No further ticks fire; a fetch already in
    /// flight completes and its result is discarded.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn advance_cursor(shared: Arc<PlaybackShared>, cancel: CancellationToken) {
    let mut ticker = interval(PLAYBACK_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // the interval fires immediately; swallow that tick so the marker
    // rests on the starting point for one full period
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        _ = ticker.tick() => {}
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("playback cursor cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let len = shared.path.read().len();
        let cursor = shared.cursor.load(Ordering::SeqCst);
        if cursor + 1 < len {
            shared.cursor.store(cursor + 1, Ordering::SeqCst);
        }
    }
}

async fn refresh_path(
    authority: Arc<dyn WorkAuthority>,
    session: SessionId,
    shared: Arc<PlaybackShared>,
    cancel: CancellationToken,
) {
    let mut ticker = interval(REFRESH_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // initial fetch already happened in start(); skip the immediate tick
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        _ = ticker.tick() => {}
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("path refresh cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        // awaited inline: the next tick queues behind an in-flight fetch
        let fetched = authority.fetch_points(session).await;
        if cancel.is_cancelled() {
            return;
        }

        match fetched {
            Ok(points) => {
                let mut path = shared.path.write();
                // the path only ever grows; a shorter or equal answer is
                // stale and ignored
                if points.len() > path.len() {
                    debug!(from = path.len(), to = points.len(), "path extended");
                    *path = points;
                }
            }
            Err(err) => {
                warn!(error = %err, session = %session, "path refresh failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MockWorkAuthority;

    fn line(n: usize) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| GeoPoint::new(24.0 + 0.001 * i as f64, 46.0))
            .collect()
    }

    fn authority_with_path(points: Vec<GeoPoint>) -> MockWorkAuthority {
        let mut authority = MockWorkAuthority::new();
        authority
            .expect_fetch_points()
            .returning(move |_| Ok(points.clone()));
        authority
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_advances_and_holds_on_last_point() {
        let authority = authority_with_path(line(5));
        let engine = PlaybackEngine::start(Arc::new(authority), SessionId(3), false)
            .await
            .unwrap();
        assert_eq!(engine.cursor(), 0);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(engine.cursor(), 4);
        assert!(engine.at_end());

        // holds on the last point from then on
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.cursor(), 4);
        assert_eq!(engine.current_point(), Some(GeoPoint::new(24.004, 46.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_length_refresh_changes_nothing() {
        let authority = authority_with_path(line(5));
        let engine = PlaybackEngine::start(Arc::new(authority), SessionId(3), true)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(12)).await;
        // two refreshes have come back with the same five points
        assert_eq!(engine.point_count(), 5);
        assert_eq!(engine.cursor(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_growing_refresh_extends_without_resetting_cursor() {
        let mut authority = MockWorkAuthority::new();
        let mut lengths = vec![5usize, 7].into_iter();
        authority.expect_fetch_points().returning(move |_| {
            let n = lengths.next().unwrap_or(7);
            Ok(line(n))
        });

        let engine = PlaybackEngine::start(Arc::new(authority), SessionId(3), true)
            .await
            .unwrap();

        // by 8 s the refresh has delivered 7 points and the cursor has
        // kept walking from where it was into the new tail
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(engine.point_count(), 7);
        assert_eq!(engine.cursor(), 6, "refresh must not reset the cursor");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.cursor(), 6);
        assert!(engine.at_end());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shrinking_refresh_is_ignored() {
        let mut authority = MockWorkAuthority::new();
        let mut lengths = vec![5usize, 2].into_iter();
        authority.expect_fetch_points().returning(move |_| {
            let n = lengths.next().unwrap_or(2);
            Ok(line(n))
        });

        let engine = PlaybackEngine::start(Arc::new(authority), SessionId(3), true)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(engine.point_count(), 5, "a shorter answer is stale");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failure_keeps_playing() {
        let mut authority = MockWorkAuthority::new();
        let mut first = true;
        authority.expect_fetch_points().returning(move |_| {
            if first {
                first = false;
                Ok(line(5))
            } else {
                Err(crate::error::TrackError::remote_status(500, "boom"))
            }
        });

        let engine = PlaybackEngine::start(Arc::new(authority), SessionId(3), true)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(engine.point_count(), 5);
        assert_eq!(engine.cursor(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_both_timers() {
        let mut authority = MockWorkAuthority::new();
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = fetches.clone();
        authority.expect_fetch_points().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(line(5))
        });

        let engine = PlaybackEngine::start(Arc::new(authority), SessionId(3), true)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        engine.shutdown();

        let cursor_at_shutdown = engine.cursor();
        let fetches_at_shutdown = fetches.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(engine.cursor(), cursor_at_shutdown);
        assert_eq!(fetches.load(Ordering::SeqCst), fetches_at_shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_path_has_no_current_point() {
        let authority = authority_with_path(Vec::new());
        let engine = PlaybackEngine::start(Arc::new(authority), SessionId(3), false)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(engine.current_point(), None);
        assert_eq!(engine.cursor(), 0);
    }
}
