//! The session tracker: lifecycle transitions and their side effects

use super::state::SessionState;
use crate::background::{ExecutionHandle, ExecutionPlatform, TrackingNotice};
use crate::error::{TrackError, TrackResult};
use crate::location::{FixRequest, LocationProvider, LocationSampler, SamplerEvent};
use crate::sync::WorkAuthority;
use crate::types::{GeoPoint, LocationFix, SessionId, WorkSession};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Non-blocking notices emitted while tracking.
///
/// Transient failures (a missed fix, a dropped report) arrive here and
/// never interrupt an open session; only explicit start/stop failures
/// surface as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    StateChanged(SessionState),
    /// An accepted point reached the authority
    PointReported(GeoPoint),
    /// An accepted point was lost; the next one carries a better fix
    ReportFailed(String),
    /// No location fix this tick
    FixFailed(String),
}

/// Owns the session lifecycle: the current [`SessionState`], the active
/// [`WorkSession`], the location sampler, and the background execution
/// handle. State changes only on authority responses.
pub struct SessionTracker {
    authority: Arc<dyn WorkAuthority>,
    provider: Arc<dyn LocationProvider>,
    platform: Arc<dyn ExecutionPlatform>,
    worker_id: String,
    notice: TrackingNotice,
    state: SessionState,
    username: Option<String>,
    session: Option<WorkSession>,
    last_fix: Option<LocationFix>,
    sampler: Option<LocationSampler>,
    handle: Option<ExecutionHandle>,
    events: broadcast::Sender<TrackerEvent>,
}

impl SessionTracker {
    /// Create a tracker in the `Idle` state
    pub fn new(
        authority: Arc<dyn WorkAuthority>,
        provider: Arc<dyn LocationProvider>,
        platform: Arc<dyn ExecutionPlatform>,
        worker_id: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            authority,
            provider,
            platform,
            worker_id: worker_id.into(),
            notice: TrackingNotice::default(),
            state: SessionState::Idle,
            username: None,
            session: None,
            last_fix: None,
            sampler: None,
            handle: None,
            events,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current session, open or most recently closed
    pub fn session(&self) -> Option<&WorkSession> {
        self.session.as_ref()
    }

    /// The most recent one-shot fix, used as the start guard
    pub fn last_fix(&self) -> Option<LocationFix> {
        self.last_fix
    }

    /// Whether the sampler schedule is live
    pub fn is_tracking(&self) -> bool {
        self.sampler.as_ref().is_some_and(LocationSampler::is_running)
    }

    /// Subscribe to non-blocking tracker notices
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    /// Query the authority for the worker's current-day session and adopt
    /// its answer: open session means `Working` (tracking starts), closed
    /// means `Finished`, none means `Idle`.
    pub async fn load_current(&mut self) -> TrackResult<SessionState> {
        self.set_state(SessionState::Loading);

        let today = match self.authority.fetch_today(&self.worker_id).await {
            Ok(today) => today,
            Err(err) => {
                self.set_state(SessionState::Idle);
                return Err(err);
            }
        };
        self.username = Some(today.username.clone());

        match today.session {
            Some(session) if session.is_open() => {
                let id = session.id;
                self.session = Some(session);
                self.set_state(SessionState::Working);
                // The session is open server-side regardless of whether
                // tracking can run here, so the state stays Working even
                // if acquisition is denied.
                self.begin_tracking(id, today.username).await?;
            }
            Some(session) => {
                self.session = Some(session);
                self.set_state(SessionState::Finished);
            }
            None => {
                self.session = None;
                self.set_state(SessionState::Idle);
            }
        }
        Ok(self.state)
    }

    /// One-shot acquisition seeding the fix that `start_session` requires
    pub async fn prime_fix(&mut self) -> TrackResult<LocationFix> {
        match self.provider.acquire(&FixRequest::default()).await {
            Ok(fix) => {
                self.last_fix = Some(fix);
                Ok(fix)
            }
            Err(err) => {
                let _ = self.events.send(TrackerEvent::FixFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Start a new session.
    ///
    /// Local guards run first and make no network call: the description
    /// must be non-empty and a fix must have been primed. The background
    /// handle is acquired before the authority call and released again if
    /// the call fails, so a failed start holds nothing.
    pub async fn start_session(&mut self, description: &str) -> TrackResult<WorkSession> {
        if self.state.is_working() {
            return Err(TrackError::precondition("a session is already open"));
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(TrackError::precondition("work description must not be empty"));
        }
        let fix = self
            .last_fix
            .ok_or_else(|| TrackError::precondition("no location fix available yet"))?;
        let username = self
            .username
            .clone()
            .ok_or_else(|| TrackError::precondition("current work state not loaded"))?;

        let handle = ExecutionHandle::acquire(self.platform.clone(), &self.notice).await?;

        let session = match self
            .authority
            .start_session(&username, description, fix.point)
            .await
        {
            Ok(session) => session,
            Err(err) => {
                handle.release().await;
                return Err(err);
            }
        };

        debug!(session = %session.id, "session started");
        self.handle = Some(handle);
        self.start_sampler(session.id, username);
        self.session = Some(session.clone());
        self.set_state(SessionState::Working);
        Ok(session)
    }

    /// Close the open session. On failure the state is unchanged and
    /// tracking keeps running; the caller may re-trigger.
    pub async fn stop_session(&mut self) -> TrackResult<WorkSession> {
        let open = self
            .session
            .as_ref()
            .filter(|s| s.is_open())
            .cloned()
            .ok_or_else(|| TrackError::precondition("no open session to stop"))?;
        let username = self.username.clone().unwrap_or_else(|| open.worker.clone());

        let closed = self.authority.stop_session(open.id, &username).await?;

        debug!(session = %closed.id, "session stopped");
        self.end_tracking().await;
        self.session = Some(closed.clone());
        self.set_state(SessionState::Finished);
        Ok(closed)
    }

    /// Teardown on screen exit: stops the sampler and releases the
    /// execution handle without touching the authority. A server-side
    /// open session stays open.
    pub async fn shutdown(&mut self) {
        self.end_tracking().await;
    }

    /// Acquire the execution handle and start the sampler. No-op for the
    /// parts that are already live.
    async fn begin_tracking(&mut self, session: SessionId, username: String) -> TrackResult<()> {
        if self.handle.is_none() {
            let handle = ExecutionHandle::acquire(self.platform.clone(), &self.notice).await?;
            self.handle = Some(handle);
        }
        if self.sampler.is_none() {
            self.start_sampler(session, username);
        }
        Ok(())
    }

    fn start_sampler(&mut self, session: SessionId, username: String) {
        let (tx, rx) = mpsc::channel(16);
        let mut sampler = LocationSampler::new(self.provider.clone());
        sampler.start(tx);
        self.sampler = Some(sampler);
        tokio::spawn(forward_samples(
            self.authority.clone(),
            session,
            username,
            rx,
            self.events.clone(),
        ));
    }

    async fn end_tracking(&mut self) {
        if let Some(mut sampler) = self.sampler.take() {
            sampler.stop();
        }
        if let Some(handle) = self.handle.take() {
            handle.release().await;
        }
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(&next) {
            warn!(from = %self.state, to = %next, "unexpected state transition");
        }
        debug!(from = %self.state, to = %next, "session state changed");
        self.state = next;
        let _ = self.events.send(TrackerEvent::StateChanged(next));
    }
}

/// Relay accepted points to the authority, one at a time and in capture
/// order. A failed report is logged and dropped; the filter baseline has
/// already advanced by then.
async fn forward_samples(
    authority: Arc<dyn WorkAuthority>,
    session: SessionId,
    username: String,
    mut samples: mpsc::Receiver<SamplerEvent>,
    events: broadcast::Sender<TrackerEvent>,
) {
    while let Some(event) = samples.recv().await {
        match event {
            SamplerEvent::Accepted(fix) => {
                match authority.report_location(session, &username, fix.point).await {
                    Ok(()) => {
                        let _ = events.send(TrackerEvent::PointReported(fix.point));
                    }
                    Err(err) => {
                        warn!(error = %err, session = %session, "location report failed");
                        let _ = events.send(TrackerEvent::ReportFailed(err.to_string()));
                    }
                }
            }
            SamplerEvent::AcquisitionFailed(reason) => {
                let _ = events.send(TrackerEvent::FixFailed(reason));
            }
        }
    }
    debug!(session = %session, "sample forwarding ended");
}
