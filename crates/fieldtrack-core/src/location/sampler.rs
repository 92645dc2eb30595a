//! Periodic, movement-filtered location sampling

use super::provider::{FixRequest, LocationProvider};
use crate::geo::MovementFilter;
use crate::types::LocationFix;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Fixed cadence of acquisition attempts while a session is open
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(10);

/// What the sampler tells its subscriber
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerEvent {
    /// A sample passed the movement filter and is now the baseline
    Accepted(LocationFix),
    /// This tick produced no fix; the schedule keeps running
    AcquisitionFailed(String),
}

/// Owns the periodic acquisition schedule and the movement baseline.
///
/// Each tick asks the [`LocationProvider`] for a fix and runs it through
/// the movement filter against the last *accepted* point; rejected samples
/// never become the new baseline. The acquisition is awaited inline in the
/// schedule task, so a tick can never overlap an in-flight request; the
/// next tick queues behind it.
pub struct LocationSampler {
    provider: Arc<dyn LocationProvider>,
    request: FixRequest,
    cancel: Option<CancellationToken>,
}

impl LocationSampler {
    /// Create a sampler that is not yet running
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            request: FixRequest::default(),
            cancel: None,
        }
    }

    /// Whether the schedule is currently live
    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Start the periodic schedule, emitting events to `events`.
    ///
    /// Calling `start` while already running is a no-op; the schedule is
    /// never duplicated.
    pub fn start(&mut self, events: mpsc::Sender<SamplerEvent>) {
        if self.cancel.is_some() {
            debug!("sampler already running, ignoring start");
            return;
        }
        let cancel = CancellationToken::new();
        tokio::spawn(run_schedule(
            self.provider.clone(),
            self.request,
            events,
            cancel.clone(),
        ));
        self.cancel = Some(cancel);
    }

    /// Cancel the schedule. No further ticks fire; an acquisition already
    /// in flight completes and its result is discarded.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
            debug!("sampler stopped");
        }
    }
}

impl Drop for LocationSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_schedule(
    provider: Arc<dyn LocationProvider>,
    request: FixRequest,
    events: mpsc::Sender<SamplerEvent>,
    cancel: CancellationToken,
) {
    let mut filter = MovementFilter::new();
    let mut ticker = interval(SAMPLE_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("sampler schedule cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let outcome = provider.acquire(&request).await;
        if cancel.is_cancelled() {
            // stopped while the request was in flight; discard the result
            return;
        }

        match outcome {
            Ok(fix) => {
                if filter.accept(fix.point) {
                    debug!(point = %fix.point, "movement accepted");
                    if events.send(SamplerEvent::Accepted(fix)).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "location acquisition failed");
                if events
                    .send(SamplerEvent::AcquisitionFailed(err.to_string()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }
    }
}
