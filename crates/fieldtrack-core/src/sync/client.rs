//! HTTP client for the remote work authority

use super::wire::{
    AckResponse, SessionEnvelope, StartRequest, StopRequest, TodayWorkResponse,
    UpdateLocationRequest, WirePoint, WorkRecord,
};
use crate::config::RemoteConfig;
use crate::error::{TrackError, TrackResult};
use crate::types::{GeoPoint, SessionId, TodayWork, WorkSession};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// The remote authority as the engine sees it.
///
/// Every operation is a single attempt: failures surface to the caller,
/// and any retry is a deliberate re-trigger by a higher layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkAuthority: Send + Sync {
    /// The worker's current-day session, if one exists
    async fn fetch_today(&self, worker_id: &str) -> TrackResult<TodayWork>;

    /// Open a new session at the given starting point
    async fn start_session(
        &self,
        username: &str,
        description: &str,
        point: GeoPoint,
    ) -> TrackResult<WorkSession>;

    /// Append one accepted point to the session's path.
    /// Fire-and-forget for the caller: a lost report is acceptable, the
    /// next accepted point carries an equivalent or better fix.
    async fn report_location(
        &self,
        session: SessionId,
        username: &str,
        point: GeoPoint,
    ) -> TrackResult<()>;

    /// Close the session; the authority computes its duration
    async fn stop_session(&self, session: SessionId, username: &str) -> TrackResult<WorkSession>;

    /// The ordered path recorded for a session
    async fn fetch_points(&self, session: SessionId) -> TrackResult<Vec<GeoPoint>>;

    /// All of a worker's recorded sessions, newest first
    async fn fetch_history(&self, username: &str) -> TrackResult<Vec<WorkSession>>;
}

/// reqwest-backed [`WorkAuthority`] implementation
pub struct SyncClient {
    http: Client,
    base_url: String,
}

impl SyncClient {
    /// Build the HTTP client with the configured timeouts
    pub fn new(config: &RemoteConfig) -> TrackResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TrackError::http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/work/{endpoint}", self.base_url)
    }

    /// Check the status and decode the body, mapping non-2xx and malformed
    /// responses to [`TrackError::Remote`] / [`TrackError::Json`]
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> TrackResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), context, "authority returned an error");
            let message = if body.is_empty() {
                format!("{context}: status {status}")
            } else {
                format!("{context}: {body}")
            };
            return Err(TrackError::remote_status(status.as_u16(), message));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| TrackError::json(format!("{context}: {e}")))
    }
}

#[async_trait]
impl WorkAuthority for SyncClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_today(&self, worker_id: &str) -> TrackResult<TodayWork> {
        let response = self
            .http
            .get(self.url("GetTodayUserWork"))
            .query(&[("id", worker_id)])
            .send()
            .await?;
        let body: TodayWorkResponse = Self::decode(response, "today feed").await?;

        let username = body.username;
        let session = body
            .userwork
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|record| record.into_session(&username));
        Ok(TodayWork { username, session })
    }

    #[instrument(skip(self, description), level = "debug")]
    async fn start_session(
        &self,
        username: &str,
        description: &str,
        point: GeoPoint,
    ) -> TrackResult<WorkSession> {
        let request = StartRequest {
            username: username.to_string(),
            work_description: description.to_string(),
            latitude: point.latitude,
            longitude: point.longitude,
        };
        let response = self.http.post(self.url("start")).json(&request).send().await?;
        let envelope: SessionEnvelope = Self::decode(response, "start session").await?;
        debug!(message = %envelope.message, "session started");
        Ok(envelope.session.into_session(username))
    }

    #[instrument(skip(self), level = "debug")]
    async fn report_location(
        &self,
        session: SessionId,
        username: &str,
        point: GeoPoint,
    ) -> TrackResult<()> {
        let request = UpdateLocationRequest {
            work_history_id: session.0,
            username: username.to_string(),
            latitude: point.latitude,
            longitude: point.longitude,
        };
        let response = self
            .http
            .post(self.url("update-location"))
            .json(&request)
            .send()
            .await?;
        let ack: AckResponse = Self::decode(response, "report location").await?;
        debug!(message = %ack.message, "location reported");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn stop_session(&self, session: SessionId, username: &str) -> TrackResult<WorkSession> {
        let request = StopRequest {
            work_history_id: session.0,
            username: username.to_string(),
        };
        let response = self.http.post(self.url("stop")).json(&request).send().await?;
        let envelope: SessionEnvelope = Self::decode(response, "stop session").await?;
        debug!(message = %envelope.message, "session stopped");
        Ok(envelope.session.into_session(username))
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_points(&self, session: SessionId) -> TrackResult<Vec<GeoPoint>> {
        let response = self
            .http
            .get(self.url("get-location-points"))
            .query(&[("workHistoryId", session.0)])
            .send()
            .await?;
        let points: Vec<WirePoint> = Self::decode(response, "location points").await?;
        Ok(points.into_iter().map(GeoPoint::from).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_history(&self, username: &str) -> TrackResult<Vec<WorkSession>> {
        let response = self
            .http
            .get(self.url("userWork"))
            .query(&[("username", username)])
            .send()
            .await?;
        let records: Vec<WorkRecord> = Self::decode(response, "work history").await?;

        let mut sessions: Vec<WorkSession> = records
            .into_iter()
            .map(|record| record.into_session(username))
            .collect();
        // newest first, the order the history view wants
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }
}
