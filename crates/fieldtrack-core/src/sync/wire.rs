//! Wire-level request and response types for the work authority
//!
//! The authority is a .NET service: timestamps come as naive local strings
//! and an open session carries the `DateTime.MinValue` sentinel
//! (`0001-01-01T00:00:00`) instead of a missing field. Session ids arrive
//! as strings in the today feed but as numbers in the history feed.

use crate::types::{GeoPoint, SessionId, WorkSession};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub username: String,
    pub work_description: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    pub work_history_id: i64,
    pub username: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRequest {
    pub work_history_id: i64,
    pub username: String,
}

/// Bare `{ message }` acknowledgement
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub message: String,
}

/// One work record as the authority serializes it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub work_description: String,
    #[serde(deserialize_with = "wire_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "open_end_time")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl WorkRecord {
    /// Promote to the domain type, borrowing the worker name from the
    /// surrounding response when the record itself carries none
    pub fn into_session(self, fallback_worker: &str) -> WorkSession {
        let worker = self
            .username
            .unwrap_or_else(|| fallback_worker.to_string());
        WorkSession {
            id: SessionId(self.id),
            worker,
            description: self.work_description,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_hours: if self.end_time.is_some() {
                self.duration
            } else {
                None
            },
        }
    }
}

/// `GET /work/GetTodayUserWork` body
#[derive(Debug, Clone, Deserialize)]
pub struct TodayWorkResponse {
    pub username: String,
    #[serde(default)]
    pub userwork: Option<Vec<WorkRecord>>,
}

/// `{ message, ...session }` body returned by start and stop
#[derive(Debug, Clone, Deserialize)]
pub struct SessionEnvelope {
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub session: WorkRecord,
}

/// One recorded path point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<WirePoint> for GeoPoint {
    fn from(p: WirePoint) -> Self {
        GeoPoint::new(p.latitude, p.longitude)
    }
}

fn parse_wire_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    // naive local string, with or without fractional seconds
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")?;
    Ok(naive.and_utc())
}

fn wire_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Any year-1 timestamp is the "still open" sentinel and must never be
/// surfaced as a real end time
fn open_end_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => {
            let ts = parse_wire_timestamp(&raw).map_err(serde::de::Error::custom)?;
            if ts.year() == 1 {
                Ok(None)
            } else {
                Ok(Some(ts))
            }
        }
    }
}

fn flexible_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_sentinel_maps_to_none() {
        let raw = r#"{
            "id": "12",
            "workDescription": "Paint fence",
            "startTime": "2024-05-02T08:00:00",
            "endTime": "0001-01-01T00:00:00",
            "duration": 0
        }"#;
        let record: WorkRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.end_time, None);

        let session = record.into_session("ayse");
        assert!(session.is_open());
        assert_eq!(session.duration_hours, None);
        assert_eq!(session.id, SessionId(12));
    }

    #[test]
    fn test_closed_record() {
        let raw = r#"{
            "id": 12,
            "username": "ayse",
            "workDescription": "Paint fence",
            "startTime": "2024-05-02T08:00:00",
            "endTime": "2024-05-02T09:30:00.5",
            "duration": 1.5
        }"#;
        let record: WorkRecord = serde_json::from_str(raw).unwrap();
        let session = record.into_session("ignored");
        assert!(!session.is_open());
        assert_eq!(session.worker, "ayse");
        assert_eq!(session.duration_hours, Some(1.5));
    }

    #[test]
    fn test_string_and_numeric_ids() {
        let as_string: WorkRecord = serde_json::from_str(
            r#"{"id":"7","workDescription":"x","startTime":"2024-05-02T08:00:00"}"#,
        )
        .unwrap();
        let as_number: WorkRecord = serde_json::from_str(
            r#"{"id":7,"workDescription":"x","startTime":"2024-05-02T08:00:00"}"#,
        )
        .unwrap();
        assert_eq!(as_string.id, as_number.id);
    }

    #[test]
    fn test_today_response_with_empty_feed() {
        let body: TodayWorkResponse =
            serde_json::from_str(r#"{"username":"ayse","userwork":[]}"#).unwrap();
        assert!(body.userwork.unwrap().is_empty());

        let body: TodayWorkResponse =
            serde_json::from_str(r#"{"username":"ayse","userwork":null}"#).unwrap();
        assert!(body.userwork.is_none());
    }

    #[test]
    fn test_session_envelope_flattens() {
        let raw = r#"{
            "message": "Work started",
            "id": "3",
            "workDescription": "Paint fence",
            "startTime": "2024-05-02T08:00:00",
            "endTime": "0001-01-01T00:00:00"
        }"#;
        let envelope: SessionEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.message, "Work started");
        assert_eq!(envelope.session.id, 3);
        assert!(envelope.session.end_time.is_none());
    }

    #[test]
    fn test_request_bodies_use_camel_case() {
        let body = serde_json::to_value(UpdateLocationRequest {
            work_history_id: 3,
            username: "ayse".to_string(),
            latitude: 24.0,
            longitude: 46.0,
        })
        .unwrap();
        assert_eq!(body["workHistoryId"], 3);
        assert_eq!(body["username"], "ayse");
    }
}
