//! Command handlers

use crate::host::{HostPlatform, RouteProvider};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use fieldtrack_core::{
    PlaybackEngine, SessionId, SessionState, SessionTracker, SyncClient, TrackerConfig,
    TrackerEvent, WorkAuthority, WorkSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

fn authority(config: &TrackerConfig) -> Result<Arc<dyn WorkAuthority>> {
    Ok(Arc::new(SyncClient::new(&config.remote)?))
}

fn require_worker(config: &TrackerConfig) -> Result<&str> {
    if config.worker_id.is_empty() {
        bail!("no worker id configured; pass --worker or set one in the config file");
    }
    Ok(&config.worker_id)
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn describe(session: &WorkSession) -> String {
    let end = match session.end_time {
        Some(end) => local_time(end),
        None => "ongoing".to_string(),
    };
    let duration = match session.duration_hours {
        Some(hours) => format!("{hours:.2} h"),
        None => "ongoing".to_string(),
    };
    format!(
        "#{} {} | start {} | end {end} | {duration}",
        session.id,
        session.description,
        local_time(session.start_time),
    )
}

pub async fn status(config: TrackerConfig) -> Result<()> {
    let worker = require_worker(&config)?;
    let today = authority(&config)?.fetch_today(worker).await?;

    println!("Worker: {}", today.username);
    match today.session {
        Some(session) if session.is_open() => {
            println!("Status: working");
            println!("{}", describe(&session));
        }
        Some(session) => {
            println!("Status: finished for today");
            println!("{}", describe(&session));
        }
        None => println!("Status: no session today"),
    }
    Ok(())
}

pub async fn track(config: TrackerConfig, description: String, route: PathBuf) -> Result<()> {
    require_worker(&config)?;
    let authority = authority(&config)?;
    let provider = Arc::new(RouteProvider::from_file(&route)?);
    let platform = Arc::new(HostPlatform);
    let mut tracker = SessionTracker::new(authority, provider, platform, config.worker_id.clone());

    tracker.load_current().await?;
    match tracker.state() {
        SessionState::Working => {
            println!("A session is already open; tracking continues.");
        }
        SessionState::Finished => {
            println!("Today's session is already finished.");
            return Ok(());
        }
        _ => {
            tracker.prime_fix().await?;
            let session = tracker.start_session(&description).await?;
            println!("Started session #{} at {}", session.id, local_time(session.start_time));
        }
    }

    println!("Tracking; press Ctrl-C to stop the session.");
    let mut events = tracker.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(TrackerEvent::PointReported(point)) => println!("reported {point}"),
                Ok(TrackerEvent::ReportFailed(reason)) => eprintln!("report failed: {reason}"),
                Ok(TrackerEvent::FixFailed(reason)) => eprintln!("no fix: {reason}"),
                Ok(TrackerEvent::StateChanged(state)) => println!("state: {state}"),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    }

    let closed = tracker.stop_session().await?;
    println!(
        "Stopped session #{}; duration {:.2} h",
        closed.id,
        closed.duration_hours.unwrap_or_default()
    );
    Ok(())
}

pub async fn stop(config: TrackerConfig) -> Result<()> {
    let worker = require_worker(&config)?;
    let authority = authority(&config)?;

    let today = authority.fetch_today(worker).await?;
    let Some(session) = today.session.filter(|s| s.is_open()) else {
        bail!("no open session to stop");
    };

    let closed = authority.stop_session(session.id, &today.username).await?;
    println!(
        "Stopped session #{}; duration {:.2} h",
        closed.id,
        closed.duration_hours.unwrap_or_default()
    );
    Ok(())
}

pub async fn replay(config: TrackerConfig, session_id: i64, follow: bool) -> Result<()> {
    let authority = authority(&config)?;
    let engine = PlaybackEngine::start(authority, SessionId(session_id), follow).await?;

    if engine.point_count() == 0 && !follow {
        println!("No location points recorded for session #{session_id}.");
        return Ok(());
    }

    println!(
        "Replaying {} points for session #{session_id}; press Ctrl-C to quit.",
        engine.point_count()
    );

    let mut printed = usize::MAX;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                let cursor = engine.cursor();
                if cursor != printed {
                    if let Some(point) = engine.current_point() {
                        println!("[{:>4}/{}] {point}", cursor + 1, engine.point_count());
                    }
                    printed = cursor;
                }
                if !follow && engine.at_end() && printed == engine.cursor() {
                    break;
                }
            }
        }
    }

    engine.shutdown();
    Ok(())
}

pub async fn history(config: TrackerConfig, username: String) -> Result<()> {
    let sessions = authority(&config)?.fetch_history(&username).await?;
    if sessions.is_empty() {
        println!("No work history found for {username}.");
        return Ok(());
    }
    println!("Work history for {username}:");
    for session in sessions {
        println!("  {}", describe(&session));
    }
    Ok(())
}
