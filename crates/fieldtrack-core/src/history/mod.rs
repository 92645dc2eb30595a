//! Recorded-path playback

mod playback;

pub use playback::{PlaybackEngine, PLAYBACK_TICK, REFRESH_PERIOD};
