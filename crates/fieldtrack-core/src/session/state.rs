//! Session lifecycle states

use serde::{Deserialize, Serialize};

/// Client-side view of the work-session lifecycle.
///
/// Mutated only by authority responses, never by optimistic local
/// assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No open session and nothing fetched yet
    Idle,
    /// Fetching the current session from the authority
    Loading,
    /// Open session, sampler active
    Working,
    /// Session closed; the most recent summary is cached
    Finished,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::Working => write!(f, "working"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

impl SessionState {
    /// Whether a session is currently open
    pub fn is_working(&self) -> bool {
        matches!(self, SessionState::Working)
    }

    /// Whether the day's work is done. There is no way back to `Working`
    /// except a fresh start the next day, which the authority enforces.
    pub fn is_terminal_for_day(&self) -> bool {
        matches!(self, SessionState::Finished)
    }

    /// Check if a transition to another state is valid
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        match (self, target) {
            // Idle re-queries the authority or starts directly
            (SessionState::Idle, SessionState::Loading | SessionState::Working) => true,
            // Loading resolves to whatever the authority reports
            (
                SessionState::Loading,
                SessionState::Idle | SessionState::Working | SessionState::Finished,
            ) => true,
            // An open session only ends, or is re-queried on re-entry
            (SessionState::Working, SessionState::Finished | SessionState::Loading) => true,
            // Finished can only be re-queried (a new day starts over)
            (SessionState::Finished, SessionState::Loading) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(SessionState::Working.is_working());
        assert!(!SessionState::Idle.is_working());
        assert!(SessionState::Finished.is_terminal_for_day());
        assert!(!SessionState::Working.is_terminal_for_day());
    }

    #[test]
    fn test_state_transitions() {
        // Idle either loads or starts
        assert!(SessionState::Idle.can_transition_to(&SessionState::Loading));
        assert!(SessionState::Idle.can_transition_to(&SessionState::Working));
        assert!(!SessionState::Idle.can_transition_to(&SessionState::Finished));

        // Loading resolves to any of the three outcomes
        assert!(SessionState::Loading.can_transition_to(&SessionState::Idle));
        assert!(SessionState::Loading.can_transition_to(&SessionState::Working));
        assert!(SessionState::Loading.can_transition_to(&SessionState::Finished));

        // Working only finishes or re-loads
        assert!(SessionState::Working.can_transition_to(&SessionState::Finished));
        assert!(SessionState::Working.can_transition_to(&SessionState::Loading));
        assert!(!SessionState::Working.can_transition_to(&SessionState::Idle));

        // Finished never goes straight back to Working
        assert!(!SessionState::Finished.can_transition_to(&SessionState::Working));
        assert!(SessionState::Finished.can_transition_to(&SessionState::Loading));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Working.to_string(), "working");
        assert_eq!(SessionState::Finished.to_string(), "finished");
    }
}
