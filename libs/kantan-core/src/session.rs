//! Study session lifecycle tracking.
//!
//! A session moves `Idle -> Active -> Flushed`. `end` is idempotent so
//! duplicate flush triggers (explicit sign-out racing with teardown)
//! can never produce a second session record.

use chrono::{DateTime, Utc};

use crate::types::{StudySession, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Active {
        tier: Tier,
        started_at: DateTime<Utc>,
        cards_studied: u32,
    },
    Flushed,
}

/// Tracks counters for the current study session.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    state: SessionState,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// Begin a session: records the start instant and zeroes the card
    /// count. Starting over an existing session simply restarts it.
    pub fn start(&mut self, tier: Tier, now: DateTime<Utc>) {
        self.state = SessionState::Active {
            tier,
            started_at: now,
            cards_studied: 0,
        };
    }

    /// Count one studied card. A no-op outside an active session.
    pub fn record_card_studied(&mut self) {
        if let SessionState::Active { cards_studied, .. } = &mut self.state {
            *cards_studied += 1;
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn cards_studied(&self) -> u32 {
        match self.state {
            SessionState::Active { cards_studied, .. } => cards_studied,
            _ => 0,
        }
    }

    /// End the session and produce the summary to persist.
    ///
    /// Returns `None` when nothing was studied (empty sessions are not
    /// persisted) and on every call after the first; the tracker lands
    /// in `Flushed` either way.
    pub fn end(&mut self, now: DateTime<Utc>) -> Option<StudySession> {
        let SessionState::Active {
            tier,
            started_at,
            cards_studied,
        } = self.state
        else {
            return None;
        };
        self.state = SessionState::Flushed;
        if cards_studied == 0 {
            return None;
        }
        Some(StudySession {
            tier,
            cards_studied,
            duration_seconds: (now - started_at).num_seconds(),
            date: now.date_naive(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn start_time() -> DateTime<Utc> {
        "2026-08-23T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn full_lifecycle_produces_summary() {
        let mut tracker = SessionTracker::new();
        tracker.start(Tier::N5, start_time());
        tracker.record_card_studied();
        tracker.record_card_studied();
        tracker.record_card_studied();

        let summary = tracker
            .end(start_time() + Duration::seconds(90))
            .expect("summary");
        assert_eq!(summary.tier, Tier::N5);
        assert_eq!(summary.cards_studied, 3);
        assert_eq!(summary.duration_seconds, 90);
        assert_eq!(summary.date, start_time().date_naive());
    }

    #[test]
    fn end_is_idempotent() {
        let mut tracker = SessionTracker::new();
        tracker.start(Tier::N4, start_time());
        tracker.record_card_studied();
        assert!(tracker.end(start_time()).is_some());
        assert!(tracker.end(start_time()).is_none());
    }

    #[test]
    fn empty_session_is_not_persisted() {
        let mut tracker = SessionTracker::new();
        tracker.start(Tier::N5, start_time());
        assert!(tracker.end(start_time() + Duration::seconds(30)).is_none());
        assert!(!tracker.is_active());
    }

    #[test]
    fn end_before_start_is_a_no_op() {
        let mut tracker = SessionTracker::new();
        assert!(tracker.end(start_time()).is_none());
    }

    #[test]
    fn counting_outside_active_is_ignored() {
        let mut tracker = SessionTracker::new();
        tracker.record_card_studied();
        tracker.start(Tier::N5, start_time());
        assert_eq!(tracker.cards_studied(), 0);
        tracker.record_card_studied();
        tracker.end(start_time());
        tracker.record_card_studied();
        assert_eq!(tracker.cards_studied(), 0);
    }
}
