//! Fail-soft progress store adapter.
//!
//! Every operation degrades to `None`/empty instead of failing: when
//! the backend is unconfigured (demo mode) and when the provider
//! faults. Faults are logged and swallowed here so a transient network
//! problem can never crash the study flow.

use chrono::{Duration, Utc};

use kantan_core::{CardProgress, Category, Difficulty, StudyProgress, StudySession, Tier};

use crate::provider::RecordStore;
use crate::records::{
    CardProgressRow, CardProgressUpsert, StudyProgressRow, StudyProgressUpsert, StudySessionInsert,
    StudySessionRow, CARD_PROGRESS_TABLE, STUDY_PROGRESS_TABLE, STUDY_SESSIONS_TABLE,
};

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Adapter between the study flow and the persistence provider.
///
/// `backend: None` is demo mode: every read returns its empty result
/// and every write is a no-op.
pub struct ProgressStore<S: RecordStore> {
    backend: Option<S>,
}

impl<S: RecordStore> ProgressStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Cumulative statistics for a learner; `None` when no record
    /// exists yet, on fault, or in demo mode.
    pub async fn get_study_progress(&self, learner_id: &str) -> Option<StudyProgress> {
        let backend = self.backend.as_ref()?;
        let result = backend
            .select_one::<StudyProgressRow>(
                STUDY_PROGRESS_TABLE,
                &[("user_id", eq(learner_id))],
            )
            .await;
        match result {
            Ok(row) => row.map(Into::into),
            Err(err) => {
                tracing::warn!("failed to read study progress: {err}");
                None
            }
        }
    }

    /// Insert-or-replace the learner's cumulative statistics, stamping
    /// `updated_at`. Returns the stored record.
    pub async fn upsert_study_progress(
        &self,
        learner_id: &str,
        progress: &StudyProgress,
    ) -> Option<StudyProgress> {
        let backend = self.backend.as_ref()?;
        let payload = StudyProgressUpsert::new(learner_id, progress, Utc::now());
        let result = backend
            .upsert::<StudyProgressRow, _>(STUDY_PROGRESS_TABLE, &payload, "user_id")
            .await;
        match result {
            Ok(row) => Some(row.into()),
            Err(err) => {
                tracing::warn!("failed to save study progress: {err}");
                None
            }
        }
    }

    pub async fn get_card_progress(
        &self,
        learner_id: &str,
        card_id: &str,
    ) -> Option<CardProgress> {
        let backend = self.backend.as_ref()?;
        let result = backend
            .select_one::<CardProgressRow>(
                CARD_PROGRESS_TABLE,
                &[("user_id", eq(learner_id)), ("card_id", eq(card_id))],
            )
            .await;
        match result {
            Ok(row) => row.map(Into::into),
            Err(err) => {
                tracing::warn!("failed to read card progress: {err}");
                None
            }
        }
    }

    /// Record one feedback event for a card: bumps `times_studied` by
    /// exactly one over the previous read, overwrites the difficulty
    /// and refreshes `last_studied`.
    pub async fn upsert_card_progress(
        &self,
        learner_id: &str,
        card_id: &str,
        tier: Tier,
        category: Category,
        difficulty: Difficulty,
    ) -> Option<CardProgress> {
        let backend = self.backend.as_ref()?;
        let existing = self.get_card_progress(learner_id, card_id).await;
        let times_studied = existing.map(|p| p.times_studied).unwrap_or(0) + 1;

        let now = Utc::now();
        let payload = CardProgressUpsert {
            user_id: learner_id.to_string(),
            card_id: card_id.to_string(),
            level: tier,
            category,
            difficulty: difficulty.to_value(),
            times_studied,
            last_studied: now,
            updated_at: now,
        };
        let result = backend
            .upsert::<CardProgressRow, _>(CARD_PROGRESS_TABLE, &payload, "user_id,card_id")
            .await;
        match result {
            Ok(row) => Some(row.into()),
            Err(err) => {
                tracing::warn!("failed to save card progress: {err}");
                None
            }
        }
    }

    pub async fn get_all_card_progress(&self, learner_id: &str) -> Vec<CardProgress> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        let result = backend
            .select_all::<CardProgressRow>(
                CARD_PROGRESS_TABLE,
                &[("user_id", eq(learner_id))],
                None,
                None,
            )
            .await;
        match result {
            Ok(rows) => rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                tracing::warn!("failed to read card progress map: {err}");
                Vec::new()
            }
        }
    }

    /// Append one immutable session record. Plain insert, never upsert.
    pub async fn create_study_session(
        &self,
        learner_id: &str,
        tier: Tier,
        cards_studied: u32,
        duration_seconds: i64,
    ) -> Option<StudySession> {
        let backend = self.backend.as_ref()?;
        let payload = StudySessionInsert {
            user_id: learner_id.to_string(),
            level: tier,
            cards_studied,
            session_duration: duration_seconds,
            date: Utc::now().date_naive(),
        };
        let result = backend
            .insert::<StudySessionRow, _>(STUDY_SESSIONS_TABLE, &payload)
            .await;
        match result {
            Ok(row) => Some(row.into()),
            Err(err) => {
                tracing::warn!("failed to record study session: {err}");
                None
            }
        }
    }

    /// Recent sessions, newest first, truncated to `limit`.
    pub async fn get_study_sessions(&self, learner_id: &str, limit: usize) -> Vec<StudySession> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        let result = backend
            .select_all::<StudySessionRow>(
                STUDY_SESSIONS_TABLE,
                &[("user_id", eq(learner_id))],
                Some("created_at.desc"),
                Some(limit),
            )
            .await;
        match result {
            Ok(rows) => rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                tracing::warn!("failed to read study sessions: {err}");
                Vec::new()
            }
        }
    }

    /// Sessions from the trailing seven days, oldest first, for the
    /// stats view.
    pub async fn get_weekly_sessions(&self, learner_id: &str) -> Vec<StudySession> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        let cutoff = Utc::now().date_naive() - Duration::days(7);
        let result = backend
            .select_all::<StudySessionRow>(
                STUDY_SESSIONS_TABLE,
                &[
                    ("user_id", eq(learner_id)),
                    ("date", format!("gte.{cutoff}")),
                ],
                Some("date.asc"),
                None,
            )
            .await;
        match result {
            Ok(rows) => rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                tracing::warn!("failed to read weekly sessions: {err}");
                Vec::new()
            }
        }
    }
}
