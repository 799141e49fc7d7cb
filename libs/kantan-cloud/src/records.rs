//! Wire rows for the hosted tables.
//!
//! Three logical tables back the study flow: `study_progress` (one row
//! per learner), `card_progress` (one row per learner+card) and
//! `study_sessions` (append-only history). Server-owned columns
//! (`id`, `created_at`) are never written by the client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kantan_core::{CardProgress, Category, Difficulty, StudyProgress, StudySession, Tier};

pub const STUDY_PROGRESS_TABLE: &str = "study_progress";
pub const CARD_PROGRESS_TABLE: &str = "card_progress";
pub const STUDY_SESSIONS_TABLE: &str = "study_sessions";

/// `study_progress` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyProgressRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub user_id: String,
    pub total_studied: u32,
    pub easy_cards: u32,
    pub medium_cards: u32,
    pub hard_cards: u32,
    pub current_streak: u32,
    pub study_time: u64,
    pub last_study_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StudyProgressRow> for StudyProgress {
    fn from(row: StudyProgressRow) -> Self {
        Self {
            total_studied: row.total_studied,
            easy_count: row.easy_cards,
            medium_count: row.medium_cards,
            hard_count: row.hard_cards,
            current_streak: row.current_streak,
            study_time_seconds: row.study_time,
            last_study_date: row.last_study_date,
        }
    }
}

/// Learner-owned columns written on `study_progress` upsert.
#[derive(Debug, Serialize)]
pub struct StudyProgressUpsert {
    pub user_id: String,
    pub total_studied: u32,
    pub easy_cards: u32,
    pub medium_cards: u32,
    pub hard_cards: u32,
    pub current_streak: u32,
    pub study_time: u64,
    pub last_study_date: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl StudyProgressUpsert {
    pub fn new(learner_id: &str, progress: &StudyProgress, now: DateTime<Utc>) -> Self {
        Self {
            user_id: learner_id.to_string(),
            total_studied: progress.total_studied,
            easy_cards: progress.easy_count,
            medium_cards: progress.medium_count,
            hard_cards: progress.hard_count,
            current_streak: progress.current_streak,
            study_time: progress.study_time_seconds,
            last_study_date: progress.last_study_date,
            updated_at: now,
        }
    }
}

/// `card_progress` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardProgressRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub user_id: String,
    pub card_id: String,
    pub level: Tier,
    pub category: Category,
    pub difficulty: u8,
    pub times_studied: u32,
    pub last_studied: DateTime<Utc>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CardProgressRow> for CardProgress {
    fn from(row: CardProgressRow) -> Self {
        Self {
            card_id: row.card_id,
            tier: row.level,
            category: row.category,
            difficulty: Difficulty::from_value(row.difficulty).unwrap_or_default(),
            times_studied: row.times_studied,
            last_studied_at: row.last_studied,
        }
    }
}

/// Columns written on `card_progress` upsert.
#[derive(Debug, Serialize)]
pub struct CardProgressUpsert {
    pub user_id: String,
    pub card_id: String,
    pub level: Tier,
    pub category: Category,
    pub difficulty: u8,
    pub times_studied: u32,
    pub last_studied: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `study_sessions` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySessionRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub user_id: String,
    pub level: Tier,
    pub cards_studied: u32,
    pub session_duration: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<StudySessionRow> for StudySession {
    fn from(row: StudySessionRow) -> Self {
        Self {
            tier: row.level,
            cards_studied: row.cards_studied,
            duration_seconds: row.session_duration,
            date: row.date,
        }
    }
}

/// Columns written on `study_sessions` insert.
#[derive(Debug, Serialize)]
pub struct StudySessionInsert {
    pub user_id: String,
    pub level: Tier,
    pub cards_studied: u32,
    pub session_duration: i64,
    pub date: NaiveDate,
}
