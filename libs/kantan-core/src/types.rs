//! Core types for the Kantan study loop.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// JLPT proficiency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    N5,
    N4,
    N3,
    N2,
    N1,
}

impl Tier {
    /// Get the tier identifier as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N5 => "n5",
            Self::N4 => "n4",
            Self::N3 => "n3",
            Self::N2 => "n2",
            Self::N1 => "n1",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "n5" => Some(Self::N5),
            "n4" => Some(Self::N4),
            "n3" => Some(Self::N3),
            "n2" => Some(Self::N2),
            "n1" => Some(Self::N1),
            _ => None,
        }
    }

    /// All tiers, beginner first.
    pub fn all() -> [Tier; 5] {
        [Self::N5, Self::N4, Self::N3, Self::N2, Self::N1]
    }
}

/// Card category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Word,
    Kanji,
    Phrase,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Kanji => "kanji",
            Self::Phrase => "phrase",
        }
    }
}

/// Learner-reported difficulty for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

impl Difficulty {
    /// Convert to numeric value (0-2).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    /// Create from numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Easy),
            1 => Some(Self::Medium),
            2 => Some(Self::Hard),
            _ => None,
        }
    }

    /// Sampling weight for adaptive selection. Cards a learner found
    /// harder reappear proportionally more often.
    pub fn selection_weight(self) -> u32 {
        match self {
            Self::Hard => 4,
            Self::Medium => 2,
            Self::Easy => 1,
        }
    }
}

/// Display content of a card, tagged by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum CardContent {
    Word {
        japanese: String,
        romaji: String,
        english: String,
    },
    Kanji {
        character: String,
        reading: String,
        meaning: String,
        strokes: u32,
    },
    Phrase {
        japanese: String,
        romaji: String,
        english: String,
    },
}

impl CardContent {
    pub fn category(&self) -> Category {
        match self {
            Self::Word { .. } => Category::Word,
            Self::Kanji { .. } => Category::Kanji,
            Self::Phrase { .. } => Category::Phrase,
        }
    }

    /// Text shown on the front of the card.
    pub fn front_text(&self) -> &str {
        match self {
            Self::Word { japanese, .. } | Self::Phrase { japanese, .. } => japanese,
            Self::Kanji { character, .. } => character,
        }
    }

    /// Text shown once the card is flipped.
    pub fn back_text(&self) -> &str {
        match self {
            Self::Word { english, .. } | Self::Phrase { english, .. } => english,
            Self::Kanji { meaning, .. } => meaning,
        }
    }

    /// Romanized or kana pronunciation aid.
    pub fn pronunciation(&self) -> &str {
        match self {
            Self::Word { romaji, .. } | Self::Phrase { romaji, .. } => romaji,
            Self::Kanji { reading, .. } => reading,
        }
    }
}

/// One immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub tier: Tier,
    pub base_difficulty: Difficulty,
    pub content: CardContent,
}

impl CatalogItem {
    pub fn category(&self) -> Category {
        self.content.category()
    }
}

/// Cumulative per-learner statistics.
///
/// Invariant: `total_studied == easy_count + medium_count + hard_count`
/// after every aggregation step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyProgress {
    pub total_studied: u32,
    pub easy_count: u32,
    pub medium_count: u32,
    pub hard_count: u32,
    pub current_streak: u32,
    pub study_time_seconds: u64,
    pub last_study_date: NaiveDate,
}

impl StudyProgress {
    /// Check the bucket-sum invariant.
    pub fn is_consistent(&self) -> bool {
        self.total_studied == self.easy_count + self.medium_count + self.hard_count
    }
}

/// Per-card learning record. Created lazily on first feedback, never
/// deleted; `difficulty` holds the latest report, not an average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProgress {
    pub card_id: String,
    pub tier: Tier,
    pub category: Category,
    pub difficulty: Difficulty,
    pub times_studied: u32,
    pub last_studied_at: DateTime<Utc>,
}

/// Append-only summary of one study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub tier: Tier,
    pub cards_studied: u32,
    pub duration_seconds: i64,
    pub date: NaiveDate,
}
