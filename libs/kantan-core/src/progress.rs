//! Cumulative progress aggregation.

use chrono::NaiveDate;

use crate::types::{Difficulty, StudyProgress};

/// Fold one feedback event into the learner's cumulative statistics.
///
/// Pure transformation; the caller hands the result to the progress
/// store. The bucket-sum invariant holds after every call.
pub fn apply_feedback(
    progress: &StudyProgress,
    difficulty: Difficulty,
    today: NaiveDate,
) -> StudyProgress {
    let mut next = progress.clone();
    next.total_studied += 1;
    match difficulty {
        Difficulty::Easy => next.easy_count += 1,
        Difficulty::Medium => next.medium_count += 1,
        Difficulty::Hard => next.hard_count += 1,
    }
    // TODO: reset current_streak when last_study_date is more than one
    // day behind `today`; the unconditional increment matches shipped
    // behavior but needs a product decision before changing.
    next.current_streak += 1;
    next.last_study_date = today;
    next
}
