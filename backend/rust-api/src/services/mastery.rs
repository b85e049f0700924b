//! Mastery Calculator: the single source of truth for scoring, the mastery
//! formula, and how one event mutates a `UnitProgress` aggregate. Both the
//! incremental write path and the from-scratch replay used in tests go
//! through these functions.

use chrono::{DateTime, Utc};

use crate::models::answer::AnswerEvent;
use crate::models::progress::UnitProgress;
use crate::models::VisitKind;

/// Score for one submission:
/// - 100 on a first-attempt correct answer
/// - correct on attempt n > 1 decays by 10 per prior attempt, floored at 50
/// - 0 when incorrect
pub fn score_for(is_correct: bool, attempt_number: u32) -> i32 {
    if !is_correct {
        return 0;
    }
    if attempt_number <= 1 {
        100
    } else {
        std::cmp::max(50, 100 - (attempt_number as i32 - 1) * 10)
    }
}

/// Mastery blends accuracy (60%) with practice volume (20%, saturating at 10
/// sessions) and study volume (20%, saturating at 5 sessions). Always within
/// [0,1]; zero counters yield zero accuracy rather than a division by zero.
pub fn mastery_level(
    correct_count: u64,
    incorrect_count: u64,
    practice_count: u64,
    study_count: u64,
) -> f64 {
    let answered = correct_count + incorrect_count;
    let correct_rate = if answered == 0 {
        0.0
    } else {
        correct_count as f64 / answered as f64
    };
    let practice_part = (practice_count as f64 / 10.0).min(1.0);
    let study_part = (study_count as f64 / 5.0).min(1.0);
    clamp01(correct_rate * 0.6 + practice_part * 0.2 + study_part * 0.2)
}

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Applies one answer event to the aggregate, in the fixed update order:
/// counters, then timing, then bookkeeping, then mastery recompute.
pub fn apply_answer(
    progress: &mut UnitProgress,
    is_correct: bool,
    response_time_ms: Option<u64>,
    solved_transition: bool,
    now: DateTime<Utc>,
) {
    progress.total_answer_count += 1;
    if is_correct {
        progress.correct_count += 1;
    } else {
        progress.incorrect_count += 1;
    }

    if let Some(response_time_ms) = response_time_ms {
        let delta = response_time_ms as f64 - progress.average_response_time_ms;
        progress.average_response_time_ms += delta / progress.total_answer_count as f64;
        progress.total_time_spent_ms += response_time_ms;
    }

    if solved_transition {
        progress.completed_exercises += 1;
    }

    progress.last_practice_time = Some(now);
    progress.mastery_level = mastery_level(
        progress.correct_count,
        progress.incorrect_count,
        progress.practice_count,
        progress.study_count,
    );
}

/// Applies a study/practice page visit to the aggregate.
pub fn apply_visit(progress: &mut UnitProgress, kind: VisitKind, now: DateTime<Utc>) {
    match kind {
        VisitKind::Study => {
            progress.study_count += 1;
            progress.last_study_time = Some(now);
        }
        VisitKind::Practice => {
            progress.practice_count += 1;
            progress.last_practice_time = Some(now);
        }
    }
    progress.mastery_level = mastery_level(
        progress.correct_count,
        progress.incorrect_count,
        progress.practice_count,
        progress.study_count,
    );
}

/// Rebuilds a unit aggregate from scratch by replaying its ordered events.
/// Used to audit the incrementally maintained aggregate.
pub fn replay<'a, I>(student_id: &str, unit_id: &str, events: I) -> UnitProgress
where
    I: IntoIterator<Item = &'a AnswerEvent>,
{
    let mut progress = UnitProgress::new(student_id, unit_id);
    for event in events {
        debug_assert_eq!(event.student_id, student_id);
        debug_assert_eq!(event.unit_id, unit_id);
        apply_answer(
            &mut progress,
            event.is_correct,
            event.response_time_ms,
            event.points_earned > 0,
            event.submit_time,
        );
    }
    progress
}
