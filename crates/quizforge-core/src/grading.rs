//! Manual grading reconciliation.
//!
//! Applies grader-assigned points to a session's answers and recomputes the
//! session score from scratch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerId, AnswerRecord, Correctness};

/// Result of a [`regrade`] pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegradeOutcome {
    pub answers: Vec<AnswerRecord>,
    /// Sum of earned points over every answer.
    pub session_score: f64,
    /// Override ids that matched no answer or carried a non-finite value.
    pub ignored: Vec<AnswerId>,
}

/// Apply grade overrides to a session's answers.
///
/// Each override is clamped into `[0, max_points]`. The answer counts as
/// correct only when it receives the full point value; partial credit keeps
/// its points but is marked incorrect. Answers without an override are left
/// untouched, and unknown ids are skipped rather than treated as errors.
pub fn regrade(existing: &[AnswerRecord], overrides: &HashMap<AnswerId, f64>) -> RegradeOutcome {
    let mut answers = existing.to_vec();
    for answer in &mut answers {
        let Some(&points) = overrides.get(&answer.id) else {
            continue;
        };
        if !points.is_finite() {
            continue;
        }
        apply_override(answer, points);
    }

    RegradeOutcome {
        session_score: session_score(&answers),
        ignored: ignored_overrides(existing, overrides),
        answers,
    }
}

/// Override ids that [`regrade`] skips: unknown answer ids and non-finite
/// values, in ascending order.
pub fn ignored_overrides(
    answers: &[AnswerRecord],
    overrides: &HashMap<AnswerId, f64>,
) -> Vec<AnswerId> {
    let mut ignored: Vec<AnswerId> = overrides
        .iter()
        .filter(|(id, points)| !points.is_finite() || !answers.iter().any(|a| a.id == **id))
        .map(|(id, _)| *id)
        .collect();
    ignored.sort_unstable();
    ignored
}

fn apply_override(answer: &mut AnswerRecord, points: f64) {
    let max = answer.max_points.max(0.0);
    let awarded = points.clamp(0.0, max);
    answer.points_earned = awarded;
    answer.correctness = Correctness::from_bool(awarded == max);
}

/// Total earned points of a session.
pub fn session_score(answers: &[AnswerRecord]) -> f64 {
    answers.iter().map(|a| a.points_earned).sum()
}
