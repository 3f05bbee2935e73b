//! Score aggregation, per-test statistics, and leaderboards.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::EvaluationResult;
use crate::model::{Correctness, QuestionId, Respondent, TestDefinition, TestSession};

/// Totals for one evaluated submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_score: f64,
    pub max_points: f64,
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub pending_count: usize,
}

impl ScoreSummary {
    pub fn requires_grading(&self) -> bool {
        self.pending_count > 0
    }
}

/// Reduce per-question results into a [`ScoreSummary`].
///
/// `max_points` counts every question regardless of correctness. An empty
/// slice yields all zeros.
pub fn aggregate(results: &[EvaluationResult]) -> ScoreSummary {
    results
        .iter()
        .fold(ScoreSummary::default(), |mut summary, r| {
            summary.total_score += r.points_earned;
            summary.max_points += r.max_points;
            match r.correctness {
                Correctness::Correct => summary.correct_count += 1,
                Correctness::Incorrect => summary.incorrect_count += 1,
                Correctness::Pending => summary.pending_count += 1,
            }
            summary
        })
}

/// Author-facing statistics for one test across all its sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStats {
    pub test_id: u64,
    pub session_count: usize,
    pub average_score: f64,
    pub max_points: f64,
    /// Sessions that still hold at least one pending answer.
    pub sessions_requiring_grading: usize,
    /// In test order.
    pub per_question: Vec<QuestionStats>,
}

/// Statistics for a single question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub question_id: QuestionId,
    /// Sessions with a non-null response for this question.
    pub answered: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub pending: usize,
    pub average_points: f64,
}

impl QuestionStats {
    /// Share of graded answers that were correct.
    pub fn correct_rate(&self) -> f64 {
        let graded = self.correct + self.incorrect;
        if graded == 0 {
            0.0
        } else {
            self.correct as f64 / graded as f64
        }
    }
}

/// Compute statistics for a test from its recorded sessions.
///
/// Sessions belonging to other tests are skipped. Answers to questions that
/// no longer exist in the definition are not counted.
pub fn compute_test_stats(test: &TestDefinition, sessions: &[TestSession]) -> TestStats {
    let sessions: Vec<&TestSession> = sessions.iter().filter(|s| s.test_id == test.id).collect();

    let mut ordered: Vec<_> = test.questions.iter().collect();
    ordered.sort_by_key(|q| q.order);

    let mut per_question: Vec<QuestionStats> = ordered
        .iter()
        .map(|q| QuestionStats {
            question_id: q.id,
            ..Default::default()
        })
        .collect();
    let index: HashMap<QuestionId, usize> = per_question
        .iter()
        .enumerate()
        .map(|(i, s)| (s.question_id, i))
        .collect();

    let mut points_sum = vec![0.0f64; per_question.len()];
    for session in &sessions {
        for answer in &session.answers {
            let Some(&i) = index.get(&answer.question_id) else {
                continue;
            };
            let stats = &mut per_question[i];
            if !answer.response.is_null() {
                stats.answered += 1;
            }
            match answer.correctness {
                Correctness::Correct => stats.correct += 1,
                Correctness::Incorrect => stats.incorrect += 1,
                Correctness::Pending => stats.pending += 1,
            }
            points_sum[i] += answer.points_earned;
        }
    }

    let n = sessions.len();
    if n > 0 {
        for (stats, sum) in per_question.iter_mut().zip(&points_sum) {
            stats.average_points = sum / n as f64;
        }
    }

    let average_score = if n == 0 {
        0.0
    } else {
        sessions.iter().map(|s| s.score).sum::<f64>() / n as f64
    };

    TestStats {
        test_id: test.id,
        session_count: n,
        average_score,
        max_points: test.max_points(),
        sessions_requiring_grading: sessions.iter().filter(|s| s.requires_grading()).count(),
        per_question,
    }
}

/// One row of a test leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub respondent: Respondent,
    pub score: f64,
    pub finished_at: DateTime<Utc>,
}

/// Best score per respondent, highest first; ties go to the earlier finish.
pub fn leaderboard(sessions: &[TestSession], limit: usize) -> Vec<LeaderboardEntry> {
    let mut best: HashMap<&Respondent, &TestSession> = HashMap::new();
    for session in sessions {
        best.entry(&session.respondent)
            .and_modify(|current| {
                if session.score > current.score
                    || (session.score == current.score && session.finished_at < current.finished_at)
                {
                    *current = session;
                }
            })
            .or_insert(session);
    }

    let mut entries: Vec<LeaderboardEntry> = best
        .into_values()
        .map(|s| LeaderboardEntry {
            respondent: s.respondent.clone(),
            score: s.score,
            finished_at: s.finished_at,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.finished_at.cmp(&b.finished_at))
    });
    entries.truncate(limit);
    entries
}
