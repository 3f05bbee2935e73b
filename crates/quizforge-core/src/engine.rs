//! Submission and grading orchestrator.
//!
//! Wraps the pure evaluator, aggregator, and reconciler around a
//! [`SessionStore`], enforcing the attempt limit with the store's atomic
//! count-and-insert.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::attempts::{AttemptPolicy, RequestContext};
use crate::error::{GradeError, SubmitError};
use crate::evaluator::{score_submission, ScoredSubmission};
use crate::grading::{ignored_overrides, regrade, RegradeOutcome};
use crate::model::{
    AnswerId, NewAnswer, NewSession, Respondent, SessionId, Submission, TestDefinition, TestSession,
};
use crate::statistics::{compute_test_stats, leaderboard, LeaderboardEntry, TestStats};
use crate::traits::{InsertOutcome, SessionStore};

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Rows returned by [`QuizEngine::leaderboard`].
    pub leaderboard_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            leaderboard_size: 10,
        }
    }
}

/// A recorded submission together with its evaluation.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub session: TestSession,
    pub scored: ScoredSubmission,
}

/// A session after manual grading.
#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub session: TestSession,
    /// Override ids that matched nothing.
    pub ignored: Vec<AnswerId>,
}

/// The central quiz engine.
pub struct QuizEngine {
    store: Arc<dyn SessionStore>,
    config: EngineConfig,
}

impl QuizEngine {
    pub fn new(store: Arc<dyn SessionStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Evaluate and record a submission.
    ///
    /// The attempt limit is checked before anything is evaluated, then
    /// enforced again atomically when the session is inserted, so concurrent
    /// submissions cannot overshoot it. A rejected submission leaves no
    /// session behind.
    pub async fn submit(
        &self,
        test: &TestDefinition,
        ctx: &RequestContext,
        submission: &Submission,
    ) -> Result<SubmitOutcome, SubmitError> {
        let started_at = Utc::now();
        let respondent = ctx.respondent()?;
        let policy = AttemptPolicy::for_test(test);

        if !policy.is_unlimited() {
            let used = self.store.count_attempts(test.id, &respondent).await?;
            if let Err(e) = policy.check(used) {
                tracing::info!(test_id = test.id, %respondent, used, "submission rejected before evaluation");
                return Err(e);
            }
        }

        let scored = score_submission(test, submission);
        let new_session = build_session(test, respondent.clone(), &scored, started_at, Utc::now());

        match self
            .store
            .insert_within_limit(new_session, policy.max_attempts)
            .await?
        {
            InsertOutcome::Inserted(session) => {
                tracing::info!(
                    test_id = test.id,
                    session_id = %session.id,
                    score = session.score,
                    requires_grading = scored.requires_grading(),
                    "submission recorded"
                );
                Ok(SubmitOutcome { session, scored })
            }
            InsertOutcome::LimitReached { used } => {
                tracing::info!(test_id = test.id, %respondent, used, "submission rejected at insert");
                Err(SubmitError::AttemptLimitReached {
                    limit: policy.max_attempts,
                    used,
                })
            }
        }
    }

    /// Apply manual grades to a session and recompute its score.
    pub async fn grade(
        &self,
        session_id: SessionId,
        grades: &HashMap<AnswerId, f64>,
    ) -> Result<GradeOutcome, GradeError> {
        let update = |session: &mut TestSession| {
            let RegradeOutcome {
                answers,
                session_score,
                ..
            } = regrade(&session.answers, grades);
            session.answers = answers;
            session.score = session_score;
        };

        let session = self
            .store
            .modify_session(session_id, &update)
            .await?
            .ok_or(GradeError::SessionNotFound(session_id))?;

        // Regrading never changes answer ids, so the stored session decides.
        let ignored = ignored_overrides(&session.answers, grades);
        if !ignored.is_empty() {
            tracing::warn!(%session_id, ?ignored, "grade overrides matched no answer");
        }
        tracing::info!(%session_id, score = session.score, "session graded");

        Ok(GradeOutcome { session, ignored })
    }

    pub async fn session(&self, session_id: SessionId) -> anyhow::Result<Option<TestSession>> {
        self.store.get_session(session_id).await
    }

    /// Statistics across every recorded session of a test.
    pub async fn test_stats(&self, test: &TestDefinition) -> anyhow::Result<TestStats> {
        let sessions = self.store.sessions_for_test(test.id).await?;
        Ok(compute_test_stats(test, &sessions))
    }

    pub async fn leaderboard(&self, test: &TestDefinition) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let sessions = self.store.sessions_for_test(test.id).await?;
        Ok(leaderboard(&sessions, self.config.leaderboard_size))
    }
}

fn build_session(
    test: &TestDefinition,
    respondent: Respondent,
    scored: &ScoredSubmission,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> NewSession {
    let answers = scored
        .results
        .iter()
        .map(|r| NewAnswer {
            question_id: r.question_id,
            response: r.response.clone(),
            correctness: r.correctness,
            points_earned: r.points_earned,
            max_points: r.max_points,
        })
        .collect();

    NewSession {
        test_id: test.id,
        respondent,
        started_at,
        finished_at,
        answers,
        score: scored.summary.total_score,
    }
}
