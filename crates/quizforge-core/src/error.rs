//! Engine error types.
//!
//! Scoring itself never fails; these cover the policy rejections and the
//! opaque store failures surfaced by [`crate::engine::QuizEngine`].

use thiserror::Error;

use crate::model::SessionId;

/// Errors returned when submitting a test.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The respondent has already used every allowed attempt.
    #[error("attempt limit reached: {used} of {limit} attempts used")]
    AttemptLimitReached { limit: u32, used: u32 },

    /// Neither a user id nor a usable guest name was supplied.
    #[error("invalid respondent: {0}")]
    InvalidRespondent(String),

    /// The session store failed.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl SubmitError {
    /// Returns `true` for policy rejections, as opposed to store failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SubmitError::AttemptLimitReached { .. } | SubmitError::InvalidRespondent(_)
        )
    }
}

/// Errors returned when grading a session.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
