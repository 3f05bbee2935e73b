//! Storage trait for persisted test sessions.
//!
//! Implemented by the backends in the `quizforge-store` crate. Every
//! mutating method must be atomic with respect to the others: the attempt
//! limit and the session score are only consistent if the store serialises
//! its read-modify-write sequences.

use async_trait::async_trait;

use crate::model::{NewSession, Respondent, SessionId, TestId, TestSession};

/// Outcome of [`SessionStore::insert_within_limit`].
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The session was stored with freshly assigned answer ids.
    Inserted(TestSession),
    /// The respondent already had `used` sessions for the test.
    LimitReached { used: u32 },
}

/// Backing store for sessions and their answers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    /// Number of sessions recorded for a respondent on a test.
    async fn count_attempts(&self, test_id: TestId, respondent: &Respondent) -> anyhow::Result<u32>;

    /// Count the respondent's sessions and insert the new one only if the
    /// count is below `max_attempts` (0 = unlimited), as a single atomic step.
    async fn insert_within_limit(
        &self,
        session: NewSession,
        max_attempts: u32,
    ) -> anyhow::Result<InsertOutcome>;

    /// Fetch one session.
    async fn get_session(&self, id: SessionId) -> anyhow::Result<Option<TestSession>>;

    /// Apply `update` to a session under the store's lock and persist the
    /// result. Returns `None` if the session does not exist.
    async fn modify_session(
        &self,
        id: SessionId,
        update: &(dyn for<'s> Fn(&'s mut TestSession) + Send + Sync),
    ) -> anyhow::Result<Option<TestSession>>;

    /// All sessions recorded for a test, oldest first.
    async fn sessions_for_test(&self, test_id: TestId) -> anyhow::Result<Vec<TestSession>>;
}
