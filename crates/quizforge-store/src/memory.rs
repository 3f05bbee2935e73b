//! In-process session store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use quizforge_core::model::{NewSession, Respondent, SessionId, TestId, TestSession};
use quizforge_core::traits::{InsertOutcome, SessionStore};

use crate::table::SessionTable;

/// A session store that lives only as long as the process.
///
/// Every operation takes the same lock, so count-and-insert and regrades are
/// atomic with respect to each other.
#[derive(Default)]
pub struct MemoryStore {
    table: Mutex<SessionTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored sessions across all tests.
    pub async fn len(&self) -> usize {
        self.table.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn count_attempts(&self, test_id: TestId, respondent: &Respondent) -> anyhow::Result<u32> {
        Ok(self.table.lock().await.count_attempts(test_id, respondent))
    }

    async fn insert_within_limit(
        &self,
        session: NewSession,
        max_attempts: u32,
    ) -> anyhow::Result<InsertOutcome> {
        let mut table = self.table.lock().await;
        Ok(table.insert_within_limit(session, max_attempts)?)
    }

    async fn get_session(&self, id: SessionId) -> anyhow::Result<Option<TestSession>> {
        Ok(self.table.lock().await.get(id).cloned())
    }

    async fn modify_session(
        &self,
        id: SessionId,
        update: &(dyn for<'s> Fn(&'s mut TestSession) + Send + Sync),
    ) -> anyhow::Result<Option<TestSession>> {
        Ok(self.table.lock().await.modify(id, update))
    }

    async fn sessions_for_test(&self, test_id: TestId) -> anyhow::Result<Vec<TestSession>> {
        Ok(self.table.lock().await.for_test(test_id))
    }
}
