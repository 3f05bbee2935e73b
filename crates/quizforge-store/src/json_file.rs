//! Session store persisted to a single JSON file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use quizforge_core::model::{NewSession, Respondent, SessionId, TestId, TestSession};
use quizforge_core::traits::{InsertOutcome, SessionStore};

use crate::error::StoreError;
use crate::table::SessionTable;

/// A session store backed by a JSON file.
///
/// The whole table is kept in memory and written through on every mutation.
/// Writes go to a sibling temp file that is then renamed over the store file,
/// and the in-memory table only changes once the write succeeded. Only one
/// process should open a given file at a time.
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<SessionTable>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => SessionTable::default(),
            Ok(content) => {
                serde_json::from_str::<SessionTable>(&content).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionTable::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read store: {}", path.display()))
            }
        };

        tracing::debug!(
            path = %path.display(),
            sessions = table.sessions.len(),
            "opened session store"
        );
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &SessionTable) -> Result<()> {
        let json = serde_json::to_string_pretty(table).context("failed to serialize store")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn count_attempts(&self, test_id: TestId, respondent: &Respondent) -> Result<u32> {
        Ok(self.table.lock().await.count_attempts(test_id, respondent))
    }

    async fn insert_within_limit(
        &self,
        session: NewSession,
        max_attempts: u32,
    ) -> Result<InsertOutcome> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        let outcome = next.insert_within_limit(session, max_attempts)?;
        if let InsertOutcome::Inserted(_) = outcome {
            self.persist(&next).await?;
            *table = next;
        }
        Ok(outcome)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<TestSession>> {
        Ok(self.table.lock().await.get(id).cloned())
    }

    async fn modify_session(
        &self,
        id: SessionId,
        update: &(dyn for<'s> Fn(&'s mut TestSession) + Send + Sync),
    ) -> Result<Option<TestSession>> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        let Some(updated) = next.modify(id, update) else {
            return Ok(None);
        };
        self.persist(&next).await?;
        *table = next;
        Ok(Some(updated))
    }

    async fn sessions_for_test(&self, test_id: TestId) -> Result<Vec<TestSession>> {
        Ok(self.table.lock().await.for_test(test_id))
    }
}
