//! In-memory session table shared by every backend.
//!
//! Backends wrap a [`SessionTable`] in a lock; each method here is one
//! indivisible step as long as the caller holds that lock.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quizforge_core::model::{NewSession, Respondent, SessionId, TestId, TestSession};
use quizforge_core::traits::InsertOutcome;

use crate::error::StoreError;

/// All recorded sessions plus the answer id counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTable {
    /// Next answer id to hand out.
    #[serde(default = "first_answer_id")]
    pub next_answer_id: u64,
    /// Sessions in insertion order.
    #[serde(default)]
    pub sessions: Vec<TestSession>,
}

fn first_answer_id() -> u64 {
    1
}

impl Default for SessionTable {
    fn default() -> Self {
        Self {
            next_answer_id: first_answer_id(),
            sessions: Vec::new(),
        }
    }
}

impl SessionTable {
    pub fn count_attempts(&self, test_id: TestId, respondent: &Respondent) -> u32 {
        let count = self
            .sessions
            .iter()
            .filter(|s| s.test_id == test_id && &s.respondent == respondent)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Insert `session` unless the respondent already used `max_attempts`.
    pub fn insert_within_limit(
        &mut self,
        session: NewSession,
        max_attempts: u32,
    ) -> Result<InsertOutcome, StoreError> {
        if max_attempts > 0 {
            let used = self.count_attempts(session.test_id, &session.respondent);
            if used >= max_attempts {
                return Ok(InsertOutcome::LimitReached { used });
            }
        }

        let first = self.next_answer_id;
        let count = session.answers.len() as u64;
        self.next_answer_id = first.checked_add(count).ok_or(StoreError::IdOverflow)?;

        let answers = session
            .answers
            .into_iter()
            .zip(first..)
            .map(|(answer, id)| answer.into_record(id))
            .collect();

        let stored = TestSession {
            id: Uuid::new_v4(),
            test_id: session.test_id,
            respondent: session.respondent,
            started_at: session.started_at,
            finished_at: session.finished_at,
            answers,
            score: session.score,
        };
        self.sessions.push(stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }

    pub fn get(&self, id: SessionId) -> Option<&TestSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn modify(
        &mut self,
        id: SessionId,
        update: &(dyn for<'s> Fn(&'s mut TestSession) + Send + Sync),
    ) -> Option<TestSession> {
        let session = self.sessions.iter_mut().find(|s| s.id == id)?;
        update(session);
        Some(session.clone())
    }

    pub fn for_test(&self, test_id: TestId) -> Vec<TestSession> {
        self.sessions
            .iter()
            .filter(|s| s.test_id == test_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizforge_core::model::{Correctness, NewAnswer};
    use serde_json::json;

    fn new_session(test_id: TestId, respondent: Respondent, answers: usize) -> NewSession {
        NewSession {
            test_id,
            respondent,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            answers: (0..answers)
                .map(|i| NewAnswer {
                    question_id: i as u64,
                    response: json!(null),
                    correctness: Correctness::Incorrect,
                    points_earned: 0.0,
                    max_points: 1.0,
                })
                .collect(),
            score: 0.0,
        }
    }

    #[test]
    fn answer_ids_are_unique_across_sessions() {
        let mut table = SessionTable::default();
        let guest = Respondent::Guest("Ala".into());
        let InsertOutcome::Inserted(a) = table.insert_within_limit(new_session(1, guest.clone(), 2), 0).unwrap() else {
            panic!("expected insert");
        };
        let InsertOutcome::Inserted(b) = table.insert_within_limit(new_session(1, guest, 3), 0).unwrap() else {
            panic!("expected insert");
        };
        let ids: Vec<u64> = a.answers.iter().chain(&b.answers).map(|x| x.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(table.next_answer_id, 6);
    }

    #[test]
    fn limit_counts_per_test_and_respondent() {
        let mut table = SessionTable::default();
        let ala = Respondent::Guest("Ala".into());
        assert!(matches!(
            table.insert_within_limit(new_session(1, ala.clone(), 1), 1).unwrap(),
            InsertOutcome::Inserted(_)
        ));
        assert!(matches!(
            table.insert_within_limit(new_session(1, ala.clone(), 1), 1).unwrap(),
            InsertOutcome::LimitReached { used: 1 }
        ));
        // Other test, other respondent: unaffected.
        assert!(matches!(
            table.insert_within_limit(new_session(2, ala.clone(), 1), 1).unwrap(),
            InsertOutcome::Inserted(_)
        ));
        assert!(matches!(
            table.insert_within_limit(new_session(1, Respondent::User(1), 1), 1).unwrap(),
            InsertOutcome::Inserted(_)
        ));
        assert_eq!(table.count_attempts(1, &ala), 1);
        assert_eq!(table.sessions.len(), 3);
    }

    #[test]
    fn modify_missing_session() {
        let mut table = SessionTable::default();
        assert!(table.modify(Uuid::new_v4(), &|s: &mut TestSession| s.score = 1.0).is_none());
    }

    #[test]
    fn overflowing_ids_are_rejected() {
        let mut table = SessionTable {
            next_answer_id: u64::MAX,
            sessions: vec![],
        };
        let err = table
            .insert_within_limit(new_session(1, Respondent::User(1), 2), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::IdOverflow));
        assert!(table.sessions.is_empty());
    }
}
