//! Respondent identity and the attempt-limiting policy.

use serde::{Deserialize, Serialize};

use crate::error::SubmitError;
use crate::model::{Respondent, TestDefinition, UserId};

/// Longest accepted guest display name, in characters.
pub const MAX_GUEST_NAME_CHARS: usize = 100;

/// Identity supplied by the request layer for a single call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Authenticated user, if logged in.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Display name typed in by a guest.
    #[serde(default)]
    pub guest_name: Option<String>,
}

impl RequestContext {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            guest_name: None,
        }
    }

    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            guest_name: Some(name.into()),
        }
    }

    /// Resolve who is answering. A logged-in user wins over a guest name.
    pub fn respondent(&self) -> Result<Respondent, SubmitError> {
        if let Some(id) = self.user_id {
            return Ok(Respondent::User(id));
        }
        let name = self
            .guest_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if name.is_empty() {
            return Err(SubmitError::InvalidRespondent(
                "a user id or guest name is required".into(),
            ));
        }
        if name.chars().count() > MAX_GUEST_NAME_CHARS {
            return Err(SubmitError::InvalidRespondent(format!(
                "guest name longer than {MAX_GUEST_NAME_CHARS} characters"
            )));
        }
        Ok(Respondent::Guest(name.to_string()))
    }
}

/// Maximum number of sessions a respondent may record for one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptPolicy {
    /// 0 means unlimited.
    pub max_attempts: u32,
}

impl AttemptPolicy {
    pub fn for_test(test: &TestDefinition) -> Self {
        Self {
            max_attempts: test.max_attempts,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.max_attempts == 0
    }

    /// Whether another attempt is allowed after `used` prior sessions.
    pub fn allows(&self, used: u32) -> bool {
        self.is_unlimited() || used < self.max_attempts
    }

    pub fn check(&self, used: u32) -> Result<(), SubmitError> {
        if self.allows(used) {
            Ok(())
        } else {
            Err(SubmitError::AttemptLimitReached {
                limit: self.max_attempts,
                used,
            })
        }
    }
}
