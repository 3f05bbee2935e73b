//! Core data model types for quizforge.
//!
//! These are the fundamental types shared by the evaluator, the grading
//! reconciler, the session stores, and the CLI: test definitions, questions,
//! options, submissions, and persisted sessions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TestId = u64;
pub type QuestionId = u64;
pub type OptionId = u64;
pub type AnswerId = u64;
pub type UserId = u64;
pub type SessionId = Uuid;

/// A test that respondents take via its access code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Numeric identifier.
    pub id: TestId,
    /// Human-readable title.
    pub title: String,
    /// Description shown to respondents.
    #[serde(default)]
    pub description: String,
    /// Opaque code respondents use to open the test.
    pub access_code: String,
    /// Whether the test is listed publicly.
    #[serde(default = "default_true")]
    pub is_public: bool,
    /// Whether answer keys are revealed in evaluation results.
    #[serde(default)]
    pub show_answers: bool,
    /// Maximum sessions per respondent (0 = unlimited).
    #[serde(default)]
    pub max_attempts: u32,
    /// Questions in evaluation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl TestDefinition {
    /// Sum of every question's point value.
    pub fn max_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// Whether any question needs a human grader.
    pub fn has_open_questions(&self) -> bool {
        self.questions
            .iter()
            .any(|q| q.kind == QuestionType::OpenEnded)
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

fn default_true() -> bool {
    true
}

/// A single question inside a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub text: String,
    /// Points awarded for a correct answer.
    #[serde(default = "default_points")]
    pub points: f64,
    /// Position of the question inside its test.
    #[serde(default)]
    pub order: i32,
    /// Choice options, or the canonical answer for fill-in-blank.
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Option ids flagged as correct.
    pub fn correct_option_ids(&self) -> Vec<OptionId> {
        self.options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.id)
            .collect()
    }

    /// The canonical fill-in-blank answer: the first option's text.
    pub fn canonical_answer(&self) -> Option<&str> {
        self.options.first().map(|o| o.text.as_str())
    }
}

fn default_points() -> f64 {
    1.0
}

/// An answer option of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    FillInBlank,
    OpenEnded,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::SingleChoice => write!(f, "single_choice"),
            QuestionType::MultipleChoice => write!(f, "multiple_choice"),
            QuestionType::FillInBlank => write!(f, "fill_in_blank"),
            QuestionType::OpenEnded => write!(f, "open_ended"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single_choice" | "single" => Ok(QuestionType::SingleChoice),
            "multiple_choice" | "multiple" => Ok(QuestionType::MultipleChoice),
            "fill_in_blank" | "fill" => Ok(QuestionType::FillInBlank),
            "open_ended" | "open" => Ok(QuestionType::OpenEnded),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A respondent's raw answers, keyed by question id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub answers: HashMap<QuestionId, serde_json::Value>,
}

impl Submission {
    pub fn answer(&self, question_id: QuestionId) -> Option<&serde_json::Value> {
        self.answers.get(&question_id)
    }
}

/// Manual grade overrides, keyed by answer id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeRequest {
    #[serde(default)]
    pub grades: HashMap<AnswerId, f64>,
}

/// Auto-grading verdict for one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correctness {
    Correct,
    Incorrect,
    /// Awaiting a human grader.
    Pending,
}

impl Correctness {
    pub fn from_bool(correct: bool) -> Self {
        if correct {
            Correctness::Correct
        } else {
            Correctness::Incorrect
        }
    }
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correctness::Correct => write!(f, "correct"),
            Correctness::Incorrect => write!(f, "incorrect"),
            Correctness::Pending => write!(f, "pending"),
        }
    }
}

/// Who took a test, for attempt counting and leaderboards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Respondent {
    User(UserId),
    Guest(String),
}

impl fmt::Display for Respondent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Respondent::User(id) => write!(f, "user #{id}"),
            Respondent::Guest(name) => write!(f, "{name}"),
        }
    }
}

/// A persisted answer inside a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: AnswerId,
    pub question_id: QuestionId,
    /// The raw submitted value (null when unanswered).
    #[serde(default)]
    pub response: serde_json::Value,
    pub correctness: Correctness,
    pub points_earned: f64,
    /// Snapshot of the question's point value at submission time.
    pub max_points: f64,
}

/// A completed attempt at a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSession {
    pub id: SessionId,
    pub test_id: TestId,
    pub respondent: Respondent,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub answers: Vec<AnswerRecord>,
    pub score: f64,
}

impl TestSession {
    pub fn max_points(&self) -> f64 {
        self.answers.iter().map(|a| a.max_points).sum()
    }

    pub fn requires_grading(&self) -> bool {
        self.answers
            .iter()
            .any(|a| a.correctness == Correctness::Pending)
    }
}

/// A session as handed to the store, before answer ids are assigned.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub test_id: TestId,
    pub respondent: Respondent,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub answers: Vec<NewAnswer>,
    pub score: f64,
}

/// An answer inside a [`NewSession`].
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: QuestionId,
    pub response: serde_json::Value,
    pub correctness: Correctness,
    pub points_earned: f64,
    pub max_points: f64,
}

impl NewAnswer {
    pub fn into_record(self, id: AnswerId) -> AnswerRecord {
        AnswerRecord {
            id,
            question_id: self.question_id,
            response: self.response,
            correctness: self.correctness,
            points_earned: self.points_earned,
            max_points: self.max_points,
        }
    }
}
