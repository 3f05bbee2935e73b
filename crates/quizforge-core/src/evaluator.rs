//! Per-question answer evaluation.
//!
//! [`evaluate`] is a pure function over a question and the raw submitted
//! value. It never fails: missing or malformed answers are simply incorrect,
//! so every question in a test always yields a result.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Correctness, OptionId, Question, QuestionId, QuestionType, Submission, TestDefinition};
use crate::normalize::answers_match;
use crate::statistics::{aggregate, ScoreSummary};

/// Outcome of evaluating one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub question_id: QuestionId,
    pub question_type: QuestionType,
    /// The raw value that was evaluated (null when unanswered).
    #[serde(default)]
    pub response: Value,
    pub correctness: Correctness,
    pub points_earned: f64,
    pub max_points: f64,
    /// Only present when the test reveals its answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key: Option<AnswerKey>,
}

impl EvaluationResult {
    /// Attach the question's answer key to this result.
    pub fn with_answer_key(mut self, question: &Question) -> Self {
        self.answer_key = AnswerKey::for_question(question);
        self
    }
}

/// Answer-key data revealed alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerKey {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub correct_option_ids: Vec<OptionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_answer: Option<String>,
}

impl AnswerKey {
    /// Open-ended questions have no key.
    pub fn for_question(question: &Question) -> Option<Self> {
        match question.kind {
            QuestionType::SingleChoice | QuestionType::MultipleChoice => Some(AnswerKey {
                correct_option_ids: question.correct_option_ids(),
                canonical_answer: None,
            }),
            QuestionType::FillInBlank => Some(AnswerKey {
                correct_option_ids: Vec::new(),
                canonical_answer: question.canonical_answer().map(str::to_string),
            }),
            QuestionType::OpenEnded => None,
        }
    }
}

/// Evaluate a single submitted value against a question.
pub fn evaluate(question: &Question, submitted: Option<&Value>) -> EvaluationResult {
    let correctness = match question.kind {
        QuestionType::SingleChoice => Correctness::from_bool(single_choice_correct(question, submitted)),
        QuestionType::MultipleChoice => {
            Correctness::from_bool(multiple_choice_correct(question, submitted))
        }
        QuestionType::FillInBlank => Correctness::from_bool(fill_in_blank_correct(question, submitted)),
        QuestionType::OpenEnded => Correctness::Pending,
    };

    // Non-finite weights would poison every sum they reach.
    let max_points = if question.points.is_finite() {
        question.points.max(0.0)
    } else {
        0.0
    };
    let points_earned = match correctness {
        Correctness::Correct => max_points,
        Correctness::Incorrect | Correctness::Pending => 0.0,
    };

    EvaluationResult {
        question_id: question.id,
        question_type: question.kind,
        response: submitted.cloned().unwrap_or(Value::Null),
        correctness,
        points_earned,
        max_points,
        answer_key: None,
    }
}

fn single_choice_correct(question: &Question, submitted: Option<&Value>) -> bool {
    let Some(chosen) = submitted.and_then(option_id) else {
        return false;
    };
    question
        .options
        .iter()
        .any(|o| o.is_correct && o.id == chosen)
}

fn multiple_choice_correct(question: &Question, submitted: Option<&Value>) -> bool {
    let Some(chosen) = option_set(submitted) else {
        return false;
    };
    let expected: BTreeSet<OptionId> = question.correct_option_ids().into_iter().collect();
    chosen == expected
}

fn fill_in_blank_correct(question: &Question, submitted: Option<&Value>) -> bool {
    let (Some(text), Some(canonical)) = (submitted.and_then(answer_text), question.canonical_answer())
    else {
        return false;
    };
    // A blank answer counts as unanswered, even against a blank key.
    if text.trim().is_empty() {
        return false;
    }
    answers_match(&text, canonical)
}

/// Read an option id from a JSON number or numeric string.
///
/// Integral floats such as `5.0` are accepted, as JavaScript clients send them.
fn option_id(value: &Value) -> Option<OptionId> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral_id)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_id))
        }
        _ => None,
    }
}

fn integral_id(value: f64) -> Option<OptionId> {
    let in_range = value.is_finite() && value >= 0.0 && value < u64::MAX as f64;
    (in_range && value.fract() == 0.0).then_some(value as OptionId)
}

/// Coerce a submitted value into a set of option ids.
///
/// A scalar becomes a one-element set, absent or null the empty set. Returns
/// `None` when any element is not an option id.
fn option_set(value: Option<&Value>) -> Option<BTreeSet<OptionId>> {
    match value {
        None | Some(Value::Null) => Some(BTreeSet::new()),
        Some(Value::Array(items)) => items.iter().map(option_id).collect(),
        Some(other) => option_id(other).map(|id| BTreeSet::from([id])),
    }
}

fn answer_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Results of auto-grading a whole submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSubmission {
    /// One result per question, in test order.
    pub results: Vec<EvaluationResult>,
    pub summary: ScoreSummary,
}

impl ScoredSubmission {
    pub fn requires_grading(&self) -> bool {
        self.summary.requires_grading()
    }
}

/// Evaluate every question of a test and aggregate the results.
///
/// Answers keyed by ids that are not part of the test are ignored. Answer
/// keys are attached only when the test has `show_answers` set.
pub fn score_submission(test: &TestDefinition, submission: &Submission) -> ScoredSubmission {
    let mut questions: Vec<&Question> = test.questions.iter().collect();
    questions.sort_by_key(|q| q.order);

    let results: Vec<EvaluationResult> = questions
        .into_iter()
        .map(|q| {
            let result = evaluate(q, submission.answer(q.id));
            if test.show_answers {
                result.with_answer_key(q)
            } else {
                result
            }
        })
        .collect();

    let summary = aggregate(&results);
    ScoredSubmission { results, summary }
}
