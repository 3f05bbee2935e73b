//! Response payloads handed back to the request layer, with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::engine::{GradeOutcome, SubmitOutcome};
use crate::evaluator::EvaluationResult;
use crate::model::{AnswerId, AnswerRecord, Correctness, QuestionId, SessionId};
use crate::statistics::ScoreSummary;

/// Correctness counts reported under `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultStats {
    pub correct: usize,
    pub incorrect: usize,
    pub pending: usize,
}

impl From<&ScoreSummary> for ResultStats {
    fn from(summary: &ScoreSummary) -> Self {
        Self {
            correct: summary.correct_count,
            incorrect: summary.incorrect_count,
            pending: summary.pending_count,
        }
    }
}

/// Response to "submit test".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub session_id: SessionId,
    pub score: f64,
    pub max_points: f64,
    pub requires_grading: bool,
    pub stats: ResultStats,
    pub results_details: Vec<EvaluationResult>,
}

impl From<&SubmitOutcome> for SubmitResponse {
    fn from(outcome: &SubmitOutcome) -> Self {
        let summary = &outcome.scored.summary;
        Self {
            session_id: outcome.session.id,
            score: outcome.session.score,
            max_points: summary.max_points,
            requires_grading: summary.requires_grading(),
            stats: ResultStats::from(summary),
            results_details: outcome.scored.results.clone(),
        }
    }
}

/// One answer as reported after grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub answer_id: AnswerId,
    pub question_id: QuestionId,
    pub correctness: Correctness,
    pub points_earned: f64,
    pub max_points: f64,
}

impl From<&AnswerRecord> for GradedAnswer {
    fn from(a: &AnswerRecord) -> Self {
        Self {
            answer_id: a.id,
            question_id: a.question_id,
            correctness: a.correctness,
            points_earned: a.points_earned,
            max_points: a.max_points,
        }
    }
}

/// Response to "grade session".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResponse {
    pub session_id: SessionId,
    pub score: f64,
    pub max_points: f64,
    pub requires_grading: bool,
    pub answers: Vec<GradedAnswer>,
    /// Override ids that matched no answer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<AnswerId>,
}

impl From<&GradeOutcome> for GradeResponse {
    fn from(outcome: &GradeOutcome) -> Self {
        let session = &outcome.session;
        Self {
            session_id: session.id,
            score: session.score,
            max_points: session.max_points(),
            requires_grading: session.requires_grading(),
            answers: session.answers.iter().map(GradedAnswer::from).collect(),
            ignored: outcome.ignored.clone(),
        }
    }
}

/// Save any response as pretty-printed JSON.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize response")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write response to {}", path.display()))?;
    Ok(())
}

/// Load a JSON payload (submission, grades, or saved response) from a file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ScoredSubmission;
    use crate::model::{QuestionType, Respondent, Submission, TestSession};
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn outcome() -> SubmitOutcome {
        let results = vec![EvaluationResult {
            question_id: 1,
            question_type: QuestionType::OpenEnded,
            response: json!("essay"),
            correctness: Correctness::Pending,
            points_earned: 0.0,
            max_points: 3.0,
            answer_key: None,
        }];
        let summary = crate::statistics::aggregate(&results);
        SubmitOutcome {
            session: TestSession {
                id: Uuid::nil(),
                test_id: 1,
                respondent: Respondent::Guest("Ala".into()),
                started_at: Utc::now(),
                finished_at: Utc::now(),
                answers: vec![AnswerRecord {
                    id: 7,
                    question_id: 1,
                    response: json!("essay"),
                    correctness: Correctness::Pending,
                    points_earned: 0.0,
                    max_points: 3.0,
                }],
                score: 0.0,
            },
            scored: ScoredSubmission { results, summary },
        }
    }

    #[test]
    fn submit_response_uses_wire_field_names() {
        let value = serde_json::to_value(SubmitResponse::from(&outcome())).unwrap();
        assert_eq!(value["score"], json!(0.0));
        assert_eq!(value["maxPoints"], json!(3.0));
        assert_eq!(value["requiresGrading"], json!(true));
        assert_eq!(value["stats"], json!({"correct": 0, "incorrect": 0, "pending": 1}));
        assert_eq!(value["resultsDetails"][0]["correctness"], json!("pending"));
        assert_eq!(value["resultsDetails"][0]["questionId"], json!(1));
        assert!(value["resultsDetails"][0].get("answerKey").is_none());
    }

    #[test]
    fn grade_response_reports_answers() {
        let submitted = outcome();
        let graded = GradeOutcome {
            session: submitted.session,
            ignored: vec![42],
        };
        let value = serde_json::to_value(GradeResponse::from(&graded)).unwrap();
        assert_eq!(value["answers"][0]["answerId"], json!(7));
        assert_eq!(value["ignored"], json!([42]));
        assert_eq!(value["requiresGrading"], json!(true));
    }

    #[test]
    fn json_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/response.json");
        let response = SubmitResponse::from(&outcome());
        save_json(&response, &path).unwrap();
        let loaded: SubmitResponse = load_json(&path).unwrap();
        assert_eq!(loaded.session_id, Uuid::nil());
        assert_eq!(loaded.results_details.len(), 1);

        std::fs::write(dir.path().join("answers.json"), r#"{"answers": {"1": 5}}"#).unwrap();
        let submission: Submission = load_json(&dir.path().join("answers.json")).unwrap();
        assert_eq!(submission.answer(1), Some(&json!(5)));
    }
}
