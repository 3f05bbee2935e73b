//! End-to-end pipeline tests: submit → evaluate → record → grade → stats.
//!
//! These run the engine against both store backends, including concurrent
//! submissions racing the attempt limit.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use quizforge_core::model::{Correctness, Submission, TestDefinition};
use quizforge_core::parser::parse_test_str;
use quizforge_core::report::{GradeResponse, SubmitResponse};
use quizforge_core::{EngineConfig, GradeError, QuizEngine, RequestContext, SubmitError};
use quizforge_store::{JsonFileStore, MemoryStore};
use serde_json::json;
use uuid::Uuid;

const QUIZ: &str = r#"
[test]
id = 1
title = "Mixed"
access_code = "MIX"
max_attempts = 3

[[questions]]
id = 1
type = "single_choice"
text = "Pick five"
points = 2.0
order = 1

[[questions.options]]
id = 4
text = "four"

[[questions.options]]
id = 5
text = "five"
is_correct = true

[[questions]]
id = 2
type = "fill_in_blank"
text = "Capital of France"
points = 1.0
order = 2

[[questions.options]]
id = 6
text = "Paris"
is_correct = true

[[questions]]
id = 3
type = "open_ended"
text = "Explain"
points = 5.0
order = 3
"#;

fn quiz() -> TestDefinition {
    parse_test_str(QUIZ, Path::new("mixed.toml")).unwrap()
}

fn memory_engine() -> QuizEngine {
    QuizEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default())
}

fn submission(value: serde_json::Value) -> Submission {
    serde_json::from_value(json!({ "answers": value })).unwrap()
}

#[tokio::test]
async fn e2e_auto_graded_submission() {
    let engine = memory_engine();
    let mut test = quiz();
    test.questions.retain(|q| q.id != 3);

    let outcome = engine
        .submit(&test, &RequestContext::guest("Ala"), &submission(json!({"1": 5, "2": "paris"})))
        .await
        .unwrap();
    let response = SubmitResponse::from(&outcome);

    assert_eq!(response.score, 3.0);
    assert_eq!(response.max_points, 3.0);
    assert!(!response.requires_grading);
    assert_eq!(response.stats.correct, 2);
    assert_eq!(response.stats.incorrect, 0);
    assert_eq!(response.stats.pending, 0);
}

#[tokio::test]
async fn e2e_open_ended_then_grade() {
    let engine = memory_engine();
    let test = quiz();

    let outcome = engine
        .submit(
            &test,
            &RequestContext::user(42),
            &submission(json!({"1": 4, "2": "Paris", "3": "Because."})),
        )
        .await
        .unwrap();
    assert!(outcome.scored.requires_grading());
    assert_eq!(outcome.session.score, 1.0);

    let open = outcome
        .session
        .answers
        .iter()
        .find(|a| a.question_id == 3)
        .unwrap();
    assert_eq!(open.correctness, Correctness::Pending);

    // Partial credit: points kept, still not "correct".
    let grades = HashMap::from([(open.id, 2.5)]);
    let graded = engine.grade(outcome.session.id, &grades).await.unwrap();
    let response = GradeResponse::from(&graded);
    assert_eq!(response.score, 3.5);
    assert!(!response.requires_grading);
    assert!(response.ignored.is_empty());
    let open_after = graded
        .session
        .answers
        .iter()
        .find(|a| a.question_id == 3)
        .unwrap();
    assert_eq!(open_after.correctness, Correctness::Incorrect);
    assert_eq!(open_after.points_earned, 2.5);

    // Full credit flips it to correct.
    let graded = engine
        .grade(outcome.session.id, &HashMap::from([(open.id, 5.0)]))
        .await
        .unwrap();
    assert_eq!(graded.session.score, 6.0);

    // Regrading is idempotent.
    let again = engine
        .grade(outcome.session.id, &HashMap::from([(open.id, 5.0)]))
        .await
        .unwrap();
    assert_eq!(again.session.answers, graded.session.answers);
    assert_eq!(again.session.score, graded.session.score);

    let stored = engine.session(outcome.session.id).await.unwrap().unwrap();
    assert_eq!(stored.score, 6.0);
}

#[tokio::test]
async fn e2e_grade_reports_ignored_overrides() {
    let engine = memory_engine();
    let test = quiz();
    let outcome = engine
        .submit(&test, &RequestContext::guest("Ala"), &submission(json!({"3": "essay"})))
        .await
        .unwrap();
    let answer_id = |question| {
        outcome
            .session
            .answers
            .iter()
            .find(|a| a.question_id == question)
            .unwrap()
            .id
    };
    let open = answer_id(3);
    let fill = answer_id(2);
    let unknown = open + 1000;

    let grades = HashMap::from([(open, 3.0), (fill, f64::NAN), (unknown, 1.0)]);
    let graded = engine.grade(outcome.session.id, &grades).await.unwrap();

    let mut expected = vec![fill, unknown];
    expected.sort_unstable();
    assert_eq!(graded.ignored, expected);
    assert_eq!(graded.session.score, 3.0);
    assert_eq!(GradeResponse::from(&graded).ignored, expected);
}

#[tokio::test]
async fn e2e_grade_unknown_session() {
    let engine = memory_engine();
    let missing = Uuid::new_v4();
    let err = engine
        .grade(missing, &HashMap::from([(1, 1.0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, GradeError::SessionNotFound(id) if id == missing));
}

#[tokio::test]
async fn e2e_attempt_limit_sequential() {
    let engine = memory_engine();
    let test = quiz();
    let ctx = RequestContext::guest("Ola");
    let answers = submission(json!({}));

    for _ in 0..3 {
        engine.submit(&test, &ctx, &answers).await.unwrap();
    }
    let err = engine.submit(&test, &ctx, &answers).await.unwrap_err();
    assert!(matches!(
        err,
        SubmitError::AttemptLimitReached { limit: 3, used: 3 }
    ));
    assert_eq!(engine.store().sessions_for_test(test.id).await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn e2e_concurrent_submissions_respect_limit() {
    let engine = Arc::new(memory_engine());
    let test = Arc::new(quiz());

    let handles: Vec<_> = (0..24)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let test = Arc::clone(&test);
            tokio::spawn(async move {
                engine
                    .submit(
                        &test,
                        &RequestContext::guest("racer"),
                        &submission(json!({"1": 5})),
                    )
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    let mut rejected = 0;
    for result in futures::future::join_all(handles).await {
        match result.unwrap() {
            Ok(_) => accepted += 1,
            Err(SubmitError::AttemptLimitReached { limit: 3, .. }) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(rejected, 21);
    assert_eq!(engine.store().sessions_for_test(1).await.unwrap().len(), 3);
}

#[tokio::test]
async fn e2e_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    let test = quiz();

    let session_id = {
        let store = JsonFileStore::open(&path).await.unwrap();
        let engine = QuizEngine::new(Arc::new(store), EngineConfig::default());
        let outcome = engine
            .submit(&test, &RequestContext::guest("Ala"), &submission(json!({"3": "essay"})))
            .await
            .unwrap();
        let open = outcome.session.answers.iter().find(|a| a.question_id == 3).unwrap().id;
        engine
            .grade(outcome.session.id, &HashMap::from([(open, 5.0)]))
            .await
            .unwrap();
        outcome.session.id
    };

    let engine = QuizEngine::new(
        Arc::new(JsonFileStore::open(&path).await.unwrap()),
        EngineConfig::default(),
    );
    let session = engine.session(session_id).await.unwrap().unwrap();
    assert_eq!(session.score, 5.0);
    assert!(!session.requires_grading());

    let stats = engine.test_stats(&test).await.unwrap();
    assert_eq!(stats.session_count, 1);
    assert_eq!(stats.sessions_requiring_grading, 0);

    let board = engine.leaderboard(&test).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].score, 5.0);
}

#[tokio::test]
async fn e2e_infinite_weight_keeps_file_store_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    // Built in code, so the TOML parser's check does not apply.
    let mut test = quiz();
    test.questions.retain(|q| q.id == 1);
    test.questions[0].points = f64::INFINITY;

    let engine = QuizEngine::new(
        Arc::new(JsonFileStore::open(&path).await.unwrap()),
        EngineConfig::default(),
    );
    let outcome = engine
        .submit(&test, &RequestContext::guest("Ala"), &submission(json!({"1": 5})))
        .await
        .unwrap();
    assert_eq!(outcome.session.score, 0.0);
    drop(engine);

    let reopened = JsonFileStore::open(&path).await.unwrap();
    let engine = QuizEngine::new(Arc::new(reopened), EngineConfig::default());
    let stored = engine.session(outcome.session.id).await.unwrap().unwrap();
    assert!(stored.score.is_finite());
    engine
        .submit(&test, &RequestContext::guest("Ala"), &submission(json!({"1": 4})))
        .await
        .unwrap();
}

#[tokio::test]
async fn e2e_leaderboard_keeps_best_attempt() {
    let engine = memory_engine();
    let test = quiz();
    let ala = RequestContext::guest("Ala");
    let ola = RequestContext::guest("Ola");

    engine.submit(&test, &ala, &submission(json!({"1": 4}))).await.unwrap();
    engine.submit(&test, &ala, &submission(json!({"1": 5, "2": "paris"}))).await.unwrap();
    engine.submit(&test, &ola, &submission(json!({"1": 5}))).await.unwrap();

    let board = engine.leaderboard(&test).await.unwrap();
    let scores: Vec<(String, f64)> = board
        .iter()
        .map(|e| (e.respondent.to_string(), e.score))
        .collect();
    assert_eq!(
        scores,
        vec![("Ala".to_string(), 3.0), ("Ola".to_string(), 2.0)]
    );
}
