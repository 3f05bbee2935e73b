//! TOML test-definition parser.
//!
//! Loads tests from TOML files and directories, resolves them by access code,
//! and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, QuestionOption, QuestionType, TestDefinition};

/// Intermediate TOML structure for parsing test files.
#[derive(Debug, Deserialize)]
struct TomlTestFile {
    test: TomlTestHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    id: u64,
    title: String,
    #[serde(default)]
    description: String,
    access_code: String,
    #[serde(default = "default_true")]
    is_public: bool,
    #[serde(default)]
    show_answers: bool,
    #[serde(default)]
    max_attempts: u32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u64,
    #[serde(rename = "type", default = "default_question_type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default = "default_points")]
    points: f64,
    #[serde(default)]
    order: i32,
    /// Legacy flag turning an `ABC` question into multiple choice.
    #[serde(default)]
    is_multiple_choice: bool,
    #[serde(default)]
    options: Vec<TomlOption>,
}

fn default_question_type() -> String {
    "ABC".to_string()
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: u64,
    text: String,
    #[serde(default)]
    is_correct: bool,
}

/// Map a type name to a [`QuestionType`], accepting the legacy `ABC`/`FILL`/`OPEN`.
fn resolve_question_type(name: &str, is_multiple_choice: bool) -> Result<QuestionType> {
    if name.eq_ignore_ascii_case("abc") {
        return Ok(if is_multiple_choice {
            QuestionType::MultipleChoice
        } else {
            QuestionType::SingleChoice
        });
    }
    name.parse().map_err(|e: String| anyhow::anyhow!("{}", e))
}

/// Parse a single TOML file into a `TestDefinition`.
pub fn parse_test(path: &Path) -> Result<TestDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file: {}", path.display()))?;

    parse_test_str(&content, path)
}

/// Parse a TOML string into a `TestDefinition` (useful for testing).
pub fn parse_test_str(content: &str, source_path: &Path) -> Result<TestDefinition> {
    let parsed: TomlTestFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind = resolve_question_type(&q.kind, q.is_multiple_choice)
                .with_context(|| format!("question {} in {}", q.id, source_path.display()))?;
            anyhow::ensure!(
                q.points.is_finite(),
                "question {} in {}: points must be a finite number, got {}",
                q.id,
                source_path.display(),
                q.points
            );
            let options = q
                .options
                .into_iter()
                .map(|o| QuestionOption {
                    id: o.id,
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect();

            Ok(Question {
                id: q.id,
                kind,
                text: q.text,
                points: q.points,
                order: q.order,
                options,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TestDefinition {
        id: parsed.test.id,
        title: parsed.test.title,
        description: parsed.test.description,
        access_code: parsed.test.access_code,
        is_public: parsed.test.is_public,
        show_answers: parsed.test.show_answers,
        max_attempts: parsed.test.max_attempts,
        questions,
    })
}

/// Recursively load all `.toml` test files from a directory.
pub fn load_test_directory(dir: &Path) -> Result<Vec<TestDefinition>> {
    let mut tests = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            tests.extend(load_test_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_test(&path) {
                Ok(test) => tests.push(test),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(tests)
}

/// Load a single test file, or every test under a directory.
pub fn load_tests(path: &Path) -> Result<Vec<TestDefinition>> {
    if path.is_dir() {
        load_test_directory(path)
    } else {
        Ok(vec![parse_test(path)?])
    }
}

/// Find a test by its access code. Codes are compared exactly.
pub fn find_by_access_code<'a>(
    tests: &'a [TestDefinition],
    access_code: &str,
) -> Option<&'a TestDefinition> {
    tests.iter().find(|t| t.access_code == access_code)
}

/// A warning from test validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u64>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn test(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }

    fn question(id: u64, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id),
            message: message.into(),
        }
    }
}

/// Validate a test for common authoring mistakes.
pub fn validate_test(test: &TestDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if test.access_code.trim().is_empty() {
        warnings.push(ValidationWarning::test("access_code is empty"));
    }

    let mut seen_questions = HashSet::new();
    let mut seen_options = HashSet::new();
    for q in &test.questions {
        if !seen_questions.insert(q.id) {
            warnings.push(ValidationWarning::question(
                q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
        for o in &q.options {
            if !seen_options.insert(o.id) {
                warnings.push(ValidationWarning::question(
                    q.id,
                    format!("duplicate option ID: {}", o.id),
                ));
            }
        }

        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning::question(q.id, "question text is empty"));
        }
        if !q.points.is_finite() || q.points < 0.0 {
            warnings.push(ValidationWarning::question(
                q.id,
                format!("points must be a non-negative number, got {}", q.points),
            ));
        }

        let correct = q.options.iter().filter(|o| o.is_correct).count();
        match q.kind {
            QuestionType::SingleChoice | QuestionType::MultipleChoice if correct == 0 => {
                warnings.push(ValidationWarning::question(
                    q.id,
                    "choice question has no correct option",
                ));
            }
            QuestionType::SingleChoice if correct > 1 => {
                warnings.push(ValidationWarning::question(
                    q.id,
                    format!("single-choice question has {correct} correct options"),
                ));
            }
            QuestionType::FillInBlank if q.options.len() != 1 => {
                warnings.push(ValidationWarning::question(
                    q.id,
                    format!(
                        "fill-in-blank question needs exactly one option, has {}",
                        q.options.len()
                    ),
                ));
            }
            QuestionType::OpenEnded if !q.options.is_empty() => {
                warnings.push(ValidationWarning::question(
                    q.id,
                    "open-ended question options are ignored",
                ));
            }
            _ => {}
        }
    }

    warnings
}

/// Validate a set of tests that are served together.
pub fn validate_catalogue(tests: &[TestDefinition]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut codes = HashSet::new();
    let mut ids = HashSet::new();
    for t in tests {
        if !codes.insert(t.access_code.as_str()) {
            warnings.push(ValidationWarning::test(format!(
                "duplicate access code: {}",
                t.access_code
            )));
        }
        if !ids.insert(t.id) {
            warnings.push(ValidationWarning::test(format!("duplicate test ID: {}", t.id)));
        }
    }
    warnings
}
