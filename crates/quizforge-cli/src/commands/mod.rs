//! Subcommand implementations and the helpers they share.

pub mod grade;
pub mod init;
pub mod stats;
pub mod submit;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use quizforge_core::model::TestDefinition;
use quizforge_core::{parser, QuizEngine};
use quizforge_store::{create_store, load_config_from};

/// Pick one test out of a file or directory.
///
/// With an access code the test must match it exactly. Without one the path
/// must hold a single public test.
pub(crate) fn select_test(path: &Path, access_code: Option<&str>) -> Result<TestDefinition> {
    let mut tests = parser::load_tests(path)?;

    if let Some(code) = access_code {
        let test = parser::find_by_access_code(&tests, code)
            .cloned()
            .with_context(|| format!("no test with access code '{code}' in {}", path.display()))?;
        return Ok(test);
    }

    match tests.len() {
        0 => anyhow::bail!("no tests found in {}", path.display()),
        1 => {
            let test = tests.remove(0);
            anyhow::ensure!(
                test.is_public,
                "test '{}' is private; pass --access-code",
                test.title
            );
            Ok(test)
        }
        n => {
            let codes: Vec<&str> = tests.iter().map(|t| t.access_code.as_str()).collect();
            anyhow::bail!("{n} tests found; pass --access-code (one of {codes:?})")
        }
    }
}

/// Build an engine over the store named by the config.
pub(crate) async fn open_engine(config_path: Option<&Path>) -> Result<QuizEngine> {
    let config = load_config_from(config_path)?;
    let store = create_store(&config.store).await?;
    tracing::debug!(store = store.name(), "store ready");
    Ok(QuizEngine::new(store, config.engine_config()))
}

/// Read a JSON payload given inline or as a path to a file.
pub(crate) fn read_payload<T: DeserializeOwned>(arg: &str, what: &str) -> Result<T> {
    let trimmed = arg.trim_start();
    if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).with_context(|| format!("invalid {what} JSON"))
    } else {
        quizforge_core::report::load_json(&PathBuf::from(arg))
    }
}
