//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizforge_core::engine::EngineConfig;
use quizforge_core::traits::SessionStore;

use crate::error::StoreError;
use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;

/// Environment variable that forces a file store at the given path.
pub const STORE_PATH_ENV: &str = "QUIZFORGE_STORE_PATH";

/// Which session store backend to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Sessions live only for the lifetime of the process.
    Memory,
    /// Sessions are persisted to a JSON file.
    File { path: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./quizforge-data/sessions.json")
}

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Session store backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Number of entries shown on a leaderboard.
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

fn default_leaderboard_size() -> usize {
    10
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

impl QuizforgeConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            leaderboard_size: self.leaderboard_size,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string. Substituted values are not
/// expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// `QUIZFORGE_STORE_PATH` overrides the store with a file store at that path.
pub fn load_config() -> Result<QuizforgeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QuizforgeConfig::default(),
    };

    Ok(apply_overrides(config, std::env::var(STORE_PATH_ENV).ok()))
}

/// Apply the store path override, then resolve `${VAR}` references.
fn apply_overrides(mut config: QuizforgeConfig, store_path: Option<String>) -> QuizforgeConfig {
    if let Some(path) = store_path.filter(|p| !p.trim().is_empty()) {
        config.store = StoreConfig::File {
            path: PathBuf::from(path),
        };
    }

    if let StoreConfig::File { path } = &config.store {
        config.store = StoreConfig::File {
            path: resolve_path(path),
        };
    }
    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

/// Create a session store from its configuration.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn SessionStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::File { path } => {
            if path.as_os_str().is_empty() {
                return Err(StoreError::InvalidConfig("file store needs a path".into()).into());
            }
            Ok(Arc::new(JsonFileStore::open(path).await?))
        }
    }
}
