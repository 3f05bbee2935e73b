//! quizforge-store: Session store backends.
//!
//! Implements the `SessionStore` trait for an in-process table and a
//! JSON-file-backed table, plus the configuration that selects between them.

pub mod config;
pub mod error;
pub mod json_file;
pub mod memory;
pub mod table;

pub use config::{create_store, load_config, load_config_from, QuizforgeConfig, StoreConfig};
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
