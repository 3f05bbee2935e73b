//! quizforge-core: Answer evaluation, scoring, and grading.
//!
//! This crate defines the data model, the pure evaluator, aggregator and
//! grading reconciler, the attempt-limit policy, and the engine that ties
//! them to a session store.

pub mod attempts;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod grading;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod traits;

pub use attempts::{AttemptPolicy, RequestContext};
pub use engine::{EngineConfig, GradeOutcome, QuizEngine, SubmitOutcome};
pub use error::{GradeError, SubmitError};
pub use evaluator::{evaluate, score_submission, EvaluationResult, ScoredSubmission};
pub use grading::{regrade, RegradeOutcome};
pub use statistics::{aggregate, ScoreSummary};
pub use traits::{InsertOutcome, SessionStore};
