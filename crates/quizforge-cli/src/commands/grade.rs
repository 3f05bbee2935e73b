//! The `quizforge grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use uuid::Uuid;

use quizforge_core::model::GradeRequest;
use quizforge_core::report::GradeResponse;

pub async fn execute(session: String, grades: String, config_path: Option<PathBuf>) -> Result<()> {
    let session_id = Uuid::parse_str(session.trim())
        .with_context(|| format!("invalid session id: '{session}'"))?;
    let request: GradeRequest = super::read_payload(&grades, "grades")?;

    let engine = super::open_engine(config_path.as_deref()).await?;
    let outcome = engine.grade(session_id, &request.grades).await?;
    let response = GradeResponse::from(&outcome);

    let mut table = Table::new();
    table.set_header(vec!["Answer", "Question", "Result", "Points"]);
    for a in &response.answers {
        table.add_row(vec![
            Cell::new(a.answer_id),
            Cell::new(a.question_id),
            Cell::new(a.correctness),
            Cell::new(format!("{}/{}", a.points_earned, a.max_points)),
        ]);
    }
    eprintln!("\n{table}");
    eprintln!("Score: {}/{}", response.score, response.max_points);
    for id in &response.ignored {
        eprintln!("Warning: no answer with id {id} in this session, ignored.");
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
