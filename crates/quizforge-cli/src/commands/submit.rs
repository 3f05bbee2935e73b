//! The `quizforge submit` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizforge_core::model::Submission;
use quizforge_core::report::{save_json, SubmitResponse};
use quizforge_core::RequestContext;

pub async fn execute(
    test_path: PathBuf,
    access_code: Option<String>,
    answers: String,
    user_id: Option<u64>,
    guest: Option<String>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let test = super::select_test(&test_path, access_code.as_deref())?;
    let submission: Submission = super::read_payload(&answers, "answers")?;
    let ctx = RequestContext {
        user_id,
        guest_name: guest,
    };

    let engine = super::open_engine(config_path.as_deref()).await?;
    let outcome = engine.submit(&test, &ctx, &submission).await?;
    let response = SubmitResponse::from(&outcome);

    print_summary(&test.title, &response);

    match output {
        Some(path) => {
            save_json(&response, &path)?;
            eprintln!("Response saved to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    Ok(())
}

fn print_summary(title: &str, response: &SubmitResponse) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Result", "Points"]);

    for r in &response.results_details {
        table.add_row(vec![
            Cell::new(r.question_id),
            Cell::new(r.question_type),
            Cell::new(r.correctness),
            Cell::new(format!("{}/{}", r.points_earned, r.max_points)),
        ]);
    }

    eprintln!("\n{title}\n{table}");
    eprintln!(
        "Score: {}/{} ({} correct, {} incorrect, {} pending)",
        response.score,
        response.max_points,
        response.stats.correct,
        response.stats.incorrect,
        response.stats.pending
    );
    if response.requires_grading {
        eprintln!("Session {} requires manual grading.", response.session_id);
    }
}
