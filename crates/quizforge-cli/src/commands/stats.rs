//! The `quizforge stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub async fn execute(
    test_path: PathBuf,
    access_code: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let test = super::select_test(&test_path, access_code.as_deref())?;
    let engine = super::open_engine(config_path.as_deref()).await?;

    let stats = engine.test_stats(&test).await?;
    println!("Test: {} [{}]", test.title, test.access_code);
    println!(
        "Sessions: {}, average score {:.2}/{}, {} awaiting grading",
        stats.session_count,
        stats.average_score,
        stats.max_points,
        stats.sessions_requiring_grading
    );

    if stats.session_count == 0 {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Question",
        "Answered",
        "Correct",
        "Incorrect",
        "Pending",
        "Correct %",
        "Avg points",
    ]);
    for q in &stats.per_question {
        table.add_row(vec![
            Cell::new(q.question_id),
            Cell::new(q.answered),
            Cell::new(q.correct),
            Cell::new(q.incorrect),
            Cell::new(q.pending),
            Cell::new(format!("{:.1}%", q.correct_rate() * 100.0)),
            Cell::new(format!("{:.2}", q.average_points)),
        ]);
    }
    println!("\n{table}");

    let board = engine.leaderboard(&test).await?;
    let mut table = Table::new();
    table.set_header(vec!["#", "Respondent", "Score", "Finished"]);
    for (rank, entry) in board.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.respondent),
            Cell::new(entry.score),
            Cell::new(entry.finished_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    println!("\nLeaderboard\n{table}");

    Ok(())
}
