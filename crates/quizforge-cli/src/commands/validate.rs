//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(test_path: PathBuf) -> Result<()> {
    let tests = quizforge_core::parser::load_tests(&test_path)?;

    let mut total_warnings = 0;

    for test in &tests {
        println!(
            "Test: {} [{}] ({} questions, {} points)",
            test.title,
            test.access_code,
            test.questions.len(),
            test.max_points()
        );

        let warnings = quizforge_core::parser::validate_test(test);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [q{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    let catalogue = quizforge_core::parser::validate_catalogue(&tests);
    for w in &catalogue {
        println!("  WARNING: {}", w.message);
    }
    total_warnings += catalogue.len();

    if total_warnings == 0 {
        println!("All tests valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
