//! The `quizforge init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizforge.toml
    if std::path::Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG)?;
        println!("Created quizforge.toml");
    }

    // Create example test
    std::fs::create_dir_all("tests")?;
    let example_path = std::path::Path::new("tests/example.toml");
    if example_path.exists() {
        println!("tests/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_TEST)?;
        println!("Created tests/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizforge validate --test tests/example.toml");
    println!(
        "  2. Run: quizforge submit --test tests/example.toml --guest Ala \
         --answers '{{\"answers\": {{\"1\": 5, \"2\": \"paris\"}}}}'"
    );
    println!("  3. Run: quizforge stats --test tests/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

leaderboard_size = 10

[store]
type = "file"
path = "./quizforge-data/sessions.json"
"#;

const EXAMPLE_TEST: &str = r#"[test]
id = 1
title = "Geography basics"
description = "A short example test to get started"
access_code = "GEO-101"
show_answers = true
max_attempts = 3

[[questions]]
id = 1
type = "single_choice"
text = "Which river flows through Kraków?"
points = 2.0
order = 1

[[questions.options]]
id = 4
text = "Oder"

[[questions.options]]
id = 5
text = "Vistula"
is_correct = true

[[questions]]
id = 2
type = "fill_in_blank"
text = "The capital of France is ___."
points = 1.0
order = 2

[[questions.options]]
id = 6
text = "Paris"
is_correct = true

[[questions]]
id = 3
type = "multiple_choice"
text = "Which of these are Baltic states?"
points = 2.0
order = 3

[[questions.options]]
id = 7
text = "Estonia"
is_correct = true

[[questions.options]]
id = 8
text = "Latvia"
is_correct = true

[[questions.options]]
id = 9
text = "Austria"

[[questions]]
id = 4
type = "open_ended"
text = "Describe the climate of the Tatra mountains."
points = 3.0
order = 4
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizforge.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();
        let config = quizforge_store::load_config_from(Some(&path)).unwrap();
        assert_eq!(config.leaderboard_size, 10);
    }

    #[test]
    fn example_test_is_clean() {
        let test = quizforge_core::parser::parse_test_str(
            EXAMPLE_TEST,
            std::path::Path::new("example.toml"),
        )
        .unwrap();
        assert!(quizforge_core::parser::validate_test(&test).is_empty());
    }
}
