//! quizforge CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "Quiz scoring and grading")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example test
    Init,

    /// Validate test definition TOML files
    Validate {
        /// Path to test file or directory
        #[arg(long)]
        test: PathBuf,
    },

    /// Score a submission and record the session
    Submit {
        /// Path to test file or directory
        #[arg(long)]
        test: PathBuf,

        /// Access code selecting the test
        #[arg(long)]
        access_code: Option<String>,

        /// Answers as inline JSON or a path to a JSON file
        #[arg(long)]
        answers: String,

        /// Authenticated user id
        #[arg(long, conflicts_with = "guest")]
        user_id: Option<u64>,

        /// Guest display name
        #[arg(long)]
        guest: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the JSON response here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Apply manual grades to a recorded session
    Grade {
        /// Session id
        #[arg(long)]
        session: String,

        /// Grades as inline JSON or a path to a JSON file
        #[arg(long)]
        grades: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show per-question statistics and the leaderboard
    Stats {
        /// Path to test file or directory
        #[arg(long)]
        test: PathBuf,

        /// Access code selecting the test
        #[arg(long)]
        access_code: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { test } => commands::validate::execute(test),
        Commands::Submit {
            test,
            access_code,
            answers,
            user_id,
            guest,
            config,
            output,
        } => {
            commands::submit::execute(test, access_code, answers, user_id, guest, config, output)
                .await
        }
        Commands::Grade {
            session,
            grades,
            config,
        } => commands::grade::execute(session, grades, config).await,
        Commands::Stats {
            test,
            access_code,
            config,
        } => commands::stats::execute(test, access_code, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
