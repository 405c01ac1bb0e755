//! mockexam CLI: timed multiple-choice exams in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "mockexam", version, about = "Timed multiple-choice mock exams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam, resuming one in progress
    Run {
        /// Question bank: a JSON file path or an http(s) URL
        #[arg(long)]
        questions: Option<String>,

        /// Shuffle with a fixed seed for a reproducible question order
        #[arg(long)]
        seed: Option<u32>,

        /// Directory for reports written after submission
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// File holding the persisted exam clock
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a question bank for authoring mistakes
    Validate {
        /// Path to the question bank JSON file
        #[arg(long, default_value = "questions.json")]
        questions: PathBuf,
    },

    /// Show the time left on the exam in progress
    Status {
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Discard the clock of the exam in progress
    Reset {
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mockexam=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            questions,
            seed,
            output,
            format,
            state_file,
            config,
        } => {
            commands::run::execute(commands::run::RunOptions {
                questions,
                seed,
                output,
                format,
                config,
                state_file,
            })
            .await
        }
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Status { state_file, config } => commands::status::execute(config, state_file),
        Commands::Reset { state_file, config } => commands::reset::execute(config, state_file),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
