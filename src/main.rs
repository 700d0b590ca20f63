//! Dicewalk CLI - run, replay and batch-simulate dice board sessions.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Dicewalk - a deterministic dice board session simulator
#[derive(Parser, Debug)]
#[command(name = "dicewalk")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a single session with the autoplayer
    Run {
        /// JSON config file (simulator or bare session rules)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum finished turns (overrides config)
        #[arg(short, long)]
        turns: Option<u32>,

        /// Maximum simulated seconds (overrides config)
        #[arg(long)]
        max_time: Option<f64>,

        /// Output format: text, json, or events
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save recording to file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Suppress progress messages
        #[arg(short, long)]
        quiet: bool,
    },

    /// Replay a recorded session
    Replay {
        /// Recording file (.json)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: text, json, or events
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many sessions in parallel and aggregate statistics
    Batch {
        /// JSON config file (simulator or bare session rules)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of sessions to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each session)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Maximum finished turns per session (overrides config)
        #[arg(short = 't', long)]
        max_turns: Option<u32>,

        /// Maximum simulated seconds per session (overrides config)
        #[arg(long)]
        max_time: Option<f64>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Check a config file for consistency
    Validate {
        /// JSON config file to validate
        #[arg(required = true)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            config,
            seed,
            turns,
            max_time,
            format,
            save,
            quiet,
        } => cli::run::execute(
            config.as_deref(),
            seed,
            turns,
            max_time,
            format,
            save.as_deref(),
            quiet,
        ),

        Commands::Replay { recording, format } => cli::replay::execute(&recording, format),

        Commands::Batch {
            config,
            games,
            seed,
            threads,
            max_turns,
            max_time,
            format,
            progress,
        } => cli::batch::execute(
            config.as_deref(),
            games,
            seed,
            threads,
            max_turns,
            max_time,
            format,
            progress,
        ),

        Commands::Validate { config } => cli::validate::execute(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
