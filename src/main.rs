//! Convoy CLI - resolve, generate and benchmark navigation scenarios.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use convoy::scenario::GenerateOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Convoy - deterministic navigation and collision resolution on a wrapped grid
#[derive(Parser, Debug)]
#[command(name = "convoy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log more to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve one turn described by a scenario file
    Resolve {
        /// Scenario file (.json)
        #[arg(required = true)]
        scenario: PathBuf,

        /// Output format: text, json, or wire
        #[arg(short, long, default_value = "text")]
        format: cli::ResolveFormat,

        /// Resolution budget in milliseconds (0 = unlimited, default: from scenario)
        #[arg(long)]
        budget_ms: Option<u64>,

        /// Print the board after resolution
        #[arg(long)]
        board: bool,
    },

    /// Generate a random scenario
    Generate {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Board width (default: 32)
        #[arg(long, default_value = "32")]
        width: i32,

        /// Board height (default: same as width)
        #[arg(long)]
        height: Option<i32>,

        /// Units per player (default: 12)
        #[arg(short, long, default_value = "12")]
        units: u32,

        /// Number of players, 2-4 (default: 2)
        #[arg(long, default_value = "2")]
        players: u8,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve many generated scenarios in parallel and aggregate statistics
    Bench {
        /// Number of scenarios (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each scenario)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Board width and height (default: 32)
        #[arg(long, default_value = "32")]
        width: i32,

        /// Units per player (default: 12)
        #[arg(short, long, default_value = "12")]
        units: u32,

        /// Number of players, 2-4 (default: 2)
        #[arg(long, default_value = "2")]
        players: u8,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BenchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Resolve {
            scenario,
            format,
            budget_ms,
            board,
        } => cli::resolve::execute(&scenario, format, budget_ms, board),

        Commands::Generate {
            seed,
            width,
            height,
            units,
            players,
            output,
        } => {
            let options = GenerateOptions {
                width,
                height: height.unwrap_or(width),
                players,
                units_per_player: units,
                ..GenerateOptions::default()
            };
            cli::generate::execute(seed, options, output.as_deref())
        }

        Commands::Bench {
            games,
            seed,
            width,
            units,
            players,
            threads,
            format,
            progress,
        } => {
            let options = GenerateOptions {
                width,
                height: width,
                players,
                units_per_player: units,
                ..GenerateOptions::default()
            };
            cli::bench::execute(games, seed, options, threads, format, progress)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
