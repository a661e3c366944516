//! Bench command implementation.

use super::output::{BenchStats, JsonBenchResult, format_bench_csv, format_bench_text};
use super::{BenchFormat, CliError, seed_or_clock};
use convoy::scenario::{GenerateOptions, generate_scenario};
use convoy::{Deadline, Navigator, ScenarioError, check_resolution};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

/// Generate, plan and resolve the scenario for one seed.
fn run_one(seed: u64, options: GenerateOptions, stats: &mut BenchStats) -> Result<(), ScenarioError> {
    let scenario = generate_scenario(seed, options)?;
    let mut board = scenario.build_board()?;
    let intents = scenario.plan(&board)?;
    let navigator = Navigator::new(scenario.config);

    let start = Instant::now();
    let resolution = navigator.plan_turn(&mut board, &intents, Deadline::none());
    let micros = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

    let violations = check_resolution(&board, &resolution);
    for violation in &violations {
        debug!(seed, "{violation}");
    }
    stats.add_resolution(intents.len(), &resolution, violations.len(), micros);
    Ok(())
}

/// Execute the bench command.
///
/// # Errors
///
/// Returns an error if the options are invalid or output fails.
pub(crate) fn execute(
    games: u64,
    seed: Option<u64>,
    options: GenerateOptions,
    threads: Option<usize>,
    format: BenchFormat,
    progress: bool,
) -> Result<(), CliError> {
    // Fail fast on options that can never generate.
    let base_seed = seed_or_clock(seed);
    generate_scenario(base_seed, options)?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scenarios ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates into its own BenchStats, merged at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(BenchStats::default, |mut local, i| {
            let game_seed = base_seed.wrapping_add(i);
            if let Err(e) = run_one(game_seed, options, &mut local) {
                debug!(seed = game_seed, "scenario failed: {e}");
                local.add_failure();
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(BenchStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let per_sec = if duration.as_secs_f64() > 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let scenarios = stats.scenarios as f64;
        scenarios / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BenchFormat::Text => {
            println!();
            print!("{}", format_bench_text(&stats));
            println!();
            println!("Duration: {:.2}s ({per_sec:.0} scenarios/sec)", duration.as_secs_f64());
        }
        BenchFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBenchResult::from_stats(&stats))?;
            println!("{json}");
        }
        BenchFormat::Csv => {
            print!("{}", format_bench_csv(&stats));
        }
    }

    if stats.violations > 0 {
        return Err(CliError::new(format!(
            "{} invariant violation(s) across {} scenarios",
            stats.violations, stats.scenarios
        )));
    }
    Ok(())
}
