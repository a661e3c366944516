//! Resolve command implementation.

use super::output::{JsonResolution, format_resolution_text, render_board};
use super::{CliError, ResolveFormat};
use convoy::{Navigator, Scenario, check_resolution, format_commands};
use std::path::Path;
use tracing::{info, warn};

/// Execute the resolve command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or the resolution
/// breaks an invariant.
pub(crate) fn execute(
    path: &Path,
    format: ResolveFormat,
    budget_ms: Option<u64>,
    show_board: bool,
) -> Result<(), CliError> {
    let mut scenario = Scenario::load(path)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))?;
    if let Some(ms) = budget_ms {
        scenario.config.turn_budget_ms = ms;
    }

    let navigator = Navigator::new(scenario.config);
    let deadline = navigator.deadline();

    let mut board = scenario.build_board()?;
    let intents = scenario.plan(&board)?;
    info!(
        units = board.my_units().count(),
        intents = intents.len(),
        "resolving {}",
        path.display()
    );

    let resolution = navigator.plan_turn(&mut board, &intents, deadline);
    let violations = check_resolution(&board, &resolution);
    for violation in &violations {
        warn!("{violation}");
    }

    match format {
        ResolveFormat::Text => {
            print!("{}", format_resolution_text(&resolution, &violations));
        }
        ResolveFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonResolution::from_resolution(
                &resolution,
                &violations,
            ))?;
            println!("{json}");
        }
        ResolveFormat::Wire => {
            println!("{}", format_commands(&resolution.commands));
        }
    }
    if show_board {
        println!();
        print!("{}", render_board(&board));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CliError::new(format!(
            "{} invariant violation(s) after resolution",
            violations.len()
        )))
    }
}
