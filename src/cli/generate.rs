//! Generate command implementation.

use super::{CliError, seed_or_clock};
use convoy::scenario::{GenerateOptions, generate_scenario};
use std::path::Path;
use tracing::info;

/// Execute the generate command.
///
/// # Errors
///
/// Returns an error if the options are invalid or the file cannot be written.
pub(crate) fn execute(
    seed: Option<u64>,
    options: GenerateOptions,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let seed = seed_or_clock(seed);
    let scenario = generate_scenario(seed, options)?;
    info!(seed, units = scenario.units.len(), "generated scenario");

    match output {
        Some(path) => {
            scenario
                .save(path)
                .map_err(|e| CliError::new(format!("Failed to write {}: {e}", path.display())))?;
            eprintln!("Wrote {} (seed {seed})", path.display());
        }
        None => println!("{}", scenario.to_json()?),
    }

    Ok(())
}
