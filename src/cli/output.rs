//! Output formatting utilities for CLI.

#![allow(clippy::cast_precision_loss)]

use std::fmt::Write as _;

use convoy::board::UnitId;
use convoy::{Board, Command, InvariantViolation, Resolution, StructureKind, Termination};
use serde::Serialize;

/// Short name of a termination.
const fn termination_name(termination: &Termination) -> &'static str {
    match termination {
        Termination::Converged => "converged",
        Termination::Deadlocked { .. } => "deadlocked",
        Termination::DeadlineExceeded { .. } => "deadline_exceeded",
    }
}

/// JSON-serializable resolution.
#[derive(Debug, Serialize)]
pub(super) struct JsonResolution {
    /// Protocol tokens, one per command.
    pub(super) commands: Vec<String>,
    /// Full protocol line.
    pub(super) wire: String,
    /// Why resolution stopped.
    pub(super) termination: &'static str,
    /// Units left without a command.
    pub(super) pending: Vec<UnitId>,
    /// Passes started.
    pub(super) passes: u32,
    /// Swaps executed.
    pub(super) swaps: u32,
    /// Invariant violations (empty when healthy).
    pub(super) violations: Vec<String>,
}

impl JsonResolution {
    /// Create from a Resolution.
    pub(super) fn from_resolution(resolution: &Resolution, violations: &[InvariantViolation]) -> Self {
        Self {
            commands: resolution.commands.iter().map(ToString::to_string).collect(),
            wire: convoy::format_commands(&resolution.commands),
            termination: termination_name(&resolution.termination),
            pending: resolution.termination.pending().to_vec(),
            passes: resolution.passes,
            swaps: resolution.swaps,
            violations: violations.iter().map(|v| v.message.clone()).collect(),
        }
    }
}

/// Format a resolution as human-readable text.
pub(super) fn format_resolution_text(resolution: &Resolution, violations: &[InvariantViolation]) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Resolution: {} ({} passes, {} swaps)",
        termination_name(&resolution.termination),
        resolution.passes,
        resolution.swaps
    );
    for command in &resolution.commands {
        match command {
            Command::Move { unit, direction } => {
                let _ = writeln!(output, "  unit {unit:>4}: {direction}");
            }
            other => {
                let _ = writeln!(output, "  {other}");
            }
        }
    }
    let pending = resolution.termination.pending();
    if !pending.is_empty() {
        let _ = writeln!(output, "  no command: {pending:?}");
    }
    for violation in violations {
        let _ = writeln!(output, "  {violation}");
    }

    output
}

/// Render the board as text, one character per cell.
///
/// `H`/`D` are our structures, `h`/`d` rival ones, `@` our units, `x` rival
/// units; otherwise the resource level from ` ` (none) to `#` (richest).
pub(super) fn render_board(board: &Board) -> String {
    const LEVELS: [char; 6] = [' ', '.', ':', '+', '*', '#'];
    let richest = board.cells().map(|(_, c)| c.resource).max().unwrap_or(0).max(1);
    let me = board.me();

    let mut output = String::new();
    for y in 0..board.height() {
        for x in 0..board.width() {
            let coord = convoy::Coord::new(x, y);
            let glyph = if let Some(unit) = board.occupant_of(coord) {
                if unit.owner == me { '@' } else { 'x' }
            } else if let Some(structure) = board.structure_at(coord) {
                match (structure.owner == me, structure.kind) {
                    (true, StructureKind::Shipyard) => 'H',
                    (true, StructureKind::Dropoff) => 'D',
                    (false, StructureKind::Shipyard) => 'h',
                    (false, StructureKind::Dropoff) => 'd',
                }
            } else {
                let resource = board.cell(coord).resource;
                let level = (u64::from(resource) * 5).div_ceil(u64::from(richest));
                LEVELS[usize::try_from(level).unwrap_or(5).min(5)]
            };
            output.push(glyph);
        }
        output.push('\n');
    }
    output
}

/// Aggregated statistics over many resolved scenarios.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct BenchStats {
    /// Scenarios resolved.
    pub(super) scenarios: u64,
    /// Scenarios that could not be generated or built.
    pub(super) failures: u64,
    /// Orders submitted.
    pub(super) orders: u64,
    /// Commands that move a unit.
    pub(super) moves: u64,
    /// Commands that hold a unit.
    pub(super) stays: u64,
    /// Swaps executed.
    pub(super) swaps: u64,
    /// Passes started.
    pub(super) passes: u64,
    /// Most passes in a single scenario.
    pub(super) max_passes: u32,
    /// Scenarios that converged.
    pub(super) converged: u64,
    /// Scenarios that deadlocked.
    pub(super) deadlocked: u64,
    /// Scenarios that ran out of time.
    pub(super) timed_out: u64,
    /// Units left without a command.
    pub(super) pending: u64,
    /// Invariant violations found.
    pub(super) violations: u64,
    /// Total resolution time in microseconds.
    total_micros: u64,
    /// Slowest resolution in microseconds.
    pub(super) max_micros: u64,
}

impl BenchStats {
    /// Add one resolved scenario.
    pub(super) fn add_resolution(
        &mut self,
        orders: usize,
        resolution: &Resolution,
        violations: usize,
        micros: u64,
    ) {
        self.scenarios += 1;
        self.orders += orders as u64;
        for command in &resolution.commands {
            match command.direction() {
                Some(direction) if direction.is_move() => self.moves += 1,
                Some(_) => self.stays += 1,
                None => {}
            }
        }
        self.swaps += u64::from(resolution.swaps);
        self.passes += u64::from(resolution.passes);
        self.max_passes = self.max_passes.max(resolution.passes);
        match resolution.termination {
            Termination::Converged => self.converged += 1,
            Termination::Deadlocked { .. } => self.deadlocked += 1,
            Termination::DeadlineExceeded { .. } => self.timed_out += 1,
        }
        self.pending += resolution.termination.pending().len() as u64;
        self.violations += violations as u64;
        self.total_micros += micros;
        self.max_micros = self.max_micros.max(micros);
    }

    /// Record a scenario that could not be run.
    pub(super) fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Merge another thread's stats into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.scenarios += other.scenarios;
        self.failures += other.failures;
        self.orders += other.orders;
        self.moves += other.moves;
        self.stays += other.stays;
        self.swaps += other.swaps;
        self.passes += other.passes;
        self.max_passes = self.max_passes.max(other.max_passes);
        self.converged += other.converged;
        self.deadlocked += other.deadlocked;
        self.timed_out += other.timed_out;
        self.pending += other.pending;
        self.violations += other.violations;
        self.total_micros += other.total_micros;
        self.max_micros = self.max_micros.max(other.max_micros);
    }

    /// Get average passes per scenario.
    pub(super) fn avg_passes(&self) -> f64 {
        if self.scenarios == 0 {
            return 0.0;
        }
        self.passes as f64 / self.scenarios as f64
    }

    /// Get average resolution time in microseconds.
    pub(super) fn avg_micros(&self) -> f64 {
        if self.scenarios == 0 {
            return 0.0;
        }
        self.total_micros as f64 / self.scenarios as f64
    }

    /// Share of orders that ended without a command (0.0-1.0).
    pub(super) fn pending_rate(&self) -> f64 {
        if self.orders == 0 {
            return 0.0;
        }
        self.pending as f64 / self.orders as f64
    }
}

/// JSON-serializable bench result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBenchResult {
    scenarios: u64,
    failures: u64,
    orders: u64,
    moves: u64,
    stays: u64,
    swaps: u64,
    avg_passes: f64,
    max_passes: u32,
    converged: u64,
    deadlocked: u64,
    timed_out: u64,
    pending_rate: f64,
    violations: u64,
    avg_micros: f64,
    max_micros: u64,
}

impl JsonBenchResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &BenchStats) -> Self {
        Self {
            scenarios: stats.scenarios,
            failures: stats.failures,
            orders: stats.orders,
            moves: stats.moves,
            stays: stats.stays,
            swaps: stats.swaps,
            avg_passes: stats.avg_passes(),
            max_passes: stats.max_passes,
            converged: stats.converged,
            deadlocked: stats.deadlocked,
            timed_out: stats.timed_out,
            pending_rate: stats.pending_rate(),
            violations: stats.violations,
            avg_micros: stats.avg_micros(),
            max_micros: stats.max_micros,
        }
    }
}

/// Format bench stats as human-readable text.
pub(super) fn format_bench_text(stats: &BenchStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Bench Results ({} scenarios)", stats.scenarios);
    output.push_str("========================================\n\n");

    let _ = writeln!(output, "Termination:");
    let _ = writeln!(output, "  Converged:  {}", stats.converged);
    let _ = writeln!(output, "  Deadlocked: {}", stats.deadlocked);
    let _ = writeln!(output, "  Timed out:  {}", stats.timed_out);
    if stats.failures > 0 {
        let _ = writeln!(output, "  Failed:     {}", stats.failures);
    }

    let _ = writeln!(output, "\nCommands:");
    let _ = writeln!(output, "  Orders: {}", stats.orders);
    let _ = writeln!(output, "  Moves:  {}", stats.moves);
    let _ = writeln!(output, "  Stays:  {}", stats.stays);
    let _ = writeln!(output, "  Swaps:  {}", stats.swaps);
    let _ = writeln!(
        output,
        "  No command: {} ({:.2}%)",
        stats.pending,
        stats.pending_rate() * 100.0
    );

    let _ = writeln!(
        output,
        "\nPasses: {:.2} avg, {} max",
        stats.avg_passes(),
        stats.max_passes
    );
    let _ = writeln!(
        output,
        "Resolve time: {:.1}us avg, {}us max",
        stats.avg_micros(),
        stats.max_micros
    );
    let _ = writeln!(output, "Invariant violations: {}", stats.violations);

    output
}

/// Format bench stats as CSV.
pub(super) fn format_bench_csv(stats: &BenchStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str(
        "scenarios,orders,moves,stays,swaps,avg_passes,max_passes,converged,deadlocked,timed_out,pending_rate,violations,avg_micros,max_micros\n",
    );

    // Data row
    let _ = writeln!(
        output,
        "{},{},{},{},{},{:.4},{},{},{},{},{:.4},{},{:.2},{}",
        stats.scenarios,
        stats.orders,
        stats.moves,
        stats.stays,
        stats.swaps,
        stats.avg_passes(),
        stats.max_passes,
        stats.converged,
        stats.deadlocked,
        stats.timed_out,
        stats.pending_rate(),
        stats.violations,
        stats.avg_micros(),
        stats.max_micros
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy::{Coord, Deadline, Direction, Order, Structure, TravelMode, Unit, resolve};

    fn swap_resolution() -> (Board, Resolution) {
        let mut board = Board::new(4, 3, 0).unwrap();
        board
            .add_structure(Structure::new(0, 0, Coord::new(0, 0), StructureKind::Shipyard))
            .unwrap();
        board.set_resource(Coord::new(3, 2), 500);
        board.add_unit(Unit::new(1, 0, Coord::new(1, 1), 0)).unwrap();
        board.add_unit(Unit::new(2, 0, Coord::new(2, 1), 0)).unwrap();
        board.add_unit(Unit::new(9, 1, Coord::new(3, 0), 0)).unwrap();
        let orders = [
            Order::new(1, Direction::East, TravelMode::Normal),
            Order::new(2, Direction::West, TravelMode::Normal),
        ];
        let resolution = resolve(&mut board, &orders, Deadline::none());
        (board, resolution)
    }

    #[test]
    fn test_stats_merge() {
        let (_, resolution) = swap_resolution();
        let mut a = BenchStats::default();
        a.add_resolution(2, &resolution, 0, 40);
        let mut b = BenchStats::default();
        b.add_resolution(2, &resolution, 0, 60);
        b.add_failure();
        a.merge(&b);

        assert_eq!(a.scenarios, 2);
        assert_eq!(a.failures, 1);
        assert_eq!(a.moves, 4);
        assert_eq!(a.swaps, 2);
        assert_eq!(a.converged, 2);
        assert_eq!(a.max_micros, 60);
        assert!((a.avg_micros() - 50.0).abs() < 1e-9);
        assert!(a.pending_rate().abs() < 1e-9);
        assert!(format_bench_csv(&a).lines().count() == 2);
    }

    #[test]
    fn test_render_board() {
        let (board, _) = swap_resolution();
        let text = render_board(&board);
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["H  x", " @@ ", "   #"]);
    }

    #[test]
    fn test_resolution_text() {
        let (_, resolution) = swap_resolution();
        let text = format_resolution_text(&resolution, &[]);
        assert!(text.starts_with("Resolution: converged (1 passes, 1 swaps)"));
        assert!(text.contains("unit    1: east"));

        let json = JsonResolution::from_resolution(&resolution, &[]);
        assert_eq!(json.wire, "m 1 e m 2 w");
        assert!(json.pending.is_empty());
    }
}
