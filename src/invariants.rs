//! Resolution invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger after [`resolve`](crate::navigation::resolve)
//! on a board that started the turn consistent. If they do, the engine is
//! wrong. The one tolerated overlap is several friendly units on a friendly
//! structure, which the final-rush override produces on purpose.

use std::collections::BTreeMap;

use crate::board::{Board, Coord, UnitId};
use crate::navigation::{Command, Resolution};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check a resolution against the board it was applied to.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_resolution(board: &Board, resolution: &Resolution) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // One command per unit, and every commanded unit is finalised
    let mut commanded: BTreeMap<UnitId, usize> = BTreeMap::new();
    for command in &resolution.commands {
        let Command::Move { unit, .. } = *command else {
            continue;
        };
        *commanded.entry(unit).or_default() += 1;
    }
    for (&unit, &count) in &commanded {
        if count > 1 {
            violations.push(InvariantViolation {
                message: format!("Unit {unit} received {count} commands"),
            });
        }
        match board.unit(unit) {
            Some(u) if u.moved => {}
            Some(_) => violations.push(InvariantViolation {
                message: format!("Unit {unit} has a command but is not marked moved"),
            }),
            None => violations.push(InvariantViolation {
                message: format!("Command for unit {unit} which is not on the board"),
            }),
        }
    }

    // Pending units must not have been touched
    for &unit in resolution.termination.pending() {
        if commanded.contains_key(&unit) {
            violations.push(InvariantViolation {
                message: format!("Unit {unit} is reported pending but has a command"),
            });
        }
        if board.unit(unit).is_some_and(|u| u.moved) {
            violations.push(InvariantViolation {
                message: format!("Unit {unit} is reported pending but is marked moved"),
            });
        }
    }

    // No two friendly units end on the same cell
    let mut cells: BTreeMap<Coord, Vec<UnitId>> = BTreeMap::new();
    for unit in board.my_units() {
        cells.entry(unit.position).or_default().push(unit.id);
    }
    for (coord, units) in &cells {
        if units.len() > 1 && !board.is_friendly_structure(*coord) {
            violations.push(InvariantViolation {
                message: format!("Units {units:?} share cell {coord}"),
            });
        }
    }

    // Occupancy follows every finalised unit
    for unit in board.my_units().filter(|u| u.moved) {
        let occupant = board.cell(unit.position).occupant;
        if occupant != Some(unit.id) && !board.is_friendly_structure(unit.position) {
            violations.push(InvariantViolation {
                message: format!(
                    "Unit {} stands on {} but the cell lists {:?}",
                    unit.id, unit.position, occupant
                ),
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, Unit};
    use crate::navigation::{Deadline, Order, Termination, TravelMode, resolve};

    #[test]
    fn test_clean_resolution_passes() {
        let mut board = Board::new(8, 8, 0).unwrap();
        board.add_unit(Unit::new(1, 0, Coord::new(1, 1), 0)).unwrap();
        board.add_unit(Unit::new(2, 0, Coord::new(2, 1), 0)).unwrap();
        let orders = [
            Order::new(1, Direction::East, TravelMode::Normal),
            Order::new(2, Direction::West, TravelMode::Normal),
        ];
        let res = resolve(&mut board, &orders, Deadline::none());
        assert!(check_resolution(&board, &res).is_empty());
    }

    #[test]
    fn test_detects_double_command_and_unmoved_unit() {
        let mut board = Board::new(8, 8, 0).unwrap();
        board.add_unit(Unit::new(1, 0, Coord::new(1, 1), 0)).unwrap();
        let res = Resolution {
            commands: vec![Command::stay(1), Command::stay(1)],
            termination: Termination::Converged,
            passes: 1,
            swaps: 0,
        };
        let violations = check_resolution(&board, &res);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].to_string().contains("2 commands"));
    }

    #[test]
    fn test_detects_shared_cell() {
        let mut board = Board::new(8, 8, 0).unwrap();
        board.add_unit(Unit::new(1, 0, Coord::new(1, 1), 0)).unwrap();
        board.add_unit(Unit::new(2, 0, Coord::new(2, 1), 0)).unwrap();
        board.unit_mut(2).unwrap().position = Coord::new(1, 1);
        let res = Resolution {
            commands: Vec::new(),
            termination: Termination::Converged,
            passes: 0,
            swaps: 0,
        };
        let violations = check_resolution(&board, &res);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("share cell (1, 1)"));
    }
}
