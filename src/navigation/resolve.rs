//! Multi-unit conflict resolution.
//!
//! Every pending unit is visited once per pass, richest first. A unit is
//! finalised as soon as its move can be decided and the board is updated
//! immediately, so later units in the same pass see the new occupancy.
//! Passes repeat until all units are finalised, a pass makes no progress,
//! or the deadline expires at the top of a pass.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::board::{Board, Coord, Direction, UnitId};
use crate::navigation::{Command, TravelMode};

/// A unit's desired move for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    /// Unit to move.
    pub unit: UnitId,
    /// Desired direction (usually from the heuristic).
    pub direction: Direction,
    /// Travel mode of the unit.
    pub mode: TravelMode,
}

impl Order {
    /// Create an order.
    #[must_use]
    pub const fn new(unit: UnitId, direction: Direction, mode: TravelMode) -> Self {
        Self {
            unit,
            direction,
            mode,
        }
    }
}

/// Wall-clock limit for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No limit.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Expire `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now().checked_add(budget))
    }

    /// Expire at `instant`.
    #[must_use]
    pub const fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Why resolution stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Every ordered unit was finalised.
    Converged,
    /// A pass made no progress; these units received no command.
    Deadlocked {
        /// Units left pending, in resolution order.
        pending: Vec<UnitId>,
    },
    /// The deadline expired; these units received no command.
    DeadlineExceeded {
        /// Units left pending, in resolution order.
        pending: Vec<UnitId>,
    },
}

impl Termination {
    /// Units that received no command.
    #[must_use]
    pub fn pending(&self) -> &[UnitId] {
        match self {
            Self::Converged => &[],
            Self::Deadlocked { pending } | Self::DeadlineExceeded { pending } => pending,
        }
    }
}

/// Result of resolving one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Finalised commands in the order they were decided.
    pub commands: Vec<Command>,
    /// Why resolution stopped.
    pub termination: Termination,
    /// Number of passes started.
    pub passes: u32,
    /// Number of two-unit swaps executed.
    pub swaps: u32,
}

enum Step {
    Stay,
    Move,
    Swap(UnitId),
    Defer,
}

/// Reconcile every order into a conflict-free set of commands.
///
/// Mutates `board`: finalised units get `moved` set and their new position,
/// and occupancy follows them. Orders for unknown or rival units are
/// ignored, as is any repeat order for the same unit.
pub fn resolve(board: &mut Board, orders: &[Order], deadline: Deadline) -> Resolution {
    let me = board.me();
    let mut desired: BTreeMap<UnitId, Order> = BTreeMap::new();
    let mut pending: Vec<Order> = Vec::with_capacity(orders.len());
    for order in orders {
        match board.unit(order.unit) {
            Some(unit) if unit.owner == me => {
                if desired.contains_key(&order.unit) {
                    debug!(unit = order.unit, "duplicate order ignored");
                    continue;
                }
                desired.insert(order.unit, *order);
                pending.push(*order);
            }
            Some(_) => debug!(unit = order.unit, "order for rival unit ignored"),
            None => debug!(unit = order.unit, "order for unknown unit ignored"),
        }
    }

    let mut commands = Vec::with_capacity(pending.len());
    let mut passes = 0;
    let mut swaps = 0;

    let termination = loop {
        pending.retain(|o| board.unit(o.unit).is_some_and(|u| !u.moved));
        if pending.is_empty() {
            break Termination::Converged;
        }
        if deadline.is_expired() {
            let pending: Vec<UnitId> = pending.iter().map(|o| o.unit).collect();
            warn!(
                pending = pending.len(),
                finalised = commands.len(),
                "turn deadline exceeded, returning partial commands"
            );
            break Termination::DeadlineExceeded { pending };
        }

        passes += 1;
        pending.sort_by_key(|o| Reverse(board.unit(o.unit).map_or(0, |u| u.carried)));

        let mut progress = false;
        for order in &pending {
            let Some(&unit) = board.unit(order.unit) else {
                continue;
            };
            if unit.moved {
                continue;
            }

            let target = board
                .topology()
                .normalize(unit.position.offset(order.direction));
            match decide(board, &desired, order, target) {
                Step::Stay => {
                    board.finalize_stay(unit.id);
                    commands.push(Command::stay(unit.id));
                }
                Step::Move => {
                    board.finalize_move(unit.id, target);
                    commands.push(Command::move_unit(unit.id, order.direction));
                }
                Step::Swap(other) => {
                    board.finalize_move(unit.id, target);
                    board.finalize_move(other, unit.position);
                    commands.push(Command::move_unit(unit.id, order.direction));
                    commands.push(Command::move_unit(other, order.direction.invert()));
                    swaps += 1;
                    debug!(unit = unit.id, other, "swapped");
                }
                Step::Defer => continue,
            }
            progress = true;
        }

        if !progress {
            let pending: Vec<UnitId> = pending.iter().map(|o| o.unit).collect();
            debug!(?pending, "resolution deadlocked");
            break Termination::Deadlocked { pending };
        }
    };

    Resolution {
        commands,
        termination,
        passes,
        swaps,
    }
}

/// Decide one pending unit against the current board.
fn decide(
    board: &Board,
    desired: &BTreeMap<UnitId, Order>,
    order: &Order,
    target: Coord,
) -> Step {
    let Some(unit) = board.unit(order.unit) else {
        return Step::Defer;
    };
    if !board.can_move(unit) || !order.direction.is_move() || target == unit.position {
        return Step::Stay;
    }
    if order.mode == TravelMode::FinalRush && board.is_friendly_structure(target) {
        return Step::Move;
    }

    let Some(other) = board.occupant_of(target) else {
        return Step::Move;
    };
    if other.owner != board.me() {
        // The heuristic already judged this rival worth contesting.
        return Step::Move;
    }
    if other.moved {
        return Step::Stay;
    }
    match desired.get(&other.id) {
        // Friends without an order this turn do not move.
        None => Step::Stay,
        Some(theirs) if !theirs.direction.is_move() => Step::Stay,
        Some(theirs) if theirs.direction == order.direction.invert() => {
            if board.can_move(other) {
                Step::Swap(other.id)
            } else {
                Step::Stay
            }
        }
        Some(_) => Step::Defer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Structure, StructureKind, Unit};

    fn board() -> Board {
        Board::new(8, 8, 0).unwrap()
    }

    fn order(unit: UnitId, direction: Direction) -> Order {
        Order::new(unit, direction, TravelMode::Normal)
    }

    #[test]
    fn test_simple_move() {
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        let res = resolve(&mut b, &[order(1, Direction::East)], Deadline::none());

        assert_eq!(res.commands, vec![Command::move_unit(1, Direction::East)]);
        assert_eq!(res.termination, Termination::Converged);
        assert_eq!(b.unit(1).unwrap().position, Coord::new(3, 2));
        assert!(!b.cell(Coord::new(2, 2)).is_occupied());
        assert_eq!(b.cell(Coord::new(3, 2)).occupant, Some(1));
    }

    #[test]
    fn test_unaffordable_move_stays() {
        let mut b = board();
        b.set_resource(Coord::new(2, 2), 200);
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 19)).unwrap();
        let res = resolve(&mut b, &[order(1, Direction::East)], Deadline::none());
        assert_eq!(res.commands, vec![Command::stay(1)]);
        assert!(b.unit(1).unwrap().moved);
    }

    #[test]
    fn test_mirror_swap() {
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(3, 2), 0)).unwrap();
        let res = resolve(
            &mut b,
            &[order(1, Direction::East), order(2, Direction::West)],
            Deadline::none(),
        );

        assert_eq!(res.swaps, 1);
        assert_eq!(res.passes, 1);
        assert_eq!(res.commands.len(), 2);
        assert_eq!(b.cell(Coord::new(2, 2)).occupant, Some(2));
        assert_eq!(b.cell(Coord::new(3, 2)).occupant, Some(1));
    }

    #[test]
    fn test_follow_the_leader() {
        // The richer unit in front moves first, freeing the cell in the same pass.
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(3, 2), 50)).unwrap();
        let res = resolve(
            &mut b,
            &[order(1, Direction::East), order(2, Direction::East)],
            Deadline::none(),
        );
        assert_eq!(res.passes, 1);
        assert_eq!(
            res.commands,
            vec![
                Command::move_unit(2, Direction::East),
                Command::move_unit(1, Direction::East)
            ]
        );
    }

    #[test]
    fn test_poor_leader_defers_follower() {
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 50)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(3, 2), 0)).unwrap();
        let res = resolve(
            &mut b,
            &[order(1, Direction::East), order(2, Direction::East)],
            Deadline::none(),
        );
        assert_eq!(res.passes, 2);
        assert_eq!(res.termination, Termination::Converged);
        assert_eq!(b.unit(1).unwrap().position, Coord::new(3, 2));
        assert_eq!(b.unit(2).unwrap().position, Coord::new(4, 2));
    }

    #[test]
    fn test_blocked_by_still_friend() {
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(3, 2), 0)).unwrap();
        b.add_unit(Unit::new(3, 0, Coord::new(2, 3), 0)).unwrap();
        let res = resolve(
            &mut b,
            &[
                order(1, Direction::East),
                order(2, Direction::Still),
                order(3, Direction::North),
            ],
            Deadline::none(),
        );
        assert_eq!(res.termination, Termination::Converged);
        assert_eq!(b.unit(1).unwrap().position, Coord::new(2, 2));
        // Unit 1 is already finalised in place, so 3 cannot enter its cell.
        assert_eq!(b.unit(3).unwrap().position, Coord::new(2, 3));
        assert!(res.commands.iter().all(|c| c.direction() == Some(Direction::Still)));
    }

    #[test]
    fn test_unordered_friend_blocks() {
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(3, 2), 0)).unwrap();
        let res = resolve(&mut b, &[order(1, Direction::East)], Deadline::none());
        assert_eq!(res.commands, vec![Command::stay(1)]);
    }

    #[test]
    fn test_cycle_deadlocks() {
        // Four friends rotating around a square never find a free cell.
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(0, 0), 0)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(1, 0), 0)).unwrap();
        b.add_unit(Unit::new(3, 0, Coord::new(1, 1), 0)).unwrap();
        b.add_unit(Unit::new(4, 0, Coord::new(0, 1), 0)).unwrap();
        let orders = [
            order(1, Direction::East),
            order(2, Direction::South),
            order(3, Direction::West),
            order(4, Direction::North),
        ];
        let res = resolve(&mut b, &orders, Deadline::none());
        assert!(res.commands.is_empty());
        assert_eq!(
            res.termination,
            Termination::Deadlocked {
                pending: vec![1, 2, 3, 4]
            }
        );
        assert!(b.units().all(|u| !u.moved));
    }

    #[test]
    fn test_expired_deadline_returns_nothing() {
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        let res = resolve(
            &mut b,
            &[order(1, Direction::East)],
            Deadline::at(Instant::now()),
        );
        assert!(res.commands.is_empty());
        assert_eq!(res.passes, 0);
        assert_eq!(res.termination.pending(), &[1]);
        assert_eq!(b.unit(1).unwrap().position, Coord::new(2, 2));
    }

    #[test]
    fn test_final_rush_piles_onto_structure() {
        let mut b = board();
        b.add_structure(Structure::new(0, 0, Coord::new(3, 3), StructureKind::Shipyard))
            .unwrap();
        b.add_unit(Unit::new(1, 0, Coord::new(3, 3), 0)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(2, 3), 500)).unwrap();
        let rush = Order::new(2, Direction::East, TravelMode::FinalRush);
        let res = resolve(&mut b, &[order(1, Direction::Still), rush], Deadline::none());

        assert_eq!(res.commands[0], Command::move_unit(2, Direction::East));
        assert_eq!(b.unit(2).unwrap().position, Coord::new(3, 3));
        assert_eq!(b.unit(1).unwrap().position, Coord::new(3, 3));
    }

    #[test]
    fn test_rival_cell_is_entered() {
        let mut b = board();
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        b.add_unit(Unit::new(9, 1, Coord::new(3, 2), 0)).unwrap();
        let res = resolve(
            &mut b,
            &[order(1, Direction::East), order(9, Direction::West), order(42, Direction::North)],
            Deadline::none(),
        );
        assert_eq!(res.commands, vec![Command::move_unit(1, Direction::East)]);
        assert_eq!(b.cell(Coord::new(3, 2)).occupant, Some(1));
    }

    #[test]
    fn test_swap_with_stuck_partner_stays() {
        let mut b = board();
        b.set_resource(Coord::new(3, 2), 500);
        b.add_unit(Unit::new(1, 0, Coord::new(2, 2), 10)).unwrap();
        b.add_unit(Unit::new(2, 0, Coord::new(3, 2), 0)).unwrap();
        let res = resolve(
            &mut b,
            &[order(1, Direction::East), order(2, Direction::West)],
            Deadline::none(),
        );
        assert_eq!(res.swaps, 0);
        assert_eq!(res.commands, vec![Command::stay(1), Command::stay(2)]);
    }
}
