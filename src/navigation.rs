//! Navigation for convoy.
//!
//! Turns per-unit intents into a conflict-free set of move commands:
//! - Direction heuristic: one collision-aware step towards a goal
//! - Resolution: fixed-point passes with swaps and a deadline
//! - Commands and their protocol text

mod command;
mod heuristic;
mod resolve;

pub use command::{Command, format_commands};
pub use heuristic::{Acceptance, Assessment, TravelMode, assess_neighbor, select_direction};
pub use resolve::{Deadline, Order, Resolution, Termination, resolve};

use crate::board::{Board, Coord, Direction, UnitId};
use crate::config::NavConfig;

/// How a unit wants to move this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    /// Let the heuristic pick a step towards `goal`.
    Toward {
        /// Destination cell.
        goal: Coord,
        /// Whether colliding with rivals is allowed.
        combat_allowed: bool,
    },
    /// A direction already chosen by the caller.
    Fixed(Direction),
}

/// A unit's request for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    /// Unit making the request.
    pub unit: UnitId,
    /// Goal or fixed direction.
    pub steer: Steer,
    /// Travel mode of the unit.
    pub mode: TravelMode,
}

/// Heuristic plus resolution under one configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Navigator {
    config: NavConfig,
}

impl Navigator {
    /// Create a navigator.
    #[must_use]
    pub const fn new(config: NavConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Deadline for a turn starting now. A zero budget means no deadline.
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        if self.config.turn_budget_ms == 0 {
            Deadline::none()
        } else {
            Deadline::after(self.config.turn_budget())
        }
    }

    /// Turn intents into orders. Intents for units not on the board become
    /// orders to stay and are dropped later by [`resolve`].
    #[must_use]
    pub fn orders(&self, board: &Board, intents: &[Intent]) -> Vec<Order> {
        intents
            .iter()
            .map(|intent| {
                let direction = match (intent.steer, board.unit(intent.unit)) {
                    (Steer::Fixed(direction), _) => direction,
                    (
                        Steer::Toward {
                            goal,
                            combat_allowed,
                        },
                        Some(unit),
                    ) => select_direction(
                        board,
                        &self.config,
                        unit.position,
                        goal,
                        intent.mode,
                        combat_allowed,
                    ),
                    (Steer::Toward { .. }, None) => Direction::Still,
                };
                Order::new(intent.unit, direction, intent.mode)
            })
            .collect()
    }

    /// Plan and resolve one turn.
    ///
    /// Every direction is chosen against the board as it stands before any
    /// unit moves; resolution then mutates `board`.
    pub fn plan_turn(&self, board: &mut Board, intents: &[Intent], deadline: Deadline) -> Resolution {
        board.set_move_cost_ratio(self.config.move_cost_ratio);
        let orders = self.orders(board, intents);
        resolve(board, &orders, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Unit;

    #[test]
    fn test_plan_turn_steers_and_resolves() {
        let mut board = Board::new(5, 5, 0).unwrap();
        board.add_unit(Unit::new(0, 0, Coord::new(0, 0), 0)).unwrap();
        board.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
        let intents = [
            Intent {
                unit: 0,
                steer: Steer::Toward {
                    goal: Coord::new(4, 4),
                    combat_allowed: false,
                },
                mode: TravelMode::Normal,
            },
            Intent {
                unit: 1,
                steer: Steer::Fixed(Direction::South),
                mode: TravelMode::Returning,
            },
        ];
        let nav = Navigator::default();
        let res = nav.plan_turn(&mut board, &intents, Deadline::none());

        assert_eq!(res.termination, Termination::Converged);
        assert_eq!(format_commands(&res.commands), "m 0 n m 1 s");
        assert_eq!(board.unit(0).unwrap().position, Coord::new(0, 4));
    }

    #[test]
    fn test_zero_budget_has_no_deadline() {
        let nav = Navigator::new(NavConfig {
            turn_budget_ms: 0,
            ..NavConfig::default()
        });
        assert_eq!(nav.deadline(), Deadline::none());
        assert!(!Navigator::default().deadline().is_expired());
    }
}
