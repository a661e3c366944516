// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Convoy: deterministic navigation and collision resolution for many units
//! on a wrapped grid.
//!
//! This crate provides the per-turn decision core of a resource-collection
//! bot:
//! - Toroidal geometry and a board of cells, units and structures
//! - A collision-aware direction heuristic
//! - A time-bounded resolver that turns every unit's wish into safe commands
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Scenario / strategy layer         │
//! ├─────────────────────────────────────┤
//! │   Navigator (heuristic + resolve)   │
//! ├─────────────────────────────────────┤
//! │   Board (geometry, cells, units)    │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use convoy::{Board, Coord, Deadline, Direction, Order, TravelMode, Unit, resolve};
//!
//! let mut board = Board::new(8, 8, 0).unwrap();
//! board.add_unit(Unit::new(1, 0, Coord::new(2, 2), 0)).unwrap();
//! board.add_unit(Unit::new(2, 0, Coord::new(3, 2), 0)).unwrap();
//!
//! let orders = [
//!     Order::new(1, Direction::East, TravelMode::Normal),
//!     Order::new(2, Direction::West, TravelMode::Normal),
//! ];
//! let resolution = resolve(&mut board, &orders, Deadline::none());
//! assert_eq!(resolution.swaps, 1);
//! ```

pub mod analysis;
pub mod board;
pub mod config;
pub mod error;
pub mod invariants;
pub mod navigation;
pub mod scenario;

pub use error::{BoardError, BoardResult};

// Re-export key types at crate root for convenience
pub use analysis::{CellInsight, TurnAnalysis};
pub use board::{Board, Cell, Coord, Direction, Structure, StructureKind, Topology, Unit};
pub use config::NavConfig;
pub use invariants::{InvariantViolation, check_resolution};
pub use navigation::{
    Command, Deadline, Intent, Navigator, Order, Resolution, Steer, Termination, TravelMode,
    format_commands, resolve, select_direction,
};
pub use scenario::{Scenario, ScenarioError};
