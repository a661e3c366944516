//! Board model for convoy.
//!
//! - Wrapped (toroidal) geometry over integer coordinates
//! - Cells holding resource, an optional occupant and an optional structure
//! - Units and structures owned by players
//! - Turn refresh from the external feed

mod cell;
mod entity;
mod geometry;
mod state;

pub use cell::Cell;
pub use entity::{PlayerId, Structure, StructureId, StructureKind, Unit, UnitId};
pub use geometry::{Coord, Direction, Topology};
pub use state::{Board, DEFAULT_MOVE_COST_RATIO, ResourceUpdate};
