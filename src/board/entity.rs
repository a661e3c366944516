//! Units and structures.

use serde::{Deserialize, Serialize};

use crate::board::Coord;

/// Unique identifier for a player.
pub type PlayerId = u8;

/// Unique identifier for a unit.
pub type UnitId = u32;

/// Unique identifier for a structure.
pub type StructureId = u32;

/// A mobile, owned entity that carries resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    /// Unique identifier for this unit.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Current position (normalised once the unit is on a board).
    pub position: Coord,
    /// Resource currently carried.
    pub carried: u32,
    /// Set once resolution has finalised this unit's move for the turn.
    pub moved: bool,
}

impl Unit {
    /// Create a unit that has not moved yet this turn.
    #[must_use]
    pub const fn new(id: UnitId, owner: PlayerId, position: Coord, carried: u32) -> Self {
        Self {
            id,
            owner,
            position,
            carried,
            moved: false,
        }
    }

    /// Whether the unit has reached `capacity`.
    #[must_use]
    pub const fn is_full(&self, capacity: u32) -> bool {
        self.carried >= capacity
    }
}

/// Kind of structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    /// The player's home structure. One per player, placed at game start.
    Shipyard,
    /// An auxiliary deposit point built during the game.
    Dropoff,
}

/// A fixed, owned deposit point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure {
    /// Unique identifier for this structure.
    pub id: StructureId,
    /// Owning player.
    pub owner: PlayerId,
    /// Cell the structure sits on.
    pub position: Coord,
    /// Home or auxiliary.
    pub kind: StructureKind,
}

impl Structure {
    /// Create a structure.
    #[must_use]
    pub const fn new(id: StructureId, owner: PlayerId, position: Coord, kind: StructureKind) -> Self {
        Self {
            id,
            owner,
            position,
            kind,
        }
    }

    /// Whether this is a home structure.
    #[must_use]
    pub const fn is_home(&self) -> bool {
        matches!(self.kind, StructureKind::Shipyard)
    }
}
