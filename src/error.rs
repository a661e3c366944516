//! Error types for board construction and mutation.

use std::fmt;

use crate::board::{Coord, StructureId, UnitId};

/// Errors raised while building or mutating a [`Board`](crate::board::Board).
///
/// The navigation engine itself never fails: deadlocks and deadline aborts
/// are reported through [`Termination`](crate::navigation::Termination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Width or height is not strictly positive.
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// A unit id is already registered on the board.
    DuplicateUnit(UnitId),
    /// A structure id is already registered on the board.
    DuplicateStructure(StructureId),
    /// A second structure was placed on an occupied structure cell.
    StructureCollision {
        /// Cell that already holds a structure.
        at: Coord,
        /// The structure already there.
        existing: StructureId,
    },
    /// Two units were placed on the same cell.
    CellOccupied {
        /// Cell that is already occupied.
        at: Coord,
        /// The unit already there.
        occupant: UnitId,
    },
    /// A unit carries more than the configured capacity.
    OverCapacity {
        /// Offending unit.
        unit: UnitId,
        /// Amount carried.
        carried: u32,
        /// Capacity limit.
        capacity: u32,
    },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid board dimensions {width}x{height} (both must be > 0)")
            }
            Self::DuplicateUnit(id) => write!(f, "unit {id} is already on the board"),
            Self::DuplicateStructure(id) => write!(f, "structure {id} is already on the board"),
            Self::StructureCollision { at, existing } => {
                write!(f, "cell {at} already holds structure {existing}")
            }
            Self::CellOccupied { at, occupant } => {
                write!(f, "cell {at} is already occupied by unit {occupant}")
            }
            Self::OverCapacity {
                unit,
                carried,
                capacity,
            } => write!(
                f,
                "unit {unit} carries {carried} which exceeds capacity {capacity}"
            ),
        }
    }
}

impl std::error::Error for BoardError {}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_error_display() {
        let err = BoardError::InvalidDimensions {
            width: 0,
            height: 8,
        };
        assert!(format!("{err}").contains("0x8"));

        let err = BoardError::CellOccupied {
            at: Coord::new(2, 3),
            occupant: 7,
        };
        let text = format!("{err}");
        assert!(text.contains("(2, 3)"));
        assert!(text.contains('7'));
    }
}
