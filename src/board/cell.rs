//! Per-cell storage.

use crate::board::{StructureId, UnitId};

/// A single cell of the board.
///
/// Pure storage. Exclusivity of `occupant` is maintained by the resolution
/// engine and the turn refresh, not by the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// Resource lying on the cell.
    pub resource: u32,
    /// Unit currently standing on the cell.
    pub occupant: Option<UnitId>,
    /// Structure built on the cell. Never removed once placed.
    pub structure: Option<StructureId>,
}

impl Cell {
    /// Create an unoccupied cell holding `resource`.
    #[must_use]
    pub const fn with_resource(resource: u32) -> Self {
        Self {
            resource,
            occupant: None,
            structure: None,
        }
    }

    /// Check if a unit stands on this cell.
    #[must_use]
    #[inline]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Check if a structure sits on this cell.
    #[must_use]
    #[inline]
    pub const fn has_structure(&self) -> bool {
        self.structure.is_some()
    }

    /// Neither occupied nor built on.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.is_occupied() && !self.has_structure()
    }

    /// Place `unit` on the cell, returning whoever was there before.
    pub fn occupy(&mut self, unit: UnitId) -> Option<UnitId> {
        self.occupant.replace(unit)
    }

    /// Clear the occupant, returning it.
    pub fn vacate(&mut self) -> Option<UnitId> {
        self.occupant.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupy_and_vacate() {
        let mut cell = Cell::with_resource(40);
        assert!(cell.is_empty());

        assert_eq!(cell.occupy(3), None);
        assert!(cell.is_occupied());
        assert_eq!(cell.occupy(4), Some(3));
        assert_eq!(cell.vacate(), Some(4));
        assert_eq!(cell.vacate(), None);
        assert_eq!(cell.resource, 40);
    }

    #[test]
    fn test_structure_is_not_empty() {
        let cell = Cell {
            structure: Some(0),
            ..Cell::default()
        };
        assert!(cell.has_structure());
        assert!(!cell.is_empty());
    }
}
