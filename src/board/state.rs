//! The board: cells, units and structures for one player's view of a turn.

use std::collections::BTreeMap;

use crate::board::{Cell, Coord, PlayerId, Structure, StructureId, StructureKind, Topology, Unit, UnitId};
use crate::error::{BoardError, BoardResult};

/// Default divisor for the move cost (leaving a cell costs a tenth of its resource).
pub const DEFAULT_MOVE_COST_RATIO: u32 = 10;

/// A changed resource amount reported by the turn feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUpdate {
    /// Cell whose resource changed.
    pub at: Coord,
    /// New absolute amount.
    pub resource: u32,
}

/// Complete board state as seen by player `me`.
///
/// Units live in a `BTreeMap` so every iteration over them is ordered by id,
/// which keeps resolution deterministic.
#[derive(Debug, Clone)]
pub struct Board {
    topology: Topology,
    /// Cells stored in row-major order.
    cells: Vec<Cell>,
    units: BTreeMap<UnitId, Unit>,
    structures: BTreeMap<StructureId, Structure>,
    me: PlayerId,
    move_cost_ratio: u32,
}

impl Board {
    /// Create an empty board with no resource.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidDimensions`] if either side is not positive.
    pub fn new(width: i32, height: i32, me: PlayerId) -> BoardResult<Self> {
        let topology = Topology::new(width, height)?;
        Ok(Self {
            topology,
            cells: vec![Cell::default(); topology.area()],
            units: BTreeMap::new(),
            structures: BTreeMap::new(),
            me,
            move_cost_ratio: DEFAULT_MOVE_COST_RATIO,
        })
    }

    /// Geometry of the board.
    #[must_use]
    #[inline]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Width of the board.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.topology.width()
    }

    /// Height of the board.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.topology.height()
    }

    /// The player this board is planned for.
    #[must_use]
    pub const fn me(&self) -> PlayerId {
        self.me
    }

    /// Change the move cost divisor. Zero makes every move free.
    pub const fn set_move_cost_ratio(&mut self, ratio: u32) {
        self.move_cost_ratio = ratio;
    }

    /// Get the cell at a (possibly un-normalised) coordinate.
    #[must_use]
    #[inline]
    pub fn cell(&self, coord: Coord) -> &Cell {
        &self.cells[self.topology.index(coord)]
    }

    /// Get a mutable cell at a (possibly un-normalised) coordinate.
    #[inline]
    pub fn cell_mut(&mut self, coord: Coord) -> &mut Cell {
        let index = self.topology.index(coord);
        &mut self.cells[index]
    }

    /// Iterate over all cells with their coordinates, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (self.topology.coord_at(i), cell))
    }

    /// Set the resource on a cell.
    pub fn set_resource(&mut self, coord: Coord, resource: u32) {
        self.cell_mut(coord).resource = resource;
    }

    /// Sum of resource over every cell.
    #[must_use]
    pub fn total_resource(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.resource)).sum()
    }

    /// Place a structure.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken or the cell already holds a structure.
    pub fn add_structure(&mut self, mut structure: Structure) -> BoardResult<()> {
        if self.structures.contains_key(&structure.id) {
            return Err(BoardError::DuplicateStructure(structure.id));
        }
        structure.position = self.topology.normalize(structure.position);
        let cell = self.cell_mut(structure.position);
        if let Some(existing) = cell.structure {
            return Err(BoardError::StructureCollision {
                at: structure.position,
                existing,
            });
        }
        cell.structure = Some(structure.id);
        self.structures.insert(structure.id, structure);
        Ok(())
    }

    /// Place a unit and mark its cell occupied.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken or another unit stands on the cell.
    pub fn add_unit(&mut self, mut unit: Unit) -> BoardResult<()> {
        if self.units.contains_key(&unit.id) {
            return Err(BoardError::DuplicateUnit(unit.id));
        }
        unit.position = self.topology.normalize(unit.position);
        let cell = self.cell_mut(unit.position);
        if let Some(occupant) = cell.occupant {
            return Err(BoardError::CellOccupied {
                at: unit.position,
                occupant,
            });
        }
        cell.occupy(unit.id);
        self.units.insert(unit.id, unit);
        Ok(())
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Look up a unit mutably.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// All units, ordered by id.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Units owned by `me`, ordered by id.
    pub fn my_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.owner == self.me)
    }

    /// Look up a structure.
    #[must_use]
    pub fn structure(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(&id)
    }

    /// All structures, ordered by id.
    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    /// The structure on a cell, if any.
    #[must_use]
    pub fn structure_at(&self, coord: Coord) -> Option<&Structure> {
        self.cell(coord).structure.and_then(|id| self.structures.get(&id))
    }

    /// Home structure of `player`.
    #[must_use]
    pub fn home(&self, player: PlayerId) -> Option<&Structure> {
        self.structures
            .values()
            .find(|s| s.owner == player && s.kind == StructureKind::Shipyard)
    }

    /// The unit standing on a cell, if any.
    #[must_use]
    pub fn occupant_of(&self, coord: Coord) -> Option<&Unit> {
        self.cell(coord).occupant.and_then(|id| self.units.get(&id))
    }

    /// Whether the cell holds a structure owned by `me`.
    #[must_use]
    pub fn is_friendly_structure(&self, coord: Coord) -> bool {
        self.structure_at(coord).is_some_and(|s| s.owner == self.me)
    }

    /// Whether all four neighbours of a cell are occupied.
    #[must_use]
    pub fn is_surrounded(&self, coord: Coord) -> bool {
        self.topology
            .neighbors(coord)
            .iter()
            .all(|&(_, n)| self.cell(n).is_occupied())
    }

    /// Resource a unit must hold to leave `coord`.
    #[must_use]
    pub fn move_cost(&self, coord: Coord) -> u32 {
        self.cell(coord)
            .resource
            .checked_div(self.move_cost_ratio)
            .unwrap_or(0)
    }

    /// Whether `unit` can pay to leave its cell.
    #[must_use]
    pub fn can_move(&self, unit: &Unit) -> bool {
        unit.carried >= self.move_cost(unit.position)
    }

    /// Refresh the board for a new turn.
    ///
    /// Applies resource updates, replaces the unit roster (units absent from
    /// `roster` are gone), resets every `moved` flag and rebuilds occupancy
    /// from the new positions. Structures persist.
    ///
    /// # Errors
    ///
    /// Fails on duplicate ids or two units on one cell. The board is left
    /// untouched in that case.
    pub fn begin_turn(&mut self, updates: &[ResourceUpdate], roster: &[Unit]) -> BoardResult<()> {
        let mut units = BTreeMap::new();
        let mut positions: BTreeMap<Coord, UnitId> = BTreeMap::new();
        for unit in roster {
            let position = self.topology.normalize(unit.position);
            if let Some(&occupant) = positions.get(&position) {
                return Err(BoardError::CellOccupied {
                    at: position,
                    occupant,
                });
            }
            let fresh = Unit {
                position,
                moved: false,
                ..*unit
            };
            if units.insert(unit.id, fresh).is_some() {
                return Err(BoardError::DuplicateUnit(unit.id));
            }
            positions.insert(position, unit.id);
        }

        for update in updates {
            self.set_resource(update.at, update.resource);
        }
        for cell in &mut self.cells {
            cell.occupant = None;
        }
        for (position, id) in positions {
            self.cell_mut(position).occupy(id);
        }
        self.units = units;
        Ok(())
    }

    /// Record a unit as finalised in place.
    pub(crate) fn finalize_stay(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.moved = true;
        }
    }

    /// Move a unit one cell and mark it finalised.
    ///
    /// The source is cleared only if it still holds this unit; a swap partner
    /// or a unit rushing home may already stand there.
    pub(crate) fn finalize_move(&mut self, id: UnitId, target: Coord) {
        let target = self.topology.normalize(target);
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let source = unit.position;
        unit.position = target;
        unit.moved = true;

        let source_cell = self.cell_mut(source);
        if source_cell.occupant == Some(id) {
            source_cell.vacate();
        }
        self.cell_mut(target).occupy(id);
    }
}

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn verify_move_cost_never_exceeds_resource() {
        let resource: u32 = kani::any();
        let ratio: u32 = kani::any();
        let cost = resource.checked_div(ratio).unwrap_or(0);
        assert!(cost <= resource);
    }
}
