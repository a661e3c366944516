//! Per-turn derived state.
//!
//! Computed fresh from a [`Board`] at the start of each turn and discarded
//! afterwards. The persistent [`Cell`](crate::board::Cell) never stores any of it.

use crate::board::{Board, Coord, Topology};
use crate::config::NavConfig;

/// Derived facts about one cell for the current turn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellInsight {
    /// Resource summed over the inspiration disc around the cell.
    pub surrounding_resource: u64,
    /// `surrounding_resource` divided by the disc size, rounded down.
    pub density: u64,
    /// Rival units within the inspiration radius.
    pub nearby_enemies: u32,
    /// Enough rivals nearby to boost extraction.
    pub inspired: bool,
    /// Resource one turn of mining here would yield.
    pub mineable: u32,
    /// Friendly units within the presence radius.
    pub allies: u32,
    /// Rival units within the presence radius.
    pub rivals: u32,
    /// Closest friendly deposit point.
    pub nearest_structure: Option<Coord>,
}

/// Derived facts for every cell of a board.
#[derive(Debug, Clone)]
pub struct TurnAnalysis {
    topology: Topology,
    insights: Vec<CellInsight>,
    combat_presence_ratio: f64,
}

/// Offsets of a disc around the origin, reused for every centre.
fn disc_offsets(topology: &Topology, radius: i32) -> Vec<Coord> {
    topology.disc(Coord::new(0, 0), radius)
}

fn count_units(board: &Board, center: Coord, offsets: &[Coord], friendly: bool) -> u32 {
    let me = board.me();
    let count = offsets
        .iter()
        .filter_map(|o| board.occupant_of(Coord::new(center.x + o.x, center.y + o.y)))
        .filter(|u| (u.owner == me) == friendly)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Home structure unless an auxiliary one is strictly closer.
fn nearest_structure(board: &Board, coord: Coord) -> Option<Coord> {
    let topology = board.topology();
    let me = board.me();
    let home = board.home(me).map(|s| s.position);
    board
        .structures()
        .filter(|s| s.owner == me && !s.is_home())
        .map(|s| s.position)
        .fold(home, |best, candidate| match best {
            Some(b) if topology.distance(coord, candidate) >= topology.distance(coord, b) => Some(b),
            _ => Some(candidate),
        })
}

impl TurnAnalysis {
    /// Analyse every cell of `board`.
    #[must_use]
    pub fn compute(board: &Board, config: &NavConfig) -> Self {
        let topology = *board.topology();
        let inspiration = disc_offsets(&topology, config.inspiration_radius);
        let presence = disc_offsets(&topology, config.presence_radius);

        let insights = board
            .cells()
            .map(|(coord, cell)| {
                let surrounding_resource: u64 = inspiration
                    .iter()
                    .map(|o| u64::from(board.cell(Coord::new(coord.x + o.x, coord.y + o.y)).resource))
                    .sum();
                let density = u64::try_from(inspiration.len())
                    .ok()
                    .and_then(|size| surrounding_resource.checked_div(size))
                    .unwrap_or(0);
                let nearby_enemies = count_units(board, coord, &inspiration, false);
                let inspired = nearby_enemies >= config.inspiration_ship_count;
                let base = if config.extraction_ratio == 0 {
                    cell.resource
                } else {
                    cell.resource.div_ceil(config.extraction_ratio)
                };
                let mineable = if inspired {
                    base.saturating_mul(config.inspired_multiplier)
                } else {
                    base
                };
                CellInsight {
                    surrounding_resource,
                    density,
                    nearby_enemies,
                    inspired,
                    mineable,
                    allies: count_units(board, coord, &presence, true),
                    rivals: count_units(board, coord, &presence, false),
                    nearest_structure: nearest_structure(board, coord),
                }
            })
            .collect();

        Self {
            topology,
            insights,
            combat_presence_ratio: config.combat_presence_ratio,
        }
    }

    /// Insight for a (possibly un-normalised) coordinate.
    #[must_use]
    pub fn insight(&self, coord: Coord) -> &CellInsight {
        &self.insights[self.topology.index(coord)]
    }

    /// Closest friendly deposit point to `coord`.
    #[must_use]
    pub fn nearest_structure(&self, coord: Coord) -> Option<Coord> {
        self.insight(coord).nearest_structure
    }

    /// Whether allies around `coord` outnumber rivals enough to risk collisions.
    #[must_use]
    pub fn combat_favourable(&self, coord: Coord) -> bool {
        let insight = self.insight(coord);
        f64::from(insight.allies) > f64::from(insight.rivals) * self.combat_presence_ratio
    }
}
