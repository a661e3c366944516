//! Single-unit direction selection.
//!
//! A neighbour is a candidate when at least one [`Acceptance`] reason holds
//! and the predicted-contest veto does not. Among candidates, those that
//! shorten the distance to the goal are preferred; each is scored by
//! `resource / (1 + distance_after_move)`. Homebound units take the lowest
//! score (cheap, direct paths), everyone else the highest (rich detours).

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::board::{Board, Coord, Direction, Unit};
use crate::config::NavConfig;

/// How a unit is travelling this turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TravelMode {
    /// Mining, exploring or anything else the strategy layer does.
    #[default]
    Normal,
    /// Carrying resource back to a structure.
    Returning,
    /// End-of-game dash home; may pile onto a friendly structure.
    FinalRush,
}

impl TravelMode {
    /// Whether the unit is heading home.
    #[must_use]
    pub const fn is_homebound(self) -> bool {
        matches!(self, Self::Returning | Self::FinalRush)
    }

    /// Map a strategy-layer status label to a mode.
    ///
    /// Only `returning` and `finalRush` change navigation; every other label
    /// is `Normal`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "returning" => Self::Returning,
            "finalRush" => Self::FinalRush,
            _ => Self::Normal,
        }
    }
}

/// Why a neighbour is acceptable, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Acceptance {
    /// Nobody stands there.
    Open,
    /// Our own structure, held by a rival.
    ContestedStructure,
    /// A rival worth colliding with.
    Combat,
    /// A friend we may trade places with.
    Swap,
}

/// Outcome of assessing one neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assessment {
    /// The neighbour is a candidate.
    Accepted(Acceptance),
    /// No acceptance reason holds.
    Rejected,
    /// Would be accepted, but a rival next to it could claim it next turn.
    PredictedContest(Acceptance),
}

impl Assessment {
    /// Whether the neighbour may be moved into.
    #[must_use]
    pub const fn is_acceptable(self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Values shared by every neighbour of one start cell.
struct Origin {
    start: Coord,
    start_resource: u32,
    carried: u32,
    move_cost: u32,
    may_swap: bool,
}

impl Origin {
    fn new(board: &Board, config: &NavConfig, start: Coord, mode: TravelMode) -> Self {
        let start = board.topology().normalize(start);
        let cell = board.cell(start);
        let friendly_structure = board.is_friendly_structure(start);
        let may_swap = mode.is_homebound()
            || (friendly_structure && board.is_surrounded(start))
            || cell.resource >= config.swap_resource_threshold
            || (cell.resource == 0 && !friendly_structure);
        Self {
            start,
            start_resource: cell.resource,
            carried: board.occupant_of(start).map_or(0, |u| u.carried),
            move_cost: board.move_cost(start),
            may_swap,
        }
    }

    /// Value of the moving unit for collision comparisons.
    fn value(&self) -> f64 {
        f64::from(self.carried) + f64::from(self.start_resource)
    }
}

/// Decide whether `neighbor` is an acceptable step from `start`.
#[must_use]
pub fn assess_neighbor(
    board: &Board,
    config: &NavConfig,
    start: Coord,
    neighbor: Coord,
    mode: TravelMode,
    combat_allowed: bool,
) -> Assessment {
    let origin = Origin::new(board, config, start, mode);
    assess(board, config, &origin, neighbor, mode, combat_allowed)
}

fn assess(
    board: &Board,
    config: &NavConfig,
    origin: &Origin,
    neighbor: Coord,
    mode: TravelMode,
    combat_allowed: bool,
) -> Assessment {
    let neighbor = board.topology().normalize(neighbor);
    if neighbor == origin.start {
        // Only possible on boards one or two cells wide.
        return Assessment::Rejected;
    }
    let cell = board.cell(neighbor);
    let me = board.me();
    let friendly_structure = board.is_friendly_structure(neighbor);

    let reason = match board.occupant_of(neighbor) {
        None => Some(Acceptance::Open),
        Some(rival) if rival.owner != me => {
            if friendly_structure {
                Some(Acceptance::ContestedStructure)
            } else if combat_allowed
                && (mode.is_homebound()
                    || f64::from(rival.carried) + f64::from(cell.resource)
                        > origin.value() * config.combat_value_ratio)
            {
                Some(Acceptance::Combat)
            } else {
                None
            }
        }
        Some(_) if origin.may_swap => Some(Acceptance::Swap),
        Some(_) => None,
    };

    let Some(reason) = reason else {
        return Assessment::Rejected;
    };
    if !combat_allowed && !friendly_structure && predicted_contest(board, config, origin, neighbor) {
        trace!(?neighbor, ?reason, "vetoed: predicted contest");
        return Assessment::PredictedContest(reason);
    }
    Assessment::Accepted(reason)
}

/// A rival next to `neighbor` could take it from us next turn.
fn predicted_contest(board: &Board, config: &NavConfig, origin: &Origin, neighbor: Coord) -> bool {
    let me = board.me();
    let has_structure = board.cell(neighbor).has_structure();
    let my_value = i64::from(origin.carried) - i64::from(origin.move_cost);

    board
        .topology()
        .neighbors(neighbor)
        .iter()
        .filter_map(|&(_, around)| board.occupant_of(around))
        .filter(|unit| unit.owner != me)
        .any(|rival: &Unit| {
            let rival_value =
                i64::from(rival.carried) - i64::from(board.move_cost(rival.position));
            has_structure
                || to_f64(my_value) * config.caution_ratio > to_f64(rival_value)
        })
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: i64) -> f64 {
    // Carried amounts are bounded by capacity, far below 2^52.
    value as f64
}

/// A scored candidate neighbour.
#[derive(Clone, Copy)]
struct Candidate {
    direction: Direction,
    score: u32,
}

/// Pick the first best candidate in canonical order.
fn pick(candidates: &[Candidate], lowest: bool) -> Option<Direction> {
    candidates
        .iter()
        .fold(None::<Candidate>, |best, &c| match best {
            Some(b) if (lowest && c.score >= b.score) || (!lowest && c.score <= b.score) => Some(b),
            _ => Some(c),
        })
        .map(|c| c.direction)
}

/// Choose a direction from `start` towards `goal`.
///
/// Returns [`Direction::Still`] when no neighbour is acceptable, or when
/// none is closer and none is attractive enough for a detour.
#[must_use]
pub fn select_direction(
    board: &Board,
    config: &NavConfig,
    start: Coord,
    goal: Coord,
    mode: TravelMode,
    combat_allowed: bool,
) -> Direction {
    let topology = board.topology();
    let origin = Origin::new(board, config, start, mode);
    let distance = topology.distance(origin.start, goal);
    let detour_floor = f64::from(origin.start_resource) * config.detour_resource_ratio;

    let mut closer = Vec::with_capacity(4);
    let mut attractive = Vec::with_capacity(4);
    for (direction, neighbor) in topology.neighbors(origin.start) {
        let assessment = assess(board, config, &origin, neighbor, mode, combat_allowed);
        trace!(?direction, ?assessment, "neighbour assessed");
        if !assessment.is_acceptable() {
            continue;
        }
        let resource = board.cell(neighbor).resource;
        let remaining = topology.distance(neighbor, goal);
        let candidate = Candidate {
            direction,
            score: resource / (1 + remaining.unsigned_abs()),
        };
        if remaining < distance {
            closer.push(candidate);
        } else if mode.is_homebound() || f64::from(resource) >= detour_floor {
            attractive.push(candidate);
        }
    }

    let pool = if closer.is_empty() { &attractive } else { &closer };
    pick(pool, mode.is_homebound()).unwrap_or(Direction::Still)
}
