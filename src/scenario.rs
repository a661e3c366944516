//! JSON scenario files.
//!
//! A scenario is one turn seen by one player: the board, every unit, and
//! what each friendly unit wants to do. It is the input of `convoy resolve`
//! and the unit of work of `convoy bench`.

mod generate;

pub use generate::{GenerateOptions, generate_scenario};

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::TurnAnalysis;
use crate::board::{Board, Coord, Direction, PlayerId, Structure, StructureKind, Unit, UnitId};
use crate::config::NavConfig;
use crate::error::BoardError;
use crate::navigation::{Intent, Steer, TravelMode};

/// A structure entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSpec {
    /// Owning player.
    pub owner: PlayerId,
    /// Home or auxiliary.
    pub kind: StructureKind,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// A unit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Unit id, unique across all players.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Resource carried.
    #[serde(default)]
    pub carried: u32,
}

/// What one unit wants this turn.
///
/// Give either `direction` or `goal`. Without either, homebound units head
/// for their nearest structure and everyone else stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Unit the order is for.
    pub unit: UnitId,
    /// A fixed direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// A destination for the heuristic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Coord>,
    /// Travel mode.
    #[serde(default)]
    pub mode: TravelMode,
    /// Whether collisions with rivals are allowed. Defaults to the local
    /// balance of allies and rivals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat: Option<bool>,
}

/// One turn as a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Board width.
    pub width: i32,
    /// Board height.
    pub height: i32,
    /// Player the turn is planned for.
    pub me: PlayerId,
    /// Resource on every cell not covered by `resource`.
    #[serde(default)]
    pub fill: u32,
    /// Resource rows, `height` rows of `width` values. Empty means `fill` everywhere.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<Vec<u32>>,
    /// Structures; ids are assigned in list order.
    #[serde(default)]
    pub structures: Vec<StructureSpec>,
    /// Units of every player.
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    /// Orders for friendly units.
    #[serde(default)]
    pub orders: Vec<OrderSpec>,
    /// Tunables; missing fields take their defaults.
    #[serde(default)]
    pub config: NavConfig,
}

/// Errors loading or interpreting a scenario.
#[derive(Debug)]
pub enum ScenarioError {
    /// Reading or writing the file failed.
    Io(std::io::Error),
    /// The document is not a valid scenario.
    Parse(serde_json::Error),
    /// The board could not be built.
    Board(BoardError),
    /// An order names a unit that is not in the scenario.
    UnknownUnit(UnitId),
    /// The scenario is well-formed JSON but inconsistent.
    Invalid {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "scenario I/O error: {e}"),
            Self::Parse(e) => write!(f, "scenario parse error: {e}"),
            Self::Board(e) => write!(f, "scenario board error: {e}"),
            Self::UnknownUnit(id) => write!(f, "order for unknown unit {id}"),
            Self::Invalid { reason } => write!(f, "invalid scenario: {reason}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Board(e) => Some(e),
            Self::UnknownUnit(_) | Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<BoardError> for ScenarioError {
    fn from(e: BoardError) -> Self {
        Self::Board(e)
    }
}

fn invalid(reason: impl Into<String>) -> ScenarioError {
    ScenarioError::Invalid {
        reason: reason.into(),
    }
}

impl Scenario {
    /// An empty scenario with default tunables.
    #[must_use]
    pub fn new(width: i32, height: i32, me: PlayerId) -> Self {
        Self {
            width,
            height,
            me,
            fill: 0,
            resource: Vec::new(),
            structures: Vec::new(),
            units: Vec::new(),
            orders: Vec::new(),
            config: NavConfig::default(),
        }
    }

    /// Parse a scenario from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] on malformed input.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the scenario as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a scenario file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Write the scenario to a file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn check_in_bounds(&self, what: &str, x: i32, y: i32) -> Result<(), ScenarioError> {
        if (0..self.width).contains(&x) && (0..self.height).contains(&y) {
            Ok(())
        } else {
            Err(invalid(format!(
                "{what} at ({x}, {y}) is outside the {}x{} board",
                self.width, self.height
            )))
        }
    }

    /// Build the board this scenario describes.
    ///
    /// # Errors
    ///
    /// Fails on bad dimensions, ragged resource rows, out-of-bounds entries,
    /// duplicate ids, stacked structures, two units on one cell, or a unit
    /// carrying more than the configured capacity.
    pub fn build_board(&self) -> Result<Board, ScenarioError> {
        let mut board = Board::new(self.width, self.height, self.me)?;
        board.set_move_cost_ratio(self.config.move_cost_ratio);

        if self.resource.is_empty() {
            for y in 0..self.height {
                for x in 0..self.width {
                    board.set_resource(Coord::new(x, y), self.fill);
                }
            }
        } else {
            if self.resource.len() != usize::try_from(self.height).unwrap_or(0) {
                return Err(invalid(format!(
                    "expected {} resource rows, got {}",
                    self.height,
                    self.resource.len()
                )));
            }
            for (y, row) in (0..self.height).zip(&self.resource) {
                if row.len() != usize::try_from(self.width).unwrap_or(0) {
                    return Err(invalid(format!(
                        "resource row {y} has {} values, expected {}",
                        row.len(),
                        self.width
                    )));
                }
                for (x, &amount) in (0..self.width).zip(row) {
                    board.set_resource(Coord::new(x, y), amount);
                }
            }
        }

        for (id, entry) in (0..).zip(&self.structures) {
            self.check_in_bounds("structure", entry.x, entry.y)?;
            board.add_structure(Structure::new(id, entry.owner, Coord::new(entry.x, entry.y), entry.kind))?;
        }

        for entry in &self.units {
            self.check_in_bounds("unit", entry.x, entry.y)?;
            if entry.carried > self.config.capacity {
                return Err(BoardError::OverCapacity {
                    unit: entry.id,
                    carried: entry.carried,
                    capacity: self.config.capacity,
                }
                .into());
            }
            board.add_unit(Unit::new(entry.id, entry.owner, Coord::new(entry.x, entry.y), entry.carried))?;
        }

        for order in &self.orders {
            if board.unit(order.unit).is_none() {
                return Err(ScenarioError::UnknownUnit(order.unit));
            }
            if order.direction.is_some() && order.goal.is_some() {
                return Err(invalid(format!(
                    "order for unit {} has both a direction and a goal",
                    order.unit
                )));
            }
        }

        Ok(board)
    }

    /// Turn the orders into navigation intents for `board`.
    ///
    /// Missing goals and combat flags come from a fresh [`TurnAnalysis`].
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnknownUnit`] if an order names a unit that
    /// is not on `board`.
    pub fn plan(&self, board: &Board) -> Result<Vec<Intent>, ScenarioError> {
        let analysis = TurnAnalysis::compute(board, &self.config);
        self.orders
            .iter()
            .map(|order| {
                let unit = board
                    .unit(order.unit)
                    .ok_or(ScenarioError::UnknownUnit(order.unit))?;
                let goal = order.goal.or_else(|| {
                    if order.mode.is_homebound() {
                        analysis.nearest_structure(unit.position)
                    } else {
                        None
                    }
                });
                let steer = match (order.direction, goal) {
                    (Some(direction), _) => Steer::Fixed(direction),
                    (None, Some(goal)) => Steer::Toward {
                        goal,
                        combat_allowed: order
                            .combat
                            .unwrap_or_else(|| analysis.combat_favourable(unit.position)),
                    },
                    (None, None) => Steer::Fixed(Direction::Still),
                };
                Ok(Intent {
                    unit: order.unit,
                    steer,
                    mode: order.mode,
                })
            })
            .collect()
    }
}
