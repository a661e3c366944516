//! Turn commands and their protocol text.

use std::fmt;

use crate::board::{Direction, UnitId};

/// A command issued for one turn.
///
/// Only [`Command::Move`] is produced by resolution; the other variants are
/// issued by the strategy and economy layers and share the same rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Move a unit one step, or hold it in place with [`Direction::Still`].
    Move {
        /// Unit being moved.
        unit: UnitId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Convert a unit into an auxiliary structure where it stands.
    Construct {
        /// Unit being converted.
        unit: UnitId,
    },
    /// Spawn a new unit at the home structure.
    Spawn,
}

impl Command {
    /// Move or hold a unit.
    #[must_use]
    pub const fn move_unit(unit: UnitId, direction: Direction) -> Self {
        Self::Move { unit, direction }
    }

    /// Hold a unit in place.
    #[must_use]
    pub const fn stay(unit: UnitId) -> Self {
        Self::Move {
            unit,
            direction: Direction::Still,
        }
    }

    /// The unit the command addresses.
    #[must_use]
    pub const fn unit(&self) -> Option<UnitId> {
        match self {
            Self::Move { unit, .. } | Self::Construct { unit } => Some(*unit),
            Self::Spawn => None,
        }
    }

    /// The direction of a move command.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::Move { direction, .. } => Some(*direction),
            Self::Construct { .. } | Self::Spawn => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { unit, direction } => write!(f, "m {unit} {}", direction.wire_char()),
            Self::Construct { unit } => write!(f, "c {unit}"),
            Self::Spawn => f.write_str("g"),
        }
    }
}

/// Render a turn's commands as one protocol line.
#[must_use]
pub fn format_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tokens() {
        assert_eq!(Command::move_unit(4, Direction::North).to_string(), "m 4 n");
        assert_eq!(Command::stay(12).to_string(), "m 12 o");
        assert_eq!(Command::Construct { unit: 3 }.to_string(), "c 3");
        assert_eq!(Command::Spawn.to_string(), "g");
    }

    #[test]
    fn test_format_commands() {
        let commands = [
            Command::move_unit(1, Direction::West),
            Command::Spawn,
            Command::move_unit(2, Direction::East),
        ];
        assert_eq!(format_commands(&commands), "m 1 w g m 2 e");
        assert_eq!(format_commands(&[]), "");
    }

    #[test]
    fn test_command_accessors() {
        let cmd = Command::move_unit(8, Direction::South);
        assert_eq!(cmd.unit(), Some(8));
        assert_eq!(cmd.direction(), Some(Direction::South));
        assert_eq!(Command::Spawn.unit(), None);
        assert_eq!(Command::Construct { unit: 1 }.direction(), None);
    }
}
