//! Coordinates, directions and wrap-around arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, BoardResult};

/// A coordinate on the board.
///
/// Coordinates may be un-normalised (negative or past the edge); every
/// board lookup goes through [`Topology::normalize`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one step away in `direction` (not normalised).
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single-step move, or staying in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards `y - 1`.
    North,
    /// Towards `y + 1`.
    South,
    /// Towards `x + 1`.
    East,
    /// Towards `x - 1`.
    West,
    /// No movement.
    Still,
}

impl Direction {
    /// The four cardinal directions in canonical order.
    ///
    /// Neighbour enumeration and every tie-break follow this order.
    pub const CARDINALS: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// The `(dx, dy)` step for this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::Still => (0, 0),
        }
    }

    /// The opposite direction. `Still` inverts to itself.
    #[must_use]
    pub const fn invert(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Still => Self::Still,
        }
    }

    /// Single-character token used by the turn protocol.
    #[must_use]
    pub const fn wire_char(self) -> char {
        match self {
            Self::North => 'n',
            Self::South => 's',
            Self::East => 'e',
            Self::West => 'w',
            Self::Still => 'o',
        }
    }

    /// Whether this direction actually moves.
    #[must_use]
    pub const fn is_move(self) -> bool {
        !matches!(self, Self::Still)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Still => "still",
        };
        f.write_str(name)
    }
}

/// Dimensions of a wrapped (toroidal) plane and the geometry on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    width: i32,
    height: i32,
}

impl Topology {
    /// Create a topology.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidDimensions`] if either side is not positive.
    pub const fn new(width: i32, height: i32) -> BoardResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width of the plane.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the plane.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells on the plane.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn area(&self) -> usize {
        // Both sides are positive by construction.
        self.width as usize * self.height as usize
    }

    /// Wrap a coordinate into `0..width` x `0..height`.
    #[must_use]
    #[inline]
    pub const fn normalize(&self, coord: Coord) -> Coord {
        Coord {
            x: coord.x.rem_euclid(self.width),
            y: coord.y.rem_euclid(self.height),
        }
    }

    /// Row-major index of a coordinate (normalised first).
    #[must_use]
    #[inline]
    #[allow(clippy::cast_sign_loss)]
    pub const fn index(&self, coord: Coord) -> usize {
        let c = self.normalize(coord);
        c.y as usize * self.width as usize + c.x as usize
    }

    /// Coordinate of a row-major index.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn coord_at(&self, index: usize) -> Coord {
        let width = self.width as usize;
        Coord {
            x: (index % width) as i32,
            y: (index / width) as i32,
        }
    }

    /// Manhattan distance accounting for wrap-around on both axes.
    #[must_use]
    #[inline]
    pub const fn distance(&self, a: Coord, b: Coord) -> i32 {
        let a = self.normalize(a);
        let b = self.normalize(b);
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        let wrapped_dx = if dx < self.width - dx { dx } else { self.width - dx };
        let wrapped_dy = if dy < self.height - dy { dy } else { self.height - dy };
        wrapped_dx + wrapped_dy
    }

    /// The four cardinal neighbours, normalised, in [`Direction::CARDINALS`] order.
    #[must_use]
    pub const fn neighbors(&self, coord: Coord) -> [(Direction, Coord); 4] {
        let [n, s, e, w] = Direction::CARDINALS;
        [
            (n, self.normalize(coord.offset(n))),
            (s, self.normalize(coord.offset(s))),
            (e, self.normalize(coord.offset(e))),
            (w, self.normalize(coord.offset(w))),
        ]
    }

    /// All coordinates within `radius` of `center`, sorted and de-duplicated.
    ///
    /// Membership is decided by [`Topology::distance`], so the result does
    /// not depend on scan order, and on small boards the wrapped scan
    /// cannot produce a cell twice.
    #[must_use]
    pub fn disc(&self, center: Coord, radius: i32) -> Vec<Coord> {
        if radius < 0 {
            return Vec::new();
        }
        // No wrapped distance exceeds this, so a larger radius adds nothing.
        let radius = radius.min(self.width / 2 + self.height / 2);
        let center = self.normalize(center);
        let mut cells = Vec::new();
        for dy in -radius..=radius {
            let reach = radius - dy.abs();
            for dx in -reach..=reach {
                let candidate = self.normalize(Coord::new(center.x + dx, center.y + dy));
                if self.distance(center, candidate) <= radius {
                    cells.push(candidate);
                }
            }
        }
        cells.sort_unstable();
        cells.dedup();
        cells
    }

    /// Direction from `source` towards an adjacent `neighbor`, wrap-aware.
    ///
    /// Returns [`Direction::Still`] when both normalise to the same cell.
    #[must_use]
    pub const fn direction_to_neighbor(&self, source: Coord, neighbor: Coord) -> Direction {
        let source = self.normalize(source);
        let neighbor = self.normalize(neighbor);
        let dx = (source.x - neighbor.x).abs();
        let dy = (source.y - neighbor.y).abs();
        let wrapped_dx = self.width - dx;
        let wrapped_dy = self.height - dy;

        if source.x < neighbor.x {
            if dx > wrapped_dx { Direction::West } else { Direction::East }
        } else if source.x > neighbor.x {
            if dx < wrapped_dx { Direction::West } else { Direction::East }
        } else if source.y < neighbor.y {
            if dy > wrapped_dy { Direction::North } else { Direction::South }
        } else if source.y > neighbor.y {
            if dy < wrapped_dy { Direction::North } else { Direction::South }
        } else {
            Direction::Still
        }
    }

    /// Directions that shorten the wrapped distance to `destination`,
    /// ignoring collisions. The x-axis direction (if any) comes first.
    #[must_use]
    pub fn unsafe_moves(&self, source: Coord, destination: Coord) -> Vec<Direction> {
        let source = self.normalize(source);
        let destination = self.normalize(destination);
        let dx = (source.x - destination.x).abs();
        let dy = (source.y - destination.y).abs();
        let wrapped_dx = self.width - dx;
        let wrapped_dy = self.height - dy;

        let mut moves = Vec::with_capacity(2);
        if source.x < destination.x {
            moves.push(if dx > wrapped_dx { Direction::West } else { Direction::East });
        } else if source.x > destination.x {
            moves.push(if dx < wrapped_dx { Direction::West } else { Direction::East });
        }
        if source.y < destination.y {
            moves.push(if dy > wrapped_dy { Direction::North } else { Direction::South });
        } else if source.y > destination.y {
            moves.push(if dy < wrapped_dy { Direction::North } else { Direction::South });
        }
        moves
    }
}
