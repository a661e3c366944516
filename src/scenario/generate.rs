//! Deterministic random scenarios.

use std::collections::BTreeSet;

use crate::board::{Coord, Direction, PlayerId, StructureKind, UnitId};
use crate::config::NavConfig;
use crate::navigation::TravelMode;
use crate::scenario::{OrderSpec, Scenario, ScenarioError, StructureSpec, UnitSpec};

/// Simple xorshift64 RNG for deterministic generation.
#[derive(Debug, Clone)]
struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed.
    const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate random u32 in [0, max).
    #[allow(clippy::cast_possible_truncation)]
    fn next_u32(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(max)) as u32
    }

    /// Random coordinate component in [0, bound).
    fn next_i32(&mut self, bound: i32) -> i32 {
        let max = u32::try_from(bound).unwrap_or(0);
        i32::try_from(self.next_u32(max)).unwrap_or(0)
    }

    /// True with probability `percent` / 100.
    fn chance(&mut self, percent: u32) -> bool {
        self.next_u32(100) < percent
    }
}

/// Shape of a generated scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Board width.
    pub width: i32,
    /// Board height.
    pub height: i32,
    /// Number of players (2-4); player 0 is `me`.
    pub players: u8,
    /// Units per player.
    pub units_per_player: u32,
    /// Largest resource amount on a single cell.
    pub max_resource: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            players: 2,
            units_per_player: 12,
            max_resource: 1000,
        }
    }
}

/// Generate a scenario for player 0.
///
/// Home structures sit on a ring around the board centre, resource is
/// clustered around random seeds, and every friendly unit gets an order:
/// mostly goals, some fixed directions, a few returning or rushing home.
///
/// # Errors
///
/// Fails if the dimensions are not positive, the player count is outside
/// 2-4, or the units do not fit on the board.
pub fn generate_scenario(seed: u64, options: GenerateOptions) -> Result<Scenario, ScenarioError> {
    let GenerateOptions {
        width,
        height,
        players,
        units_per_player,
        max_resource,
    } = options;

    if width <= 0 || height <= 0 {
        return Err(ScenarioError::Invalid {
            reason: format!("invalid board dimensions {width}x{height}"),
        });
    }
    if !(2..=4).contains(&players) {
        return Err(ScenarioError::Invalid {
            reason: format!("need 2-4 players, got {players}"),
        });
    }
    let area = i64::from(width) * i64::from(height);
    let needed = i64::from(players) * (i64::from(units_per_player) + 1);
    if needed > area {
        return Err(ScenarioError::Invalid {
            reason: format!("{needed} units and structures do not fit on {area} cells"),
        });
    }

    let mut rng = Rng::new(seed);
    let mut scenario = Scenario::new(width, height, 0);
    scenario.config = NavConfig {
        turn_budget_ms: 0,
        ..NavConfig::default()
    };
    scenario.resource = resource_field(&mut rng, width, height, max_resource);

    let mut taken: BTreeSet<Coord> = BTreeSet::new();
    let homes = home_positions(width, height, players);
    for (owner, &home) in (0..).zip(&homes) {
        taken.insert(home);
        scenario.structures.push(StructureSpec {
            owner,
            kind: StructureKind::Shipyard,
            x: home.x,
            y: home.y,
        });
    }

    let mut next_id: UnitId = 0;
    for owner in 0..players {
        for _ in 0..units_per_player {
            let position = free_cell(&mut rng, &taken, width, height);
            taken.insert(position);
            let carried = rng.next_u32(scenario.config.capacity + 1);
            scenario.units.push(UnitSpec {
                id: next_id,
                owner,
                x: position.x,
                y: position.y,
                carried,
            });
            next_id += 1;
        }
    }

    let me: PlayerId = 0;
    let mine: Vec<UnitSpec> = scenario.units.iter().filter(|u| u.owner == me).copied().collect();
    for unit in mine {
        scenario.orders.push(random_order(&mut rng, unit, width, height));
    }

    Ok(scenario)
}

/// Resource clustered around random peaks.
fn resource_field(rng: &mut Rng, width: i32, height: i32, max_resource: u32) -> Vec<Vec<u32>> {
    let peaks: Vec<(Coord, u32)> = (0..(width * height / 48).max(1))
        .map(|_| {
            let peak = Coord::new(rng.next_i32(width), rng.next_i32(height));
            (peak, rng.next_u32(max_resource + 1))
        })
        .collect();

    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    let here = Coord::new(x, y);
                    let best = peaks
                        .iter()
                        .map(|&(peak, amount)| {
                            let dx = (peak.x - here.x).abs().min(width - (peak.x - here.x).abs());
                            let dy = (peak.y - here.y).abs().min(height - (peak.y - here.y).abs());
                            amount / (1 + (dx + dy).unsigned_abs())
                        })
                        .max()
                        .unwrap_or(0);
                    let noise = rng.next_u32(max_resource / 20 + 1);
                    best.saturating_add(noise).min(max_resource)
                })
                .collect()
        })
        .collect()
}

/// Home structures spread evenly around the board.
fn home_positions(width: i32, height: i32, players: u8) -> Vec<Coord> {
    let (qx, qy) = (width / 4, height / 4);
    let (cx, cy) = (width / 2, height / 2);
    let ring = [
        Coord::new(qx, qy),
        Coord::new(width - 1 - qx, height - 1 - qy),
        Coord::new(width - 1 - qx, qy),
        Coord::new(qx, height - 1 - qy),
    ];
    let mut homes: Vec<Coord> = Vec::with_capacity(usize::from(players));
    for &candidate in ring.iter().take(usize::from(players)) {
        // Degenerate boards can map several corners onto one cell.
        let mut home = candidate;
        let mut step = 0;
        while homes.contains(&home) {
            step += 1;
            home = Coord::new((cx + step) % width, (cy + step / width) % height);
        }
        homes.push(home);
    }
    homes
}

fn free_cell(rng: &mut Rng, taken: &BTreeSet<Coord>, width: i32, height: i32) -> Coord {
    for _ in 0..64 {
        let candidate = Coord::new(rng.next_i32(width), rng.next_i32(height));
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
    // Crowded board: scan from a random start.
    let start = rng.next_i32(width * height);
    (0..width * height)
        .map(|i| {
            let cell = (start + i) % (width * height);
            Coord::new(cell % width, cell / width)
        })
        .find(|c| !taken.contains(c))
        .unwrap_or(Coord::new(0, 0))
}

fn random_order(rng: &mut Rng, unit: UnitSpec, width: i32, height: i32) -> OrderSpec {
    let mut order = OrderSpec {
        unit: unit.id,
        direction: None,
        goal: None,
        mode: TravelMode::Normal,
        combat: None,
    };
    match rng.next_u32(10) {
        0..=5 => {
            order.goal = Some(Coord::new(rng.next_i32(width), rng.next_i32(height)));
            if rng.chance(20) {
                order.combat = Some(rng.chance(50));
            }
        }
        6 | 7 => {
            order.mode = TravelMode::Returning;
        }
        8 => {
            order.mode = TravelMode::FinalRush;
        }
        _ => {
            let choices = [
                Direction::North,
                Direction::South,
                Direction::East,
                Direction::West,
                Direction::Still,
            ];
            let pick = usize::try_from(rng.next_u32(5)).unwrap_or(0);
            order.direction = choices.get(pick).copied();
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = Rng::new(12345);
        let mut rng2 = Rng::new(12345);
        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_rng_zero_seed() {
        let mut rng = Rng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_generation_determinism() {
        let a = generate_scenario(7, GenerateOptions::default()).unwrap();
        let b = generate_scenario(7, GenerateOptions::default()).unwrap();
        assert_eq!(a, b);
        let c = generate_scenario(8, GenerateOptions::default()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_generated_scenario_builds() {
        for seed in 0..20 {
            let scenario = generate_scenario(seed, GenerateOptions::default()).unwrap();
            let board = scenario.build_board().unwrap();
            assert_eq!(board.units().count(), 24);
            assert_eq!(scenario.orders.len(), 12);
            assert!(board.home(0).is_some());
            assert!(board.home(1).is_some());
            scenario.plan(&board).unwrap();
        }
    }

    #[test]
    fn test_generation_on_tiny_board() {
        let options = GenerateOptions {
            width: 3,
            height: 3,
            players: 4,
            units_per_player: 1,
            max_resource: 50,
        };
        let scenario = generate_scenario(3, options).unwrap();
        let board = scenario.build_board().unwrap();
        assert_eq!(board.structures().count(), 4);
        assert_eq!(board.units().count(), 4);
    }

    #[test]
    fn test_generation_rejects_bad_options() {
        let too_many = GenerateOptions {
            width: 4,
            height: 4,
            players: 2,
            units_per_player: 8,
            max_resource: 10,
        };
        assert!(generate_scenario(1, too_many).is_err());

        let one_player = GenerateOptions {
            players: 1,
            ..GenerateOptions::default()
        };
        assert!(generate_scenario(1, one_player).is_err());
    }
}
