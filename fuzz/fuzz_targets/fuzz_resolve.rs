#![no_main]

//! Turn resolution fuzzer.
//!
//! Builds a small crowded board from fuzzer input, steers every unit
//! (heuristic goals and raw directions mixed), resolves the turn and checks
//! that the result is conflict free.

use arbitrary::Arbitrary;
use convoy::navigation::TravelMode;
use convoy::{
    check_resolution, Board, Coord, Deadline, Direction, Intent, NavConfig, Navigator, Steer,
    Structure, StructureKind, Unit,
};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated unit with its request.
#[derive(Arbitrary, Debug)]
struct FuzzUnit {
    x: u8,
    y: u8,
    rival: bool,
    carried: u16,
    /// Low bits pick a direction; `None` means steer towards `goal`.
    direction: Option<u8>,
    goal: (u8, u8),
    mode: u8,
    combat: bool,
}

/// Structured input for one turn.
#[derive(Arbitrary, Debug)]
struct TurnInput {
    width: u8,
    height: u8,
    resource: Vec<u16>,
    structures: Vec<(u8, u8, bool)>,
    units: Vec<FuzzUnit>,
}

const DIRECTIONS: [Direction; 5] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::Still,
];

fuzz_target!(|input: TurnInput| {
    let width = i32::from(input.width % 12) + 1;
    let height = i32::from(input.height % 12) + 1;
    let Ok(mut board) = Board::new(width, height, 0) else {
        return;
    };
    let topology = *board.topology();

    for (i, &amount) in input.resource.iter().enumerate().take(topology.area()) {
        board.set_resource(topology.coord_at(i), u32::from(amount));
    }
    for (id, &(x, y, rival)) in (0..).zip(input.structures.iter().take(8)) {
        let at = Coord::new(i32::from(x) % width, i32::from(y) % height);
        let _ = board.add_structure(Structure::new(id, u8::from(rival), at, StructureKind::Dropoff));
    }

    let mut intents = Vec::new();
    for (id, unit) in (0..).zip(input.units.iter().take(64)) {
        let at = Coord::new(i32::from(unit.x) % width, i32::from(unit.y) % height);
        let carried = u32::from(unit.carried) % 1001;
        // Stacked units are rejected; skip them.
        if board.add_unit(Unit::new(id, u8::from(unit.rival), at, carried)).is_err() || unit.rival {
            continue;
        }
        let steer = match unit.direction {
            Some(d) => Steer::Fixed(DIRECTIONS[usize::from(d % 5)]),
            None => Steer::Toward {
                goal: Coord::new(i32::from(unit.goal.0), i32::from(unit.goal.1)),
                combat_allowed: unit.combat,
            },
        };
        let mode = match unit.mode % 3 {
            0 => TravelMode::Normal,
            1 => TravelMode::Returning,
            _ => TravelMode::FinalRush,
        };
        intents.push(Intent { unit: id, steer, mode });
    }

    let navigator = Navigator::new(NavConfig::default());
    let resolution = navigator.plan_turn(&mut board, &intents, Deadline::none());

    let violations = check_resolution(&board, &resolution);
    assert!(violations.is_empty(), "{violations:?}");
    assert_eq!(
        resolution.commands.len() + resolution.termination.pending().len(),
        intents.len()
    );
});
