//! Property-based tests for geometry, the heuristic and resolution.
//!
//! Run with: cargo test --release prop_navigation

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::time::Instant;

use proptest::prelude::*;

use convoy::navigation::{Assessment, assess_neighbor};
use convoy::{
    Board, Coord, Deadline, Direction, NavConfig, Order, Termination, Topology, TravelMode, Unit,
    check_resolution, resolve, select_direction,
};

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::South),
        Just(Direction::East),
        Just(Direction::West),
        Just(Direction::Still),
    ]
}

fn mode_strategy() -> impl Strategy<Value = TravelMode> {
    prop_oneof![
        Just(TravelMode::Normal),
        Just(TravelMode::Returning),
        Just(TravelMode::FinalRush),
    ]
}

/// A crowded board: units of two players placed on distinct cells.
///
/// Unit ids follow placement order; even ids belong to player 0.
fn crowded_board(
    width: i32,
    height: i32,
    resource: &[u32],
    cells: &[usize],
    carried: &[u32],
) -> Board {
    let mut board = Board::new(width, height, 0).unwrap();
    let topology = *board.topology();
    for (i, &amount) in resource.iter().enumerate().take(topology.area()) {
        board.set_resource(topology.coord_at(i), amount);
    }
    let mut used = Vec::new();
    for (id, (&cell, &load)) in (0u32..).zip(cells.iter().zip(carried)) {
        let index = cell % topology.area();
        if used.contains(&index) {
            continue;
        }
        used.push(index);
        let owner = u8::from(id % 2 == 1);
        board
            .add_unit(Unit::new(id, owner, topology.coord_at(index), load))
            .unwrap();
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Normalising twice is the same as normalising once.
    #[test]
    fn prop_normalize_idempotent(
        w in 1i32..64,
        h in 1i32..64,
        x in -1000i32..1000,
        y in -1000i32..1000
    ) {
        let t = Topology::new(w, h).unwrap();
        let once = t.normalize(Coord::new(x, y));
        prop_assert_eq!(t.normalize(once), once);
        prop_assert!((0..w).contains(&once.x));
        prop_assert!((0..h).contains(&once.y));
    }

    /// Distance is symmetric, zero exactly on the same cell, and bounded.
    #[test]
    fn prop_distance_symmetric(
        w in 1i32..64,
        h in 1i32..64,
        ax in -200i32..200,
        ay in -200i32..200,
        bx in -200i32..200,
        by in -200i32..200
    ) {
        let t = Topology::new(w, h).unwrap();
        let a = Coord::new(ax, ay);
        let b = Coord::new(bx, by);
        let d = t.distance(a, b);
        prop_assert_eq!(d, t.distance(b, a));
        prop_assert_eq!(t.distance(a, a), 0);
        prop_assert_eq!(d == 0, t.normalize(a) == t.normalize(b));
        prop_assert!(d <= w / 2 + h / 2);
    }

    /// Every neighbour is exactly one step away on boards wide enough to tell.
    #[test]
    fn prop_neighbors_adjacent(
        w in 3i32..40,
        h in 3i32..40,
        x in -50i32..50,
        y in -50i32..50
    ) {
        let t = Topology::new(w, h).unwrap();
        let c = Coord::new(x, y);
        for (dir, n) in t.neighbors(c) {
            prop_assert_eq!(t.distance(c, n), 1);
            prop_assert_eq!(t.direction_to_neighbor(c, n), dir);
        }
    }

    /// A disc holds its centre, only cells within the radius, and grows with it.
    #[test]
    fn prop_disc_monotone(
        w in 1i32..24,
        h in 1i32..24,
        x in 0i32..24,
        y in 0i32..24,
        r in 0i32..10
    ) {
        let t = Topology::new(w, h).unwrap();
        let c = t.normalize(Coord::new(x, y));
        prop_assert_eq!(t.disc(c, 0), vec![c]);

        let small = t.disc(c, r);
        let large = t.disc(c, r + 1);
        prop_assert!(small.len() <= large.len());
        prop_assert!(small.iter().all(|p| t.distance(c, *p) <= r));
        prop_assert!(small.iter().all(|p| large.contains(p)));
        prop_assert!(small.len() <= t.area());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The heuristic only ever steps into a neighbour it finds acceptable.
    #[test]
    fn prop_heuristic_respects_predicate(
        resource in prop::collection::vec(0u32..1000, 100),
        cells in prop::collection::vec(0usize..100, 1..30),
        carried in prop::collection::vec(0u32..1000, 30),
        gx in 0i32..10,
        gy in 0i32..10,
        mode in mode_strategy(),
        combat in any::<bool>()
    ) {
        let board = crowded_board(10, 10, &resource, &cells, &carried);
        let config = NavConfig::default();
        let start = board.unit(0).unwrap().position;
        let goal = Coord::new(gx, gy);

        let dir = select_direction(&board, &config, start, goal, mode, combat);
        if dir != Direction::Still {
            let target = board.topology().normalize(start.offset(dir));
            let verdict = assess_neighbor(&board, &config, start, target, mode, combat);
            prop_assert!(
                matches!(verdict, Assessment::Accepted(_)),
                "{:?} into {} was {:?}",
                dir,
                target,
                verdict
            );
        }
    }

    /// Resolution never puts two friendly units on one ordinary cell.
    #[test]
    fn prop_resolve_keeps_invariants(
        resource in prop::collection::vec(0u32..300, 64),
        cells in prop::collection::vec(0usize..64, 1..40),
        carried in prop::collection::vec(0u32..1000, 40),
        directions in prop::collection::vec(direction_strategy(), 40),
        modes in prop::collection::vec(mode_strategy(), 40)
    ) {
        let mut board = crowded_board(8, 8, &resource, &cells, &carried);
        let orders: Vec<Order> = board
            .units()
            .zip(directions.iter().zip(&modes))
            .map(|(u, (&d, &m))| Order::new(u.id, d, m))
            .collect();

        let resolution = resolve(&mut board, &orders, Deadline::none());
        let violations = check_resolution(&board, &resolution);
        prop_assert!(violations.is_empty(), "{:?}", violations);

        // Every ordered friendly unit is either commanded or reported pending.
        let friendly = orders
            .iter()
            .filter(|o| board.unit(o.unit).is_some_and(|u| u.owner == 0))
            .count();
        prop_assert_eq!(
            resolution.commands.len() + resolution.termination.pending().len(),
            friendly
        );
    }

    /// Identical inputs give identical outputs.
    #[test]
    fn prop_resolve_deterministic(
        resource in prop::collection::vec(0u32..300, 64),
        cells in prop::collection::vec(0usize..64, 1..40),
        carried in prop::collection::vec(0u32..1000, 40),
        directions in prop::collection::vec(direction_strategy(), 40)
    ) {
        let board = crowded_board(8, 8, &resource, &cells, &carried);
        let orders: Vec<Order> = board
            .units()
            .zip(&directions)
            .map(|(u, &d)| Order::new(u.id, d, TravelMode::Normal))
            .collect();

        let mut first = board.clone();
        let mut second = board.clone();
        let a = resolve(&mut first, &orders, Deadline::none());
        let b = resolve(&mut second, &orders, Deadline::none());
        prop_assert_eq!(a, b);
    }

    /// An expired deadline returns at once, with no commands, and leaves the board alone.
    #[test]
    fn prop_expired_deadline(
        cells in prop::collection::vec(0usize..64, 1..40),
        carried in prop::collection::vec(0u32..1000, 40),
        directions in prop::collection::vec(direction_strategy(), 40)
    ) {
        let board = crowded_board(8, 8, &[], &cells, &carried);
        let orders: Vec<Order> = board
            .units()
            .zip(&directions)
            .map(|(u, &d)| Order::new(u.id, d, TravelMode::Normal))
            .collect();

        let mut after = board.clone();
        let resolution = resolve(&mut after, &orders, Deadline::at(Instant::now()));
        prop_assert!(resolution.commands.is_empty());
        prop_assert_eq!(resolution.passes, 0);
        prop_assert!(after.units().all(|u| !u.moved));
        // Unit 0 is always friendly, so something was left pending.
        prop_assert!(
            matches!(resolution.termination, Termination::DeadlineExceeded { .. }),
            "expected DeadlineExceeded, got {:?}",
            resolution.termination
        );
    }
}
