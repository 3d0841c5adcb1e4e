//! Properties of the pure board passes, checked over seeded random boards.

use tile_match::core::gravity::{apply_gravity, refill};
use tile_match::core::matcher::has_match;
use tile_match::core::{
    find_matches, has_available_moves, Board, Cell, Goal, Goals, SeededRng, Tile, TileRng,
};
use tile_match::types::{Axis, Coord, Direction, ElementKind, GoalKind, HelperKind};

const SEEDS: u64 = 200;

/// A 7x6 board mixing free tiles, ice, boxes, helpers, holes and gaps.
fn random_board(seed: u64, kinds: usize, with_gaps: bool) -> Board {
    let mut rng = SeededRng::new(seed);
    let mut board = Board::new(7, 6);
    let all: Vec<Coord> = board.coords().collect();
    for at in all {
        match rng.pick(24) {
            0 => board.make_hole(at),
            1 => board.set(
                at,
                Cell::Box {
                    strength: 1 + rng.pick(2) as u8,
                },
            ),
            2 => board.set(
                at,
                Cell::Tile(Tile::iced(ElementKind(rng.pick(kinds) as u8), 1 + rng.pick(2) as u8)),
            ),
            3 => board.set(at, Cell::Tile(Tile::helper(HelperKind::ColorBomb))),
            4 if with_gaps => board.set(at, Cell::Empty),
            _ => board.set(at, Cell::Tile(Tile::element(ElementKind(rng.pick(kinds) as u8)))),
        }
    }
    board
}

#[test]
fn matches_only_contain_free_element_tiles_of_the_group_kind() {
    for seed in 0..SEEDS {
        let board = random_board(seed, 3, true);
        for group in find_matches(&board) {
            assert!(group.len() >= 3, "seed {seed}: short group {group:?}");
            for at in &group.cells {
                let cell = board.get(*at);
                assert_eq!(cell.matchable_kind(), Some(group.kind), "seed {seed} at {at:?}");
                assert!(!cell.is_obstacle());
                assert!(cell.helper_kind().is_none());
            }
        }
    }
}

#[test]
fn a_tile_joins_at_most_one_group_per_axis() {
    for seed in 0..SEEDS {
        let board = random_board(seed, 3, false);
        let groups = find_matches(&board);
        for at in board.coords() {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                let n = groups
                    .iter()
                    .filter(|g| g.axis == axis && g.contains(at))
                    .count();
                assert!(n <= 1, "seed {seed}: {at:?} in {n} {axis:?} groups");
            }
        }
    }
}

#[test]
fn find_matches_is_repeatable_and_agrees_with_has_match() {
    for seed in 0..SEEDS {
        let board = random_board(seed, 4, true);
        let first = find_matches(&board);
        assert_eq!(first, find_matches(&board), "seed {seed}");
        assert_eq!(!first.is_empty(), has_match(&board), "seed {seed}");
    }
}

#[test]
fn gravity_compacts_and_is_stable() {
    for seed in 0..SEEDS {
        let mut board = random_board(seed, 4, true);
        let holes: Vec<Coord> = board.coords().filter(|c| board.is_hole(*c)).collect();
        let occupied = board.coords().filter(|c| board.get(*c).is_occupied()).count();

        apply_gravity(&mut board);
        let settled = board.clone();

        assert!(apply_gravity(&mut board).is_empty(), "seed {seed}");
        assert_eq!(board, settled);
        assert_eq!(board.coords().filter(|c| board.get(*c).is_occupied()).count(), occupied);
        assert_eq!(board.coords().filter(|c| board.is_hole(*c)).collect::<Vec<_>>(), holes);

        // No gap sits below an occupied cell in the same column.
        for col in 0..board.cols() as i8 {
            let mut seen_occupied = false;
            for row in 0..board.rows() as i8 {
                let cell = board.get(Coord::new(col, row));
                if cell.is_occupied() {
                    seen_occupied = true;
                } else if cell.is_empty() {
                    assert!(!seen_occupied, "seed {seed}: gap under a tile in column {col}");
                }
            }
        }
    }
}

#[test]
fn refill_fills_every_gap_and_skips_holes() {
    for seed in 0..SEEDS {
        let mut board = random_board(seed, 4, true);
        let holes = board.coords().filter(|c| board.is_hole(*c)).count();
        apply_gravity(&mut board);
        let gaps = board.count_empty();

        let mut rng = SeededRng::new(seed + 1);
        let spawned = refill(&mut board, 4, &mut rng);

        assert_eq!(spawned.len(), gaps);
        assert_eq!(board.count_empty(), 0);
        assert_eq!(board.coords().filter(|c| board.is_hole(*c)).count(), holes);
        assert!(spawned.iter().all(|(_, kind)| kind.0 < 4));
    }
}

/// Every swap a player could make, tried on a scratch copy.
fn any_swap_matches(board: &Board) -> bool {
    let mut scratch = board.clone();
    for at in board.coords() {
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let other = at.step(dir);
            let both_free = board.get(at).is_swappable()
                && board.try_get(other).is_some_and(|c| c.is_swappable());
            if !both_free {
                continue;
            }
            scratch.swap(at, other);
            let found = has_match(&scratch);
            scratch.swap(at, other);
            if found {
                return true;
            }
        }
    }
    false
}

#[test]
fn deadlock_detection_matches_exhaustive_search() {
    for seed in 0..SEEDS {
        // Six kinds deadlock often enough to exercise both answers.
        let board = random_board(seed, 6, false);
        if has_match(&board) {
            continue;
        }
        assert_eq!(has_available_moves(&board), any_swap_matches(&board), "seed {seed}");
    }

    let stuck = Board::from_ascii(
        "A B C D
         C D A B
         A B C D
         C D A B",
    )
    .unwrap();
    assert!(!has_available_moves(&stuck));
    assert!(!any_swap_matches(&stuck));
}

#[test]
fn goal_credit_counts_down_and_clamps() {
    let a = GoalKind::Element(ElementKind(0));
    let mut goals = Goals::new(vec![Goal::new(a, 5), Goal::new(GoalKind::BoxCleared, 2)]);

    assert_eq!(goals.credit(a, 3), Some(2));
    assert_eq!(goals.credit(a, 3), Some(0));
    assert_eq!(goals.credit(a, 1), None);
    assert_eq!(goals.remaining(a), Some(0));
    assert_eq!(goals.credit(GoalKind::Element(ElementKind(3)), 4), None);
    assert!(!goals.all_complete());
    assert_eq!(goals.credit(GoalKind::BoxCleared, 2), Some(0));
    assert!(goals.all_complete());
}
