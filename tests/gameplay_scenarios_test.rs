//! End-to-end gameplay on hand-built boards with scripted refills.
//!
//! Refill kinds come from a `SequenceRng`, so every board below is fully
//! determined by the gesture sequence.

use tile_match::core::effects::{ChangeLog, EffectLog};
use tile_match::core::{
    has_available_moves, ActionOutcome, Board, BoosterInventory, Cell, GameState,
    LevelDefinition, Outcome, RecordingEffects, RecordingSink, SequenceRng,
};
use tile_match::types::{
    BoosterKind, Coord, Direction, Effect, ElementKind, Gesture, GoalKind, HelperKind,
    ObstacleKind, StateChange, BONUS_PER_MOVE,
};

const A: ElementKind = ElementKind(0);
const B: ElementKind = ElementKind(1);
const C: ElementKind = ElementKind(2);
const E: ElementKind = ElementKind(4);

/// No runs, no moves spent; A appears nowhere.
const BASE: &str = "B C B D E B C D
                    D B C E B C D E
                    E D E C D E B C
                    C E D B C D E B
                    B C B D E B C D
                    D B C E B C D E
                    E D E C D E B C
                    C E D B C D E B";

/// Swiping (1,2) right completes A A A on row 2, columns 2..4.
const RUN_OF_THREE: &str = "B C B D E B C D
                            D B C E B C D E
                            E A E A A E B C
                            C E D B C D E B
                            B C B D E B C D
                            D B C E B C D E
                            E D E C D E B C
                            C E D B C D E B";

/// Swiping (2,1) down completes A A A A on row 2, columns 1..4.
const RUN_OF_FOUR: &str = "B C B D E B C D
                           D B A E B C D E
                           E A E A A E B C
                           C E D B C D E B
                           B C B D E B C D
                           D B C E B C D E
                           E D E C D E B C
                           C E D B C D E B";

/// A strength-2 box under row 6. Swiping (1,6) right matches above it; the
/// drop then lines up a second match for (3,5) down.
const BOXED: &str = "B C B D E B C D
                     D B C E B C D E
                     E D E C D E B C
                     C E D B C D E B
                     B C B A E B C D
                     D B A E A C D E
                     E A E A A E B C
                     C E D [2] C D E B";

/// Only A and B, with a color bomb in the middle.
const BOMB: &str = "A A B B A
                    B B A A B
                    A A @ B A
                    B B A A B
                    A A B B A";

/// `board` with the tokens at the given cells replaced.
fn patched(board: &str, cells: &[((usize, usize), &str)]) -> String {
    let mut rows: Vec<Vec<&str>> = board
        .lines()
        .map(|line| line.split_whitespace().collect())
        .collect();
    for &((col, row), token) in cells {
        rows[row][col] = token;
    }
    rows.iter().map(|r| r.join(" ")).collect::<Vec<_>>().join("\n")
}

fn c(col: i8, row: i8) -> Coord {
    Coord::new(col, row)
}

fn level(cols: u8, rows: u8, elements: &[&str], moves: u32, goals: &[(&str, u32)]) -> LevelDefinition {
    let json = serde_json::json!({
        "id": 900,
        "name": "scenario",
        "cols": cols,
        "rows": rows,
        "moves": moves,
        "elements": elements,
        "goals": goals
            .iter()
            .map(|(kind, count)| serde_json::json!({ "type": kind, "count": count }))
            .collect::<Vec<_>>(),
    });
    LevelDefinition::from_json(&json.to_string()).unwrap()
}

struct Scenario {
    game: GameState,
    effects: EffectLog,
    changes: ChangeLog,
}

fn scenario(board: &str, moves: u32, goals: &[(&str, u32)], refills: Vec<usize>) -> Scenario {
    let board = Board::from_ascii(board).unwrap();
    let level = if board.cols() == 8 {
        level(8, 8, &["a", "b", "c", "d", "e"], moves, goals)
    } else {
        level(board.cols(), board.rows(), &["a", "b", "c"], moves, goals)
    };
    let (fx, effects) = RecordingEffects::new();
    let (sink, changes) = RecordingSink::new();
    let game = GameState::with_board(level, board, Box::new(SequenceRng::new(refills)))
        .unwrap()
        .with_effects(fx)
        .with_sink(sink);
    Scenario {
        game,
        effects,
        changes,
    }
}

fn ascii(board: &str) -> String {
    Board::from_ascii(board).unwrap().to_ascii()
}

/// Removals played before the first drop: the triggering pass only.
fn first_pass_removals(effects: &EffectLog) -> Vec<(Coord, ElementKind)> {
    effects
        .borrow()
        .iter()
        .take_while(|(effect, _)| !matches!(effect, Effect::Drop { .. }))
        .filter_map(|(effect, _)| match effect {
            Effect::Remove { at, kind } => Some((*at, *kind)),
            _ => None,
        })
        .collect()
}

/// Helper activations in firing order.
fn flashes(effects: &EffectLog) -> Vec<(Coord, HelperKind)> {
    effects
        .borrow()
        .iter()
        .filter_map(|(effect, _)| match effect {
            Effect::HelperFlash { at, helper } => Some((*at, *helper)),
            _ => None,
        })
        .collect()
}

fn swipe(game: &mut GameState, at: Coord, dir: Direction) -> ActionOutcome {
    game.pointer(at, Gesture::Swipe(dir)).unwrap()
}

#[test]
fn completing_a_run_clears_it_and_spends_one_move() {
    let mut s = scenario(RUN_OF_THREE, 10, &[("a", 3), ("e", 50)], vec![0, 3, 0]);

    let out = swipe(&mut s.game, c(1, 2), Direction::Right);

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 1,
            removed: 3
        }
    );
    assert_eq!(s.game.moves_left(), 9);
    assert_eq!(s.game.goals().remaining(GoalKind::Element(A)), Some(0));
    assert_eq!(s.game.outcome(), Outcome::InProgress);
    assert_eq!(
        first_pass_removals(&s.effects),
        vec![(c(2, 2), A), (c(3, 2), A), (c(4, 2), A)]
    );

    // Columns 2..4 dropped by one and row 0 was refilled A D A.
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "B C A D A B C D
             D B B D E C D E
             E E C E B E B C
             C E D B C D E B
             B C B D E B C D
             D B C E B C D E
             E D E C D E B C
             C E D B C D E B"
        )
    );
    for at in [c(2, 2), c(3, 2), c(4, 2)] {
        assert_ne!(s.game.board().get(at).matchable_kind(), Some(A));
    }

    let changes = s.changes.borrow();
    assert!(changes.contains(&StateChange::MovesChanged { moves_left: 9 }));
    assert!(changes.contains(&StateChange::GoalProgress {
        goal: GoalKind::Element(A),
        remaining: 0
    }));
    assert!(changes.contains(&StateChange::ScoreChanged { score: 3 }));
}

#[test]
fn run_of_four_leaves_a_vertical_helper_on_the_swapped_cell() {
    let mut s = scenario(RUN_OF_FOUR, 10, &[("a", 10), ("e", 50)], vec![0]);

    let out = swipe(&mut s.game, c(2, 1), Direction::Down);

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 1,
            removed: 4
        }
    );
    assert_eq!(s.game.goals().remaining(GoalKind::Element(A)), Some(6));
    assert_eq!(
        first_pass_removals(&s.effects),
        vec![(c(1, 2), A), (c(2, 2), A), (c(3, 2), A), (c(4, 2), A)]
    );

    let spawns: Vec<_> = s
        .effects
        .borrow()
        .iter()
        .filter_map(|(effect, _)| match effect {
            Effect::HelperSpawn { at, helper } => Some((*at, *helper)),
            _ => None,
        })
        .collect();
    assert_eq!(spawns, vec![(c(2, 2), HelperKind::LineVertical)]);
    assert_eq!(
        s.game.board().get(c(2, 2)).helper_kind(),
        Some(HelperKind::LineVertical)
    );
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "B A B A A B C D
             D C E D E C D E
             E B | E B E B C
             C E D B C D E B
             B C B D E B C D
             D B C E B C D E
             E D E C D E B C
             C E D B C D E B"
        )
    );
}

#[test]
fn box_cracks_on_first_match_and_breaks_on_second() {
    let mut s = scenario(BOXED, 10, &[("box_full", 1), ("a", 20)], vec![4, 2, 0, 3, 1]);

    let out = swipe(&mut s.game, c(1, 6), Direction::Right);
    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 1,
            removed: 3
        }
    );
    assert_eq!(s.game.board().get(c(3, 7)), Cell::Box { strength: 1 });
    assert_eq!(s.game.goals().remaining(GoalKind::BoxCleared), Some(1));
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "B C E C A B C D
             D B B D E C D E
             E D C E B E B C
             C E E C D D E B
             B C D B C B C D
             D B B A E C D E
             E E A E A E B C
             C E D [1] C D E B"
        )
    );

    let out = swipe(&mut s.game, c(3, 5), Direction::Down);
    assert!(matches!(out, ActionOutcome::Resolved { moves_spent: 1, .. }));
    assert_eq!(s.game.goals().remaining(GoalKind::BoxCleared), Some(0));
    assert!(!s
        .game
        .snapshot()
        .cells
        .iter()
        .any(|cell| matches!(cell, Cell::Box { .. })));

    let box_credits = s
        .changes
        .borrow()
        .iter()
        .filter(|change| {
            matches!(
                change,
                StateChange::GoalProgress {
                    goal: GoalKind::BoxCleared,
                    ..
                }
            )
        })
        .count();
    assert_eq!(box_credits, 1);
}

#[test]
fn tapped_color_bomb_clears_one_neighbor_kind_everywhere() {
    // The first scripted pick chooses the left neighbor, an A.
    let mut s = scenario(BOMB, 5, &[("b", 30)], vec![0, 1, 2]);
    let a_cells: Vec<(Coord, ElementKind)> = s
        .game
        .board()
        .coords()
        .filter(|at| s.game.board().get(*at).matchable_kind() == Some(A))
        .map(|at| (at, A))
        .collect();
    assert_eq!(a_cells.len(), 13);

    let out = s.game.pointer(c(2, 2), Gesture::Tap).unwrap();

    match out {
        ActionOutcome::Resolved {
            moves_spent,
            removed,
        } => {
            assert_eq!(moves_spent, 1);
            assert!(removed >= 13);
        }
        other => panic!("expected a resolved activation, got {other:?}"),
    }
    assert_eq!(s.game.moves_left(), 4);
    assert!(matches!(
        s.effects.borrow().first(),
        Some((
            Effect::HelperFlash {
                helper: HelperKind::ColorBomb,
                ..
            },
            _
        ))
    ));
    // Every A went in the bomb's own strike; no B was touched by it.
    assert_eq!(first_pass_removals(&s.effects), a_cells);
    assert!(first_pass_removals(&s.effects).iter().all(|(_, kind)| *kind != B));
}

#[test]
fn last_move_with_goal_short_by_one_loses() {
    let mut s = scenario(RUN_OF_THREE, 1, &[("a", 4)], vec![0, 3, 0]);

    swipe(&mut s.game, c(1, 2), Direction::Right);

    assert_eq!(s.game.moves_left(), 0);
    assert_eq!(s.game.goals().remaining(GoalKind::Element(A)), Some(1));
    assert_eq!(s.game.outcome(), Outcome::Lost);
    let changes = s.changes.borrow();
    assert!(changes.contains(&StateChange::LevelLost));
    assert!(!changes.contains(&StateChange::LevelWon));
}

#[test]
fn last_move_completing_goal_wins_without_bonus() {
    let mut s = scenario(RUN_OF_THREE, 1, &[("a", 3)], vec![0, 3, 0]);

    swipe(&mut s.game, c(1, 2), Direction::Right);

    assert_eq!(s.game.outcome(), Outcome::Won);
    assert_eq!(s.game.score(), 3);
    assert_eq!(s.changes.borrow().last(), Some(&StateChange::LevelWon));
}

#[test]
fn early_win_converts_leftover_moves_to_bonus() {
    let mut s = scenario(RUN_OF_THREE, 3, &[("a", 3)], vec![0, 3, 0]);

    swipe(&mut s.game, c(1, 2), Direction::Right);

    assert_eq!(s.game.outcome(), Outcome::Won);
    assert_eq!(s.game.moves_left(), 0);
    assert_eq!(s.game.score(), 3 + 2 * BONUS_PER_MOVE);
    let bonus_ticks = s
        .effects
        .borrow()
        .iter()
        .filter(|(effect, _)| matches!(effect, Effect::MoveBonus { .. }))
        .count();
    assert_eq!(bonus_ticks, 2);
    assert_eq!(s.changes.borrow().last(), Some(&StateChange::LevelWon));

    // A finished level takes no more input.
    assert_eq!(
        s.game.pointer(c(0, 0), Gesture::Tap).unwrap(),
        ActionOutcome::Ignored
    );
}

#[test]
fn selection_taps_and_reverted_swap() {
    let mut s = scenario(BASE, 10, &[("e", 50)], vec![0]);
    let before = s.game.board().to_ascii();

    assert_eq!(
        s.game.pointer(c(0, 0), Gesture::Tap).unwrap(),
        ActionOutcome::Selected(c(0, 0))
    );
    assert_eq!(
        s.game.pointer(c(1, 0), Gesture::Tap).unwrap(),
        ActionOutcome::Reverted
    );
    assert_eq!(s.game.board().to_ascii(), before);
    assert_eq!(s.game.moves_left(), 10);
    assert_eq!(s.game.snapshot().selection, None);

    s.game.pointer(c(0, 0), Gesture::Tap).unwrap();
    assert_eq!(
        s.game.pointer(c(5, 5), Gesture::Tap).unwrap(),
        ActionOutcome::Selected(c(5, 5))
    );
    assert_eq!(
        s.game.pointer(c(5, 5), Gesture::Tap).unwrap(),
        ActionOutcome::Deselected
    );
    assert_eq!(
        swipe(&mut s.game, c(7, 0), Direction::Right),
        ActionOutcome::Ignored
    );
    assert!(!s.game.is_processing());
}

#[test]
fn hammer_clears_row_and_column_for_free() {
    let mut s = scenario(BASE, 10, &[("e", 50)], vec![4, 2, 0, 3, 1]);
    s.game = s.game.with_boosters(BoosterInventory::new(0, 1, 0));
    assert!(s.game.arm_booster(BoosterKind::Hammer));

    let out = s.game.pointer(c(3, 4), Gesture::Tap).unwrap();

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 0,
            removed: 15
        }
    );
    assert_eq!(s.game.moves_left(), 10);
    assert_eq!(s.game.goals().remaining(GoalKind::Element(E)), Some(47));
    assert_eq!(s.game.boosters().count(BoosterKind::Hammer), 0);
    assert_eq!(s.game.boosters().armed(), None);
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "E C A D B E C A
             B C B D E B C D
             D B C B B C D E
             E D E E D E B C
             C E D C C D E B
             D B C A B C D E
             E D E D D E B C
             C E D B C D E B"
        )
    );
    assert!(s.changes.borrow().contains(&StateChange::BoosterCount {
        booster: BoosterKind::Hammer,
        count: 0
    }));
}

#[test]
fn wand_removes_a_whole_box_and_credits_it() {
    let mut s = scenario(BOXED, 10, &[("box_full", 1), ("a", 20)], vec![4, 2, 0, 3, 1]);
    s.game = s.game.with_boosters(BoosterInventory::new(1, 0, 0));
    assert!(s.game.arm_booster(BoosterKind::Wand));

    let out = s.game.pointer(c(3, 7), Gesture::Tap).unwrap();

    assert!(matches!(out, ActionOutcome::Resolved { moves_spent: 0, .. }));
    assert_eq!(s.game.goals().remaining(GoalKind::BoxCleared), Some(0));
    assert_eq!(s.game.boosters().count(BoosterKind::Wand), 0);
    assert_eq!(s.game.moves_left(), 10);
    assert_eq!(s.game.outcome(), Outcome::InProgress);
}

#[test]
fn glove_swaps_distant_tiles_without_a_match() {
    let mut s = scenario(BASE, 10, &[("e", 50)], vec![0]);
    s.game = s.game.with_boosters(BoosterInventory::new(0, 0, 1));
    assert!(s.game.arm_booster(BoosterKind::Glove));

    s.game.pointer(c(0, 0), Gesture::Tap).unwrap();
    let out = s.game.pointer(c(6, 7), Gesture::Tap).unwrap();

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 0,
            removed: 0
        }
    );
    assert_eq!(s.game.board().get(c(0, 0)).matchable_kind(), Some(E));
    assert_eq!(s.game.board().get(c(6, 7)).matchable_kind(), Some(B));
    assert_eq!(s.game.moves_left(), 10);
    assert_eq!(s.game.boosters().count(BoosterKind::Glove), 0);
}

#[test]
fn wand_on_frozen_tile_only_breaks_the_ice() {
    let board = patched(BASE, &[((0, 0), "B~~")]);
    let mut s = scenario(&board, 10, &[("b", 50)], vec![0]);
    s.game = s.game.with_boosters(BoosterInventory::new(1, 0, 0));
    assert!(s.game.arm_booster(BoosterKind::Wand));

    let out = s.game.pointer(c(0, 0), Gesture::Tap).unwrap();

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 0,
            removed: 0
        }
    );
    assert_eq!(s.game.board().to_ascii(), ascii(BASE));
    assert_eq!(s.game.goals().remaining(GoalKind::Element(B)), Some(50));
    assert_eq!(s.game.boosters().count(BoosterKind::Wand), 0);
    assert!(s.effects.borrow().iter().any(|(effect, _)| *effect
        == Effect::ObstacleDamaged {
            at: c(0, 0),
            obstacle: ObstacleKind::Ice,
            remaining: 0
        }));
}

#[test]
fn two_color_bombs_clear_every_unprotected_tile_for_one_move() {
    let board = patched(
        BASE,
        &[((3, 3), "@"), ((4, 3), "@"), ((2, 7), "[2]"), ((5, 7), "D~")],
    );
    let mut s = scenario(&board, 10, &[("e", 50), ("a", 50)], vec![0, 1, 2]);

    let out = swipe(&mut s.game, c(3, 3), Direction::Right);

    // 64 cells less two bombs, a box and a frozen tile.
    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 1,
            removed: 60
        }
    );
    assert_eq!(
        flashes(&s.effects),
        vec![(c(4, 3), HelperKind::ColorBomb), (c(3, 3), HelperKind::ColorBomb)]
    );
    assert_eq!(first_pass_removals(&s.effects).len(), 60);
    assert_eq!(s.game.goals().remaining(GoalKind::Element(E)), Some(34));
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "A B C A B C A B
             C A B C A B C A
             B C A B C A B C
             A B C A B C A B
             C A B C A B C A
             B C A B C A B C
             A B C A B C A B
             C A [2] B C D~ A B"
        )
    );
}

#[test]
fn color_bomb_with_line_fires_every_line_of_that_kind() {
    let board = patched(
        BASE,
        &[((3, 3), "@"), ((4, 3), "-"), ((1, 6), "-"), ((6, 1), "|")],
    );
    let mut s = scenario(&board, 20, &[("e", 50), ("a", 50)], vec![4, 2, 0, 3, 1]);

    let out = swipe(&mut s.game, c(3, 3), Direction::Right);

    // The bomb and both horizontal lines each cost a move.
    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 3,
            removed: 13
        }
    );
    assert_eq!(
        flashes(&s.effects),
        vec![
            (c(4, 3), HelperKind::ColorBomb),
            (c(3, 3), HelperKind::LineHorizontal),
            (c(1, 6), HelperKind::LineHorizontal),
        ]
    );
    assert_eq!(s.game.goals().remaining(GoalKind::Element(E)), Some(45));
    // The vertical line was left alone and dropped two rows.
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "E C A D B E C A
             D B E C A D B E
             B C B D E B C D
             D B C E B C | E
             E D E C D E B C
             B C B D E B C D
             D B C E B C D E
             C E D B C D E B"
        )
    );
}

#[test]
fn two_lines_swapped_together_sweep_a_cross() {
    let board = patched(BASE, &[((3, 3), "-"), ((4, 3), "|")]);
    let mut s = scenario(&board, 20, &[("e", 50), ("a", 50)], vec![4, 2, 0, 3, 1]);

    let out = swipe(&mut s.game, c(3, 3), Direction::Right);

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 2,
            removed: 13
        }
    );
    // The swap moved each line onto the other's cell.
    assert_eq!(
        flashes(&s.effects),
        vec![
            (c(4, 3), HelperKind::LineHorizontal),
            (c(3, 3), HelperKind::LineVertical),
        ]
    );
    assert_eq!(s.game.goals().remaining(GoalKind::Element(E)), Some(46));
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "E C A D B E C A
             B C B D E B C D
             D B C B B C D E
             E D E E D E B C
             B C B C E B C D
             D B C A B C D E
             E D E D D E B C
             C E D B C D E B"
        )
    );
}

#[test]
fn color_bomb_swapped_with_a_tile_clears_that_tile_kind() {
    let board = patched(BASE, &[((3, 3), "@")]);
    let mut s = scenario(&board, 20, &[("c", 50), ("e", 50)], vec![4, 2, 0, 3, 1]);

    // The bomb trades places with the C at (4,3).
    let out = swipe(&mut s.game, c(3, 3), Direction::Right);

    assert!(matches!(out, ActionOutcome::Resolved { moves_spent: 1, .. }));
    assert_eq!(flashes(&s.effects), vec![(c(4, 3), HelperKind::ColorBomb)]);
    let first = first_pass_removals(&s.effects);
    assert_eq!(first.len(), 16);
    assert!(first.iter().all(|(_, kind)| *kind == C));
    assert!(first.contains(&(c(3, 3), C)));
    assert_eq!(s.game.goals().remaining(GoalKind::Element(C)), Some(34));
    assert_eq!(s.game.moves_left(), 19);
}

#[test]
fn line_sweeps_chain_through_helpers_once_each() {
    // Row 4 reaches both vertical lines; each column reaches a horizontal
    // line on row 6, and the (0,6) sweep reaches (6,6) again.
    let board = patched(
        BASE,
        &[((1, 4), "-"), ((0, 4), "|"), ((6, 4), "|"), ((0, 6), "-"), ((6, 6), "-")],
    );
    let mut s = scenario(&board, 20, &[("e", 50), ("a", 50)], vec![4, 2, 0, 3, 1]);

    let out = swipe(&mut s.game, c(1, 4), Direction::Right);

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 5,
            removed: 23
        }
    );
    assert_eq!(
        flashes(&s.effects),
        vec![
            (c(2, 4), HelperKind::LineHorizontal),
            (c(0, 4), HelperKind::LineVertical),
            (c(6, 4), HelperKind::LineVertical),
            (c(0, 6), HelperKind::LineHorizontal),
            (c(6, 6), HelperKind::LineHorizontal),
        ]
    );
    assert_eq!(s.game.moves_left(), 15);
    assert_eq!(s.game.goals().remaining(GoalKind::Element(E)), Some(44));
    let moves_changes = s
        .changes
        .borrow()
        .iter()
        .filter(|change| matches!(change, StateChange::MovesChanged { .. }))
        .count();
    assert_eq!(moves_changes, 5);
}

#[test]
fn deadlocked_board_is_reshuffled_into_a_playable_one() {
    // Diagonal stripes of five kinds: no swap lines up three.
    let stuck = "A B C [1] E A B C
                 C D E A B C D E
                 E A B C D E A B
                 B C D E A B C D
                 D E A B C D E A
                 A B C D E A B C
                 C D E A B C D E
                 E A B C D E A B";
    let mut s = scenario(stuck, 10, &[("box_full", 1), ("a", 50)], vec![1, 1, 0]);
    assert!(!has_available_moves(s.game.board()));
    s.game = s.game.with_boosters(BoosterInventory::new(1, 0, 0));
    assert!(s.game.arm_booster(BoosterKind::Wand));

    // The wand frees (3,0); the B refilled there still leaves no move.
    let out = s.game.pointer(c(3, 0), Gesture::Tap).unwrap();

    assert_eq!(
        out,
        ActionOutcome::Resolved {
            moves_spent: 0,
            removed: 0
        }
    );
    let reshuffles = s
        .effects
        .borrow()
        .iter()
        .filter(|(effect, _)| *effect == Effect::Reshuffle)
        .count();
    assert_eq!(reshuffles, 1);
    assert!(has_available_moves(s.game.board()));
    assert_eq!(
        s.game.board().to_ascii(),
        ascii(
            "B A B B A B B A
             B B A B B A B B
             A B B A B B A B
             B A B B A B B A
             B B A B B A B B
             A B B A B B A B
             B A B B A B B A
             B B A B B A B B"
        )
    );
    assert_eq!(s.game.moves_left(), 10);
    assert_eq!(s.game.goals().remaining(GoalKind::BoxCleared), Some(0));
}
