use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tile_match::core::{find_matches, has_available_moves, Board, GameState, LevelDefinition, SeededRng};
use tile_match::types::{Coord, Direction, Gesture};

/// 8x8 board with one vertical triple ready after swiping (1,1) up.
const BOARD: &str = "A B A C D A B C\n\
                     C A B D A B C D\n\
                     D C D B C D A B\n\
                     B D C A B C D A\n\
                     A B A C D A B C\n\
                     C A B D A B C D\n\
                     D C D B C D A B\n\
                     B D C A B C D A";

fn level() -> LevelDefinition {
    LevelDefinition::from_json(
        r#"{"id": 1, "rows": 8, "cols": 8, "moves": 30,
            "elements": ["a", "b", "c", "d"], "goals": [{"type": "a", "count": 50}]}"#,
    )
    .unwrap()
}

fn bench_find_matches(c: &mut Criterion) {
    let board = Board::from_ascii(BOARD).unwrap();
    c.bench_function("find_matches_8x8", |b| {
        b.iter(|| find_matches(black_box(&board)))
    });
}

fn bench_deadlock_search(c: &mut Criterion) {
    let board = Board::from_ascii(BOARD).unwrap();
    c.bench_function("has_available_moves_8x8", |b| {
        b.iter(|| has_available_moves(black_box(&board)))
    });
}

fn bench_swap_and_cascade(c: &mut Criterion) {
    c.bench_function("swipe_and_cascade_8x8", |b| {
        b.iter_batched(
            || {
                let board = Board::from_ascii(BOARD).unwrap();
                GameState::with_board(level(), board, Box::new(SeededRng::new(7))).unwrap()
            },
            |mut game| {
                game.pointer(Coord::new(1, 1), Gesture::Swipe(Direction::Up))
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_level_build(c: &mut Criterion) {
    let level = LevelDefinition::tutorial().unwrap();
    let mut seed = 0u64;
    c.bench_function("build_tutorial", |b| {
        b.iter(|| {
            seed += 1;
            GameState::new(level.clone(), black_box(seed)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_find_matches,
    bench_deadlock_search,
    bench_swap_and_cascade,
    bench_level_build
);
criterion_main!(benches);
