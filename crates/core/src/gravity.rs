//! Gravity and refill.
//!
//! Each column is handled independently. Tiles and boxes fall together,
//! preserving their top-to-bottom order; holes are skipped and never filled.

use crate::board::{Board, Cell, Tile};
use crate::rng::TileRng;
use crate::types::{Coord, ElementKind};

/// Compact every column downward. Returns `(from, to)` for each moved cell.
pub fn apply_gravity(board: &mut Board) -> Vec<(Coord, Coord)> {
    let mut moves = Vec::new();
    let rows = board.rows() as i8;

    for col in 0..board.cols() as i8 {
        // Non-hole slots and occupied cells, both bottom-to-top.
        let mut slots: Vec<Coord> = Vec::with_capacity(rows as usize);
        let mut items: Vec<(Coord, Cell)> = Vec::with_capacity(rows as usize);
        for row in (0..rows).rev() {
            let at = Coord::new(col, row);
            let cell = board.get(at);
            if cell == Cell::Hole {
                continue;
            }
            slots.push(at);
            if cell.is_occupied() {
                items.push((at, cell));
            }
        }

        for (slot, (from, cell)) in slots.iter().zip(items.iter()) {
            if slot != from {
                board.set(*slot, *cell);
                moves.push((*from, *slot));
            }
        }
        for slot in slots.iter().skip(items.len()) {
            board.set(*slot, Cell::Empty);
        }
    }
    moves
}

/// Fill every empty cell with a uniformly random element.
///
/// Cells are visited row-major, top-to-bottom. No attempt is made to avoid
/// immediate matches; the cascade resolves them on its next pass.
pub fn refill(board: &mut Board, vocabulary: usize, rng: &mut dyn TileRng) -> Vec<(Coord, ElementKind)> {
    let empty: Vec<Coord> = board.coords().filter(|c| board.get(*c).is_empty()).collect();
    let mut spawned = Vec::with_capacity(empty.len());
    for at in empty {
        let kind = random_kind(vocabulary, rng);
        board.set(at, Cell::Tile(Tile::element(kind)));
        spawned.push((at, kind));
    }
    spawned
}

pub fn random_kind(vocabulary: usize, rng: &mut dyn TileRng) -> ElementKind {
    ElementKind(rng.pick(vocabulary.max(1)) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRng;

    #[test]
    fn test_tiles_fall_to_bottom() {
        let mut board = Board::from_ascii("A B\n. C\n. .").unwrap();
        let moves = apply_gravity(&mut board);
        assert_eq!(board.to_ascii(), ". .\n. B\nA C\n");
        assert_eq!(moves.len(), 3);
        assert!(moves.contains(&(Coord::new(0, 0), Coord::new(0, 2))));
    }

    #[test]
    fn test_holes_are_skipped() {
        let mut board = Board::from_ascii("A\n.\n#\n.").unwrap();
        apply_gravity(&mut board);
        assert_eq!(board.to_ascii(), ".\n.\n#\nA\n");
    }

    #[test]
    fn test_boxes_and_ice_fall_in_order() {
        let mut board = Board::from_ascii("[2]\nB~\n.\n.").unwrap();
        apply_gravity(&mut board);
        assert_eq!(board.to_ascii(), ".\n.\n[2]\nB~\n");
    }

    #[test]
    fn test_gravity_is_stable() {
        let mut board = Board::from_ascii(". A\nB #\nC D").unwrap();
        apply_gravity(&mut board);
        let settled = board.clone();
        assert!(apply_gravity(&mut board).is_empty());
        assert_eq!(board, settled);
    }

    #[test]
    fn test_refill_fills_every_empty_cell_in_row_major_order() {
        let mut board = Board::from_ascii(". #\n. .").unwrap();
        let mut rng = SequenceRng::new(vec![2, 0, 1]);
        let spawned = refill(&mut board, 3, &mut rng);
        assert_eq!(
            spawned,
            vec![
                (Coord::new(0, 0), ElementKind(2)),
                (Coord::new(0, 1), ElementKind(0)),
                (Coord::new(1, 1), ElementKind(1)),
            ]
        );
        assert_eq!(board.count_empty(), 0);
        assert!(board.is_hole(Coord::new(1, 0)));
    }
}
